//! Per-qualifier resources attached to a function
//!
//! Provisioned concurrency, resource policies, asynchronous invoke settings and
//! function URLs. These are flat records; the `Function` aggregate owns and
//! validates them.

use crate::revision::new_revision_id;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest allowed `maximum_event_age_in_seconds`.
pub const MIN_EVENT_AGE_SECONDS: u32 = 60;
/// Largest allowed `maximum_event_age_in_seconds`.
pub const MAX_EVENT_AGE_SECONDS: u32 = 21_600;
/// Largest allowed `maximum_retry_attempts`.
pub const MAX_RETRY_ATTEMPTS: u32 = 2;

/// Desired provisioned concurrency for a qualifier (persisted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedConcurrencyConfiguration {
    /// Requested pre-warmed environments
    pub provisioned_concurrent_executions: u32,
    /// Last change
    pub last_modified: DateTime<Utc>,
}

/// Allocation status of provisioned concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionedConcurrencyStatus {
    /// Environments are being allocated
    #[default]
    InProgress,
    /// Allocation complete
    Ready,
    /// Allocation failed
    Failed,
}

/// Transient allocation state of provisioned concurrency.
///
/// Not persisted across restarts; rebuilt by whoever allocates environments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvisionedConcurrencyState {
    /// Environments allocated so far
    pub allocated: u32,
    /// Environments ready to serve
    pub available: u32,
    /// Allocation status
    pub status: ProvisionedConcurrencyStatus,
    /// Reason for a failure, if any
    pub status_reason: Option<String>,
}

/// IAM-style policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourcePolicy {
    /// Policy language version
    pub version: String,
    /// Policy id
    pub id: String,
    /// Statements
    pub statement: Vec<serde_json::Value>,
}

impl ResourcePolicy {
    /// Empty policy document.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            version: "2012-10-17".to_string(),
            id: id.into(),
            statement: Vec::new(),
        }
    }
}

/// Resource policy of one qualifier plus its revision token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResourcePolicy {
    /// Revision token
    pub revision_id: String,
    /// Policy document
    pub policy: ResourcePolicy,
}

impl FunctionResourcePolicy {
    /// Wrap a policy document with a fresh revision token.
    #[must_use]
    pub fn new(policy: ResourcePolicy) -> Self {
        Self {
            revision_id: new_revision_id(),
            policy,
        }
    }

    /// Statement ids (`Sid`) present in the policy.
    pub fn statement_ids(&self) -> impl Iterator<Item = &str> {
        self.policy
            .statement
            .iter()
            .filter_map(|s| s.get("Sid").and_then(serde_json::Value::as_str))
    }
}

/// Destination for one outcome of an asynchronous invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnDestination {
    /// Target ARN
    pub destination: String,
}

/// Destinations for asynchronous invocation outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Where successful results go
    pub on_success: Option<OnDestination>,
    /// Where failures go
    pub on_failure: Option<OnDestination>,
}

/// Asynchronous invocation settings of one qualifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInvokeConfig {
    /// Function name
    pub function_name: String,
    /// Qualifier or alias
    pub qualifier: String,
    /// Last change
    pub last_modified: Option<DateTime<Utc>>,
    /// Outcome destinations
    pub destination_config: Option<DestinationConfig>,
    /// Retries after a failed attempt
    pub maximum_retry_attempts: Option<u32>,
    /// Maximum age of a queued event
    pub maximum_event_age_in_seconds: Option<u32>,
}

impl EventInvokeConfig {
    /// Check retry and event-age bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if let Some(retries) = self.maximum_retry_attempts {
            if retries > MAX_RETRY_ATTEMPTS {
                return Err(Error::Validation(format!(
                    "MaximumRetryAttempts must be between 0 and {MAX_RETRY_ATTEMPTS}, got {retries}"
                )));
            }
        }
        if let Some(age) = self.maximum_event_age_in_seconds {
            if !(MIN_EVENT_AGE_SECONDS..=MAX_EVENT_AGE_SECONDS).contains(&age) {
                return Err(Error::Validation(format!(
                    "MaximumEventAgeInSeconds must be between {MIN_EVENT_AGE_SECONDS} and \
                     {MAX_EVENT_AGE_SECONDS}, got {age}"
                )));
            }
        }
        Ok(())
    }
}

// last_modified is bookkeeping, not part of the settings
impl PartialEq for EventInvokeConfig {
    fn eq(&self, other: &Self) -> bool {
        self.function_name == other.function_name
            && self.qualifier == other.qualifier
            && self.destination_config == other.destination_config
            && self.maximum_retry_attempts == other.maximum_retry_attempts
            && self.maximum_event_age_in_seconds == other.maximum_event_age_in_seconds
    }
}

/// Authentication required by a function URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionUrlAuthType {
    /// Public
    None,
    /// Signed requests only
    AwsIam,
}

/// CORS settings of a function URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cors {
    /// Allow credentials
    pub allow_credentials: bool,
    /// Allowed headers
    pub allow_headers: Vec<String>,
    /// Allowed methods
    pub allow_methods: Vec<String>,
    /// Allowed origins
    pub allow_origins: Vec<String>,
    /// Exposed headers
    pub expose_headers: Vec<String>,
    /// Preflight cache duration
    pub max_age: Option<u32>,
}

/// Dedicated HTTPS endpoint of `$LATEST` or an alias.
///
/// Once created the URL never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionUrlConfig {
    /// Fully qualified function ARN
    pub function_arn: String,
    /// Function name
    pub function_name: String,
    /// CORS settings
    pub cors: Cors,
    /// Generated subdomain id
    pub url_id: String,
    /// Full URL
    pub url: String,
    /// Authentication
    pub auth_type: FunctionUrlAuthType,
    /// Creation time
    pub creation_time: DateTime<Utc>,
    /// Last change
    pub last_modified_time: Option<DateTime<Utc>>,
    /// `$LATEST` or alias name
    pub function_qualifier: String,
}

/// Publishers allowed to sign code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllowedPublishers {
    /// Signing profile version ARNs
    pub signing_profile_version_arns: Vec<String>,
}

/// What to do when a signature check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UntrustedArtifactOnDeployment {
    /// Accept and log
    #[default]
    Warn,
    /// Reject the deployment
    Enforce,
}

/// Code signing policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeSigningPolicies {
    /// Deployment behavior for untrusted artifacts
    pub untrusted_artifact_on_deployment: UntrustedArtifactOnDeployment,
}

/// Code signing configuration a function may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSigningConfig {
    /// Config id
    pub csc_id: String,
    /// Config ARN
    pub arn: String,
    /// Allowed publishers
    pub allowed_publishers: AllowedPublishers,
    /// Policies
    pub policies: CodeSigningPolicies,
    /// Last change
    pub last_modified: DateTime<Utc>,
    /// Description
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke_config(retries: Option<u32>, age: Option<u32>) -> EventInvokeConfig {
        EventInvokeConfig {
            function_name: "f".to_string(),
            qualifier: "$LATEST".to_string(),
            last_modified: Some(Utc::now()),
            destination_config: None,
            maximum_retry_attempts: retries,
            maximum_event_age_in_seconds: age,
        }
    }

    #[test]
    fn test_event_invoke_bounds() {
        assert!(invoke_config(Some(0), Some(60)).validate().is_ok());
        assert!(invoke_config(Some(2), Some(21_600)).validate().is_ok());
        assert!(invoke_config(Some(3), None).validate().is_err());
        assert!(invoke_config(None, Some(59)).validate().is_err());
        assert!(invoke_config(None, Some(21_601)).validate().is_err());
    }

    #[test]
    fn test_event_invoke_equality_ignores_timestamp() {
        let mut a = invoke_config(Some(1), None);
        let b = invoke_config(Some(1), None);
        a.last_modified = None;
        assert_eq!(a, b);
    }

    #[test]
    fn test_provisioned_state_default() {
        let state = ProvisionedConcurrencyState::default();
        assert_eq!(state.allocated, 0);
        assert_eq!(state.status, ProvisionedConcurrencyStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&state.status).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_policy_statement_ids() {
        let mut policy = ResourcePolicy::new("default");
        policy
            .statement
            .push(serde_json::json!({"Sid": "allow-s3", "Effect": "Allow"}));
        policy.statement.push(serde_json::json!({"Effect": "Deny"}));
        let policy = FunctionResourcePolicy::new(policy);

        assert_eq!(policy.statement_ids().collect::<Vec<_>>(), vec!["allow-s3"]);
        let json = serde_json::to_value(&policy.policy).unwrap();
        assert_eq!(json["Version"], "2012-10-17");
    }
}
