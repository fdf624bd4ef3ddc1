//! Function Version - identity plus immutable configuration

use super::config::VersionConfig;
use serde::{Deserialize, Serialize};

/// Qualifier of the mutable head version.
pub const LATEST: &str = "$LATEST";

/// Build `arn:aws:lambda:<region>:<account>:function:<name>:<qualifier>`.
#[must_use]
pub fn qualified_lambda_arn(function_name: &str, qualifier: &str, region: &str, account: &str) -> String {
    format!("{}:{qualifier}", unqualified_lambda_arn(function_name, region, account))
}

/// Build `arn:aws:lambda:<region>:<account>:function:<name>`.
#[must_use]
pub fn unqualified_lambda_arn(function_name: &str, region: &str, account: &str) -> String {
    format!("arn:aws:lambda:{region}:{account}:function:{function_name}")
}

/// Whether `qualifier` names a published version (a positive number).
#[must_use]
pub fn is_published_qualifier(qualifier: &str) -> bool {
    !qualifier.is_empty()
        && qualifier.bytes().all(|b| b.is_ascii_digit())
        && !qualifier.starts_with('0')
}

/// Unique identity of one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionIdentifier {
    /// Function name
    pub function_name: String,
    /// `$LATEST` or a version number
    pub qualifier: String,
    /// Region
    pub region: String,
    /// Account id
    pub account: String,
}

impl VersionIdentifier {
    /// Create an identifier.
    #[must_use]
    pub fn new(
        function_name: impl Into<String>,
        qualifier: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            qualifier: qualifier.into(),
            region: region.into(),
            account: account.into(),
        }
    }

    /// ARN including the qualifier.
    #[must_use]
    pub fn qualified_arn(&self) -> String {
        qualified_lambda_arn(&self.function_name, &self.qualifier, &self.region, &self.account)
    }

    /// ARN of the function without qualifier.
    #[must_use]
    pub fn unqualified_arn(&self) -> String {
        unqualified_lambda_arn(&self.function_name, &self.region, &self.account)
    }
}

/// An immutable function version.
///
/// Publishing never mutates an existing version; recording a new state
/// replaces the whole record with a fresh one.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionVersion {
    id: VersionIdentifier,
    config: VersionConfig,
}

impl FunctionVersion {
    /// Create a version.
    #[must_use]
    pub const fn new(id: VersionIdentifier, config: VersionConfig) -> Self {
        Self { id, config }
    }

    /// Get the identity.
    #[must_use]
    pub const fn id(&self) -> &VersionIdentifier {
        &self.id
    }

    /// Get the qualifier.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        &self.id.qualifier
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &VersionConfig {
        &self.config
    }

    /// ARN including the qualifier.
    #[must_use]
    pub fn qualified_arn(&self) -> String {
        self.id.qualified_arn()
    }

    /// Whether this is the mutable head.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.id.qualifier == LATEST
    }
}
