//! Function aggregate - owner of versions, aliases and per-qualifier resources

use super::alias::{AliasRequest, VersionAlias};
use super::config::VersionConfig;
use super::resources::{
    Cors, EventInvokeConfig, FunctionResourcePolicy, FunctionUrlAuthType, FunctionUrlConfig,
    ProvisionedConcurrencyConfiguration, ProvisionedConcurrencyState, ResourcePolicy,
};
use super::state::{LastUpdateStatus, State, UpdateStatus, VersionState};
use super::version::{
    is_published_qualifier, qualified_lambda_arn, unqualified_lambda_arn, FunctionVersion,
    VersionIdentifier, LATEST,
};
use crate::artifact::ArtifactCache;
use crate::limits::AccountSettings;
use crate::revision::short_id;
use crate::{Error, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
struct FunctionInner {
    versions: HashMap<String, Arc<FunctionVersion>>,
    aliases: HashMap<String, Arc<VersionAlias>>,
    // keyed by $LATEST, version or alias
    permissions: HashMap<String, FunctionResourcePolicy>,
    event_invoke_configs: HashMap<String, EventInvokeConfig>,
    // keyed by $LATEST or alias
    function_url_configs: HashMap<String, FunctionUrlConfig>,
    provisioned_concurrency_configs: HashMap<String, ProvisionedConcurrencyConfiguration>,
    provisioned_concurrency_states: HashMap<String, ProvisionedConcurrencyState>,
    reserved_concurrent_executions: Option<u32>,
    code_signing_config_arn: Option<String>,
    tags: HashMap<String, String>,
    next_version: u64,
    // artifacts released by this function; never referenced again
    released_artifacts: HashSet<String>,
    destroyed: bool,
}

impl FunctionInner {
    fn has_qualifier(&self, qualifier: &str) -> bool {
        self.versions.contains_key(qualifier) || self.aliases.contains_key(qualifier)
    }

    fn latest(&self) -> Result<Arc<FunctionVersion>> {
        self.versions
            .get(LATEST)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Function version {LATEST} not found")))
    }

    fn ensure_live(&self, function_name: &str) -> Result<()> {
        if self.destroyed {
            return Err(Error::NotFound(format!("Function not found: {function_name}")));
        }
        Ok(())
    }

    /// Reject configs whose code this function already released.
    fn check_code(&self, function_name: &str, config: &VersionConfig) -> Result<()> {
        self.ensure_live(function_name)?;
        let id = config.code().id();
        if self.released_artifacts.contains(id) {
            return Err(Error::ResourceConflict(format!(
                "Code artifact {id} of {function_name} has been deleted"
            )));
        }
        Ok(())
    }

    /// Release `code` if no remaining version references the same artifact.
    ///
    /// A released artifact is recorded under the same lock, so no later
    /// publish can pick it up again while it is being destroyed.
    fn release_if_orphaned(&mut self, code: &Arc<ArtifactCache>) -> Option<Arc<ArtifactCache>> {
        let still_used = self
            .versions
            .values()
            .any(|v| v.config().code().id() == code.id());
        if still_used {
            return None;
        }
        self.released_artifacts.insert(code.id().to_string());
        Some(Arc::clone(code))
    }

    fn forget_qualifier(&mut self, qualifier: &str) {
        self.permissions.remove(qualifier);
        self.event_invoke_configs.remove(qualifier);
        self.function_url_configs.remove(qualifier);
        self.provisioned_concurrency_configs.remove(qualifier);
        self.provisioned_concurrency_states.remove(qualifier);
    }
}

/// A function: the aggregate root of its versions and aliases.
///
/// ## Locking
///
/// Every structural mutation holds the function's lock for a short, I/O-free
/// critical section. Concurrent `publish_version` calls therefore receive
/// distinct, increasing qualifiers. Artifacts orphaned by a mutation are
/// destroyed after the lock is released.
///
/// ## Invariants
///
/// - `$LATEST` is present from construction until [`destroy`](Self::destroy)
/// - published qualifiers are `"1"`, `"2"`, ... in publish order, never reused
/// - aliases only reference existing versions
/// - an artifact released by a deletion is never referenced again
#[derive(Debug)]
pub struct Function {
    function_name: String,
    region: String,
    account: String,
    inner: Mutex<FunctionInner>,
}

impl Function {
    /// Create a function whose `$LATEST` runs `latest_config`.
    #[must_use]
    pub fn new(
        function_name: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
        latest_config: VersionConfig,
    ) -> Self {
        let function_name = function_name.into();
        let region = region.into();
        let account = account.into();

        let latest = FunctionVersion::new(
            VersionIdentifier::new(&function_name, LATEST, &region, &account),
            latest_config,
        );
        let versions = HashMap::from([(LATEST.to_string(), Arc::new(latest))]);

        info!(function = %function_name, "Created function");
        Self {
            function_name,
            region,
            account,
            inner: Mutex::new(FunctionInner {
                versions,
                aliases: HashMap::new(),
                permissions: HashMap::new(),
                event_invoke_configs: HashMap::new(),
                function_url_configs: HashMap::new(),
                provisioned_concurrency_configs: HashMap::new(),
                provisioned_concurrency_states: HashMap::new(),
                reserved_concurrent_executions: None,
                code_signing_config_arn: None,
                tags: HashMap::new(),
                next_version: 1,
                released_artifacts: HashSet::new(),
                destroyed: false,
            }),
        }
    }

    /// Get the function name.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Get the region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get the account id.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// ARN of the function without qualifier.
    #[must_use]
    pub fn unqualified_arn(&self) -> String {
        unqualified_lambda_arn(&self.function_name, &self.region, &self.account)
    }

    fn identifier(&self, qualifier: &str) -> VersionIdentifier {
        VersionIdentifier::new(&self.function_name, qualifier, &self.region, &self.account)
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Publish `config` as the next numbered version.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the function has been destroyed
    /// - [`Error::ResourceConflict`] if the config's code was already deleted
    pub fn publish_version(&self, config: VersionConfig) -> Result<Arc<FunctionVersion>> {
        let version = {
            let mut inner = self.inner.lock();
            inner.check_code(&self.function_name, &config)?;
            let qualifier = inner.next_version.to_string();
            inner.next_version += 1;

            let version = Arc::new(FunctionVersion::new(self.identifier(&qualifier), config));
            inner.versions.insert(qualifier, Arc::clone(&version));
            version
        };

        info!(
            function = %self.function_name,
            qualifier = %version.qualifier(),
            artifact_id = %version.config().code().id(),
            "Published version"
        );
        Ok(version)
    }

    /// Replace the mutable head with `config`.
    ///
    /// When the current `$LATEST` is `Active`, the new one starts a last-update
    /// cycle (`InProgress`). A code artifact no longer referenced afterwards is
    /// destroyed.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the function has been destroyed
    /// - [`Error::ResourceConflict`] if the config's code was already deleted
    pub fn update_latest(&self, config: VersionConfig) -> Result<Arc<FunctionVersion>> {
        let (version, orphan) = {
            let mut inner = self.inner.lock();
            inner.check_code(&self.function_name, &config)?;
            let previous = inner.versions.get(LATEST).cloned();

            let config = match &previous {
                Some(prev) if prev.config().state().state == State::Active => {
                    config.with_last_update(UpdateStatus::in_progress())
                }
                _ => config,
            };
            let version = Arc::new(FunctionVersion::new(self.identifier(LATEST), config));
            inner.versions.insert(LATEST.to_string(), Arc::clone(&version));

            let orphan = previous.and_then(|prev| inner.release_if_orphaned(prev.config().code()));
            (version, orphan)
        };

        debug!(
            function = %self.function_name,
            internal_revision = %version.config().internal_revision(),
            "Updated $LATEST"
        );
        if let Some(code) = orphan {
            code.destroy();
        }
        Ok(version)
    }

    /// Get the mutable head version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the function has been destroyed.
    pub fn latest(&self) -> Result<Arc<FunctionVersion>> {
        self.inner.lock().latest()
    }

    /// Get a version by qualifier.
    #[must_use]
    pub fn version(&self, qualifier: &str) -> Option<Arc<FunctionVersion>> {
        self.inner.lock().versions.get(qualifier).cloned()
    }

    /// All versions, `$LATEST` included, in no particular order.
    #[must_use]
    pub fn versions(&self) -> Vec<Arc<FunctionVersion>> {
        self.inner.lock().versions.values().cloned().collect()
    }

    /// Record a lifecycle transition of a version.
    ///
    /// Only `Pending -> Active` and `Pending -> Failed` are accepted. The
    /// version record is replaced by a new instance with a new revision.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the qualifier does not exist
    /// - [`Error::Validation`] for any other transition
    pub fn set_version_state(
        &self,
        qualifier: &str,
        state: VersionState,
    ) -> Result<Arc<FunctionVersion>> {
        let mut inner = self.inner.lock();
        let current = inner
            .versions
            .get(qualifier)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Function version {qualifier} not found")))?;

        if !current.config().state().can_transition_to(&state) {
            return Err(Error::Validation(format!(
                "Cannot move version {qualifier} from {:?} to {:?}",
                current.config().state().state,
                state.state
            )));
        }

        let version = Arc::new(FunctionVersion::new(
            current.id().clone(),
            current.config().with_state(state),
        ));
        inner.versions.insert(qualifier.to_string(), Arc::clone(&version));
        Ok(version)
    }

    /// Finish the in-place update cycle of `$LATEST`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the function has been destroyed
    /// - [`Error::Validation`] if no update is in progress or `status` does
    ///   not end the cycle
    pub fn complete_latest_update(&self, status: UpdateStatus) -> Result<Arc<FunctionVersion>> {
        if !status.is_terminal() {
            return Err(Error::Validation(
                "Update status must be Successful or Failed".to_string(),
            ));
        }

        let mut inner = self.inner.lock();
        let current = inner.latest()?;
        let in_progress = current
            .config()
            .last_update()
            .and_then(|u| u.status)
            == Some(LastUpdateStatus::InProgress);
        if !in_progress {
            return Err(Error::Validation(format!(
                "No update in progress for {}",
                self.function_name
            )));
        }

        let version = Arc::new(FunctionVersion::new(
            current.id().clone(),
            current.config().with_last_update(status),
        ));
        inner.versions.insert(LATEST.to_string(), Arc::clone(&version));
        Ok(version)
    }

    /// Remove a published version.
    ///
    /// Per-qualifier permissions, invoke configs and provisioned concurrency
    /// go with it. When no surviving version references its artifact, the
    /// artifact is destroyed (after the lock is released).
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for `$LATEST`
    /// - [`Error::NotFound`] if the version does not exist
    /// - [`Error::ResourceConflict`] if an alias still routes to it
    pub fn destroy_version(&self, qualifier: &str) -> Result<()> {
        if qualifier == LATEST {
            return Err(Error::Validation(format!(
                "{LATEST} version cannot be deleted without deleting the function"
            )));
        }

        let orphan = {
            let mut inner = self.inner.lock();
            if !inner.versions.contains_key(qualifier) {
                return Err(Error::NotFound(format!(
                    "Function version {qualifier} not found"
                )));
            }
            if let Some(alias) = inner.aliases.values().find(|a| a.routes_to(qualifier)) {
                return Err(Error::ResourceConflict(format!(
                    "Version {qualifier} is referenced by alias {}",
                    alias.name()
                )));
            }

            let removed = inner
                .versions
                .remove(qualifier)
                .ok_or_else(|| Error::NotFound(format!("Function version {qualifier} not found")))?;
            inner.forget_qualifier(qualifier);
            inner.release_if_orphaned(removed.config().code())
        };

        info!(function = %self.function_name, qualifier, "Deleted version");
        if let Some(code) = orphan {
            code.destroy();
        }
        Ok(())
    }

    /// Remove every version, alias and per-qualifier resource.
    ///
    /// Each distinct artifact is destroyed exactly once. Afterwards
    /// [`latest`](Self::latest) fails with `NotFound` and so does every
    /// mutation.
    pub fn destroy(&self) {
        let artifacts: Vec<Arc<ArtifactCache>> = {
            let mut inner = self.inner.lock();
            inner.destroyed = true;
            let drained: Vec<Arc<ArtifactCache>> = inner
                .versions
                .drain()
                .map(|(_, v)| Arc::clone(v.config().code()))
                .collect();
            let artifacts: Vec<Arc<ArtifactCache>> = drained
                .into_iter()
                .filter(|code| inner.released_artifacts.insert(code.id().to_string()))
                .collect();

            inner.aliases.clear();
            inner.permissions.clear();
            inner.event_invoke_configs.clear();
            inner.function_url_configs.clear();
            inner.provisioned_concurrency_configs.clear();
            inner.provisioned_concurrency_states.clear();
            artifacts
        };

        info!(
            function = %self.function_name,
            artifacts = artifacts.len(),
            "Destroying function"
        );
        for code in artifacts {
            code.destroy();
        }
    }

    // ------------------------------------------------------------------
    // Aliases
    // ------------------------------------------------------------------

    /// Create or replace an alias.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a bad alias name, a missing target version,
    ///   a weight outside `[0, 1]`, more than one secondary, a secondary equal
    ///   to the primary, or weighted routing involving `$LATEST`
    /// - [`Error::NotFound`] if a revision is expected but the alias is absent
    /// - [`Error::ResourceConflict`] if the expected revision is stale
    ///
    /// A failed call leaves the alias state untouched.
    pub fn upsert_alias(&self, name: &str, request: AliasRequest) -> Result<Arc<VersionAlias>> {
        validate_alias_name(name)?;
        if let Some(routing) = &request.routing {
            routing.validate()?;
        }
        let secondary = request
            .routing
            .as_ref()
            .and_then(|r| r.secondary())
            .map(|(q, _)| q.to_string());

        if let Some(secondary) = &secondary {
            if *secondary == request.function_version {
                return Err(Error::Validation(format!(
                    "Alias {name} cannot route additional traffic to its primary version {secondary}"
                )));
            }
            if !is_published_qualifier(secondary) || !is_published_qualifier(&request.function_version)
            {
                return Err(Error::Validation(
                    "Weighted alias routing requires published versions".to_string(),
                ));
            }
        }

        let alias = {
            let mut inner = self.inner.lock();
            inner.ensure_live(&self.function_name)?;
            for qualifier in std::iter::once(&request.function_version).chain(secondary.as_ref()) {
                if !inner.versions.contains_key(qualifier) {
                    return Err(Error::Validation(format!(
                        "Function version {qualifier} of {} does not exist",
                        self.function_name
                    )));
                }
            }

            if let Some(expected) = &request.expected_revision_id {
                let current = inner
                    .aliases
                    .get(name)
                    .ok_or_else(|| Error::NotFound(format!("Alias not found: {name}")))?;
                if current.revision_id() != expected {
                    return Err(Error::ResourceConflict(format!(
                        "The Revision Id provided does not match the latest Revision Id of alias {name}"
                    )));
                }
            }

            let alias = Arc::new(VersionAlias::new(
                name,
                request.function_version,
                request.description,
                request.routing,
            ));
            inner.aliases.insert(name.to_string(), Arc::clone(&alias));
            alias
        };

        info!(
            function = %self.function_name,
            alias = name,
            version = %alias.function_version(),
            revision_id = %alias.revision_id(),
            "Upserted alias"
        );
        Ok(alias)
    }

    /// Delete an alias and the resources keyed by it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the alias does not exist.
    pub fn delete_alias(&self, name: &str) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            inner
                .aliases
                .remove(name)
                .ok_or_else(|| Error::NotFound(format!("Alias not found: {name}")))?;
            inner.forget_qualifier(name);
        }
        info!(function = %self.function_name, alias = name, "Deleted alias");
        Ok(())
    }

    /// Get an alias by name.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<Arc<VersionAlias>> {
        self.inner.lock().aliases.get(name).cloned()
    }

    /// All aliases, in no particular order.
    #[must_use]
    pub fn aliases(&self) -> Vec<Arc<VersionAlias>> {
        self.inner.lock().aliases.values().cloned().collect()
    }

    /// Pick the version qualifier one invocation of alias `name` runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the alias does not exist.
    pub fn resolve_alias<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<String> {
        let alias = self
            .alias(name)
            .ok_or_else(|| Error::NotFound(format!("Alias not found: {name}")))?;
        Ok(alias.select(rng).to_string())
    }

    /// Resolve an invocation target (`None` = `$LATEST`, a version or an
    /// alias) to the version that runs it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing matches the qualifier.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        qualifier: Option<&str>,
        rng: &mut R,
    ) -> Result<Arc<FunctionVersion>> {
        let qualifier = qualifier.unwrap_or(LATEST);
        if let Some(version) = self.version(qualifier) {
            return Ok(version);
        }
        let target = self.resolve_alias(qualifier, rng)?;
        self.version(&target).ok_or_else(|| {
            Error::NotFound(format!(
                "Function version {target} of alias {qualifier} not found"
            ))
        })
    }

    // ------------------------------------------------------------------
    // Provisioned concurrency
    // ------------------------------------------------------------------

    /// Set the desired provisioned concurrency of a version or alias.
    ///
    /// Resets the transient allocation state to `InProgress`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for `$LATEST`, zero executions, or a total above
    ///   the function's reserved concurrency
    /// - [`Error::NotFound`] if the qualifier does not exist
    pub fn put_provisioned_concurrency(
        &self,
        qualifier: &str,
        provisioned_concurrent_executions: u32,
    ) -> Result<ProvisionedConcurrencyConfiguration> {
        if qualifier == LATEST {
            return Err(Error::Validation(
                "Provisioned Concurrency Configs cannot be applied to unpublished function versions"
                    .to_string(),
            ));
        }
        if provisioned_concurrent_executions == 0 {
            return Err(Error::Validation(
                "ProvisionedConcurrentExecutions must be at least 1".to_string(),
            ));
        }

        let mut inner = self.inner.lock();
        if !inner.has_qualifier(qualifier) {
            return Err(Error::NotFound(format!(
                "Function {} has no version or alias {qualifier}",
                self.function_name
            )));
        }
        if let Some(reserved) = inner.reserved_concurrent_executions {
            let others = provisioned_total(
                inner
                    .provisioned_concurrency_configs
                    .iter()
                    .filter(|(q, _)| q.as_str() != qualifier)
                    .map(|(_, c)| c),
            );
            if others + u64::from(provisioned_concurrent_executions) > u64::from(reserved) {
                return Err(Error::Validation(format!(
                    "Requested Provisioned Concurrency should not be greater than the \
                     reservedConcurrentExecution for function ({reserved})"
                )));
            }
        }

        let config = ProvisionedConcurrencyConfiguration {
            provisioned_concurrent_executions,
            last_modified: Utc::now(),
        };
        inner
            .provisioned_concurrency_configs
            .insert(qualifier.to_string(), config.clone());
        inner
            .provisioned_concurrency_states
            .insert(qualifier.to_string(), ProvisionedConcurrencyState::default());
        Ok(config)
    }

    /// Get the desired provisioned concurrency of a qualifier.
    #[must_use]
    pub fn provisioned_concurrency(
        &self,
        qualifier: &str,
    ) -> Option<ProvisionedConcurrencyConfiguration> {
        self.inner
            .lock()
            .provisioned_concurrency_configs
            .get(qualifier)
            .cloned()
    }

    /// Remove the provisioned concurrency of a qualifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if none is configured.
    pub fn delete_provisioned_concurrency(&self, qualifier: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner
            .provisioned_concurrency_configs
            .remove(qualifier)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No Provisioned Concurrency Config found for function {qualifier}"
                ))
            })?;
        inner.provisioned_concurrency_states.remove(qualifier);
        Ok(())
    }

    /// Get the transient allocation state of a qualifier.
    #[must_use]
    pub fn provisioned_concurrency_state(
        &self,
        qualifier: &str,
    ) -> Option<ProvisionedConcurrencyState> {
        self.inner
            .lock()
            .provisioned_concurrency_states
            .get(qualifier)
            .cloned()
    }

    /// Record the allocation state reported by the environment allocator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no provisioned concurrency is configured.
    pub fn set_provisioned_concurrency_state(
        &self,
        qualifier: &str,
        state: ProvisionedConcurrencyState,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.provisioned_concurrency_configs.contains_key(qualifier) {
            return Err(Error::NotFound(format!(
                "No Provisioned Concurrency Config found for function {qualifier}"
            )));
        }
        inner
            .provisioned_concurrency_states
            .insert(qualifier.to_string(), state);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Resource policies
    // ------------------------------------------------------------------

    /// Add a policy statement to a qualifier's resource policy.
    ///
    /// The statement must carry a string `Sid` that is unique within the
    /// policy. Every change issues a new policy revision.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the statement has no `Sid`
    /// - [`Error::NotFound`] if the qualifier does not exist
    /// - [`Error::ResourceConflict`] for a duplicate `Sid` or a stale revision
    pub fn add_permission_statement(
        &self,
        qualifier: &str,
        statement: serde_json::Value,
        expected_revision_id: Option<&str>,
    ) -> Result<FunctionResourcePolicy> {
        let sid = statement
            .get("Sid")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::Validation("Policy statement requires a Sid".to_string()))?
            .to_string();

        let mut inner = self.inner.lock();
        if !inner.has_qualifier(qualifier) {
            return Err(Error::NotFound(format!(
                "Function {} has no version or alias {qualifier}",
                self.function_name
            )));
        }

        let current = inner.permissions.get(qualifier);
        check_revision(current.map(|p| p.revision_id.as_str()), expected_revision_id)?;
        if current.is_some_and(|p| p.statement_ids().any(|s| s == sid)) {
            return Err(Error::ResourceConflict(format!(
                "The statement id ({sid}) provided already exists. Please provide a new \
                 statement id, or remove the existing statement."
            )));
        }

        let mut policy = current
            .map(|p| p.policy.clone())
            .unwrap_or_else(|| ResourcePolicy::new("default"));
        policy.statement.push(statement);
        let policy = FunctionResourcePolicy::new(policy);
        inner
            .permissions
            .insert(qualifier.to_string(), policy.clone());
        Ok(policy)
    }

    /// Get the resource policy of a qualifier.
    #[must_use]
    pub fn policy(&self, qualifier: &str) -> Option<FunctionResourcePolicy> {
        self.inner.lock().permissions.get(qualifier).cloned()
    }

    /// Remove one statement from a qualifier's resource policy.
    ///
    /// The policy disappears with its last statement.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there is no policy or no statement `sid`
    /// - [`Error::ResourceConflict`] for a stale revision
    pub fn remove_permission(
        &self,
        qualifier: &str,
        sid: &str,
        expected_revision_id: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        let current = inner
            .permissions
            .get(qualifier)
            .ok_or_else(|| Error::NotFound(format!("No policy is associated with {qualifier}")))?;
        check_revision(Some(current.revision_id.as_str()), expected_revision_id)?;

        let mut policy = current.policy.clone();
        let before = policy.statement.len();
        policy
            .statement
            .retain(|s| s.get("Sid").and_then(serde_json::Value::as_str) != Some(sid));
        if policy.statement.len() == before {
            return Err(Error::NotFound(format!(
                "Statement {sid} is not found in resource policy."
            )));
        }

        if policy.statement.is_empty() {
            inner.permissions.remove(qualifier);
        } else {
            inner
                .permissions
                .insert(qualifier.to_string(), FunctionResourcePolicy::new(policy));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Asynchronous invoke configs
    // ------------------------------------------------------------------

    /// Create or replace the asynchronous invoke settings of a qualifier.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for out-of-range settings
    /// - [`Error::NotFound`] if the qualifier does not exist
    pub fn put_event_invoke_config(
        &self,
        mut config: EventInvokeConfig,
    ) -> Result<EventInvokeConfig> {
        config.validate()?;
        config.function_name = self.function_name.clone();
        config.last_modified = Some(Utc::now());

        let mut inner = self.inner.lock();
        if !inner.has_qualifier(&config.qualifier) {
            return Err(Error::NotFound(format!(
                "Function {} has no version or alias {}",
                self.function_name, config.qualifier
            )));
        }
        inner
            .event_invoke_configs
            .insert(config.qualifier.clone(), config.clone());
        Ok(config)
    }

    /// Get the asynchronous invoke settings of a qualifier.
    #[must_use]
    pub fn event_invoke_config(&self, qualifier: &str) -> Option<EventInvokeConfig> {
        self.inner.lock().event_invoke_configs.get(qualifier).cloned()
    }

    /// Remove the asynchronous invoke settings of a qualifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if none are configured.
    pub fn delete_event_invoke_config(&self, qualifier: &str) -> Result<()> {
        self.inner
            .lock()
            .event_invoke_configs
            .remove(qualifier)
            .map(|_| ())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "The function {}:{qualifier} doesn't have an EventInvokeConfig",
                    self.function_name
                ))
            })
    }

    // ------------------------------------------------------------------
    // Function URLs
    // ------------------------------------------------------------------

    /// Create the URL endpoint of `$LATEST` (`None`) or an alias.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a published version qualifier
    /// - [`Error::NotFound`] for an unknown alias
    /// - [`Error::ResourceConflict`] if a URL already exists
    pub fn create_function_url_config(
        &self,
        qualifier: Option<&str>,
        auth_type: FunctionUrlAuthType,
        cors: Cors,
    ) -> Result<FunctionUrlConfig> {
        let qualifier = qualifier.unwrap_or(LATEST);
        if is_published_qualifier(qualifier) {
            return Err(Error::Validation(format!(
                "Function URLs can only be attached to {LATEST} or an alias, got {qualifier}"
            )));
        }

        let mut inner = self.inner.lock();
        inner.ensure_live(&self.function_name)?;
        if qualifier != LATEST && !inner.aliases.contains_key(qualifier) {
            return Err(Error::NotFound(format!("Alias not found: {qualifier}")));
        }
        if inner.function_url_configs.contains_key(qualifier) {
            return Err(Error::ResourceConflict(format!(
                "Failed to create function url config for [functionArn = {}]. \
                 Error message: FunctionUrlConfig exists for this Lambda function",
                self.unqualified_arn()
            )));
        }

        let url_id = short_id(32);
        let function_arn = if qualifier == LATEST {
            self.unqualified_arn()
        } else {
            qualified_lambda_arn(&self.function_name, qualifier, &self.region, &self.account)
        };
        let config = FunctionUrlConfig {
            function_arn,
            function_name: self.function_name.clone(),
            cors,
            url: format!("https://{url_id}.lambda-url.{}.on.aws/", self.region),
            url_id,
            auth_type,
            creation_time: Utc::now(),
            last_modified_time: None,
            function_qualifier: qualifier.to_string(),
        };
        inner
            .function_url_configs
            .insert(qualifier.to_string(), config.clone());
        Ok(config)
    }

    /// Change auth type and CORS of an existing URL; the URL itself is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no URL exists for the qualifier.
    pub fn update_function_url_config(
        &self,
        qualifier: Option<&str>,
        auth_type: FunctionUrlAuthType,
        cors: Cors,
    ) -> Result<FunctionUrlConfig> {
        let qualifier = qualifier.unwrap_or(LATEST);
        let mut inner = self.inner.lock();
        let config = inner
            .function_url_configs
            .get_mut(qualifier)
            .ok_or_else(|| Error::NotFound(format!("The resource you requested does not exist: {qualifier}")))?;
        config.auth_type = auth_type;
        config.cors = cors;
        config.last_modified_time = Some(Utc::now());
        Ok(config.clone())
    }

    /// Get the URL endpoint of `$LATEST` (`None`) or an alias.
    #[must_use]
    pub fn function_url_config(&self, qualifier: Option<&str>) -> Option<FunctionUrlConfig> {
        self.inner
            .lock()
            .function_url_configs
            .get(qualifier.unwrap_or(LATEST))
            .cloned()
    }

    /// Delete the URL endpoint of `$LATEST` (`None`) or an alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no URL exists for the qualifier.
    pub fn delete_function_url_config(&self, qualifier: Option<&str>) -> Result<()> {
        let qualifier = qualifier.unwrap_or(LATEST);
        self.inner
            .lock()
            .function_url_configs
            .remove(qualifier)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("The resource you requested does not exist: {qualifier}")))
    }

    // ------------------------------------------------------------------
    // Function-level settings
    // ------------------------------------------------------------------

    /// Set or clear the function's reserved concurrency.
    ///
    /// `reserved_elsewhere` is the concurrency already reserved by the other
    /// functions of the account.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the reservation would starve the account's
    ///   unreserved pool or fall below the provisioned total
    /// - [`Error::NotFound`] if the function has been destroyed
    pub fn set_reserved_concurrency(
        &self,
        reserved: Option<u32>,
        settings: &AccountSettings,
        reserved_elsewhere: u32,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_live(&self.function_name)?;
        if let Some(requested) = reserved {
            settings.check_reserved_concurrency(reserved_elsewhere, requested)?;
            let provisioned = provisioned_total(inner.provisioned_concurrency_configs.values());
            if u64::from(requested) < provisioned {
                return Err(Error::Validation(format!(
                    "ReservedConcurrentExecutions {requested} should not be lower than \
                     function's total provisioned concurrency [{provisioned}]"
                )));
            }
        }
        inner.reserved_concurrent_executions = reserved;
        Ok(())
    }

    /// Get the function's reserved concurrency.
    #[must_use]
    pub fn reserved_concurrency(&self) -> Option<u32> {
        self.inner.lock().reserved_concurrent_executions
    }

    /// Set or clear the code signing config ARN.
    pub fn set_code_signing_config_arn(&self, arn: Option<String>) {
        self.inner.lock().code_signing_config_arn = arn;
    }

    /// Get the code signing config ARN.
    #[must_use]
    pub fn code_signing_config_arn(&self) -> Option<String> {
        self.inner.lock().code_signing_config_arn.clone()
    }

    /// Replace all tags.
    pub fn set_tags(&self, tags: HashMap<String, String>) {
        self.inner.lock().tags = tags;
    }

    /// Remove tags by key; unknown keys are ignored.
    pub fn untag(&self, keys: &[&str]) {
        let mut inner = self.inner.lock();
        for key in keys {
            inner.tags.remove(*key);
        }
    }

    /// Get a copy of the tags.
    #[must_use]
    pub fn tags(&self) -> HashMap<String, String> {
        self.inner.lock().tags.clone()
    }
}

/// Sum of provisioned executions, wide enough for any number of `u32` values.
fn provisioned_total<'a>(
    configs: impl Iterator<Item = &'a ProvisionedConcurrencyConfiguration>,
) -> u64 {
    configs
        .map(|c| u64::from(c.provisioned_concurrent_executions))
        .sum()
}

fn validate_alias_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 128 {
        return Err(Error::Validation(format!(
            "Alias name must be 1 to 128 characters, got {:?}",
            name
        )));
    }
    if name == LATEST || name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "Alias name {name} collides with a version qualifier"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Validation(format!(
            "Alias name {name} may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

fn check_revision(current: Option<&str>, expected: Option<&str>) -> Result<()> {
    match (current, expected) {
        (_, None) => Ok(()),
        (Some(current), Some(expected)) if current == expected => Ok(()),
        _ => Err(Error::ResourceConflict(
            "The Revision Id provided does not match the latest Revision Id. Call the \
             GetPolicy API to retrieve the latest Revision Id"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactRef, CacheConfig};
    use crate::function::ProvisionedConcurrencyStatus;
    use crate::store::MemoryObjectStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn code(id: &str) -> Arc<ArtifactCache> {
        let artifact = ArtifactRef::new(id, "tasks", format!("{id}.zip"), None, "00", 1);
        Arc::new(ArtifactCache::new(
            artifact,
            Arc::new(MemoryObjectStore::new()),
            &CacheConfig::default(),
        ))
    }

    fn config(id: &str) -> VersionConfig {
        VersionConfig::builder(code(id))
            .runtime("python3.9")
            .handler("index.handler")
            .build()
            .unwrap()
    }

    fn function() -> Function {
        Function::new("f", "us-east-1", "000000000000", config("a0"))
    }

    #[test]
    fn test_new_function_has_latest() {
        let f = function();
        let latest = f.latest().unwrap();
        assert!(latest.is_latest());
        assert_eq!(
            latest.qualified_arn(),
            "arn:aws:lambda:us-east-1:000000000000:function:f:$LATEST"
        );
        assert_eq!(f.versions().len(), 1);
    }

    #[test]
    fn test_publish_numbers_sequentially() {
        let f = function();
        for expected in 1..=5 {
            let version = f.publish_version(config("a0")).unwrap();
            assert_eq!(version.qualifier(), expected.to_string());
        }
        assert_eq!(f.versions().len(), 6);
    }

    #[test]
    fn test_destroyed_versions_are_not_reused() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.destroy_version("1").unwrap();
        assert_eq!(f.publish_version(config("a2")).unwrap().qualifier(), "2");
    }

    #[test]
    fn test_destroy_latest_rejected() {
        let f = function();
        assert!(matches!(f.destroy_version(LATEST), Err(Error::Validation(_))));
        assert!(matches!(f.destroy_version("9"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_destroy_version_referenced_by_alias() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.upsert_alias("live", AliasRequest::new("1")).unwrap();

        assert!(matches!(
            f.destroy_version("1"),
            Err(Error::ResourceConflict(_))
        ));
        f.delete_alias("live").unwrap();
        f.destroy_version("1").unwrap();
    }

    #[test]
    fn test_alias_name_rules() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        for bad in ["", "$LATEST", "12", "has space", "sl/ash"] {
            assert!(
                matches!(f.upsert_alias(bad, AliasRequest::new("1")), Err(Error::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(f.upsert_alias("prod-v1_blue", AliasRequest::new("1")).is_ok());
    }

    #[test]
    fn test_alias_to_latest_allowed_without_routing() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        assert!(f.upsert_alias("dev", AliasRequest::new(LATEST)).is_ok());
        assert!(matches!(
            f.upsert_alias("dev", AliasRequest::new(LATEST).weighted("1", 0.5)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_secondary_must_differ_from_primary() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        assert!(matches!(
            f.upsert_alias("live", AliasRequest::new("1").weighted("1", 0.5)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_conditional_alias_update() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.publish_version(config("a2")).unwrap();
        let first = f.upsert_alias("live", AliasRequest::new("1")).unwrap();

        let second = f
            .upsert_alias("live", AliasRequest::new("2").if_revision(first.revision_id()))
            .unwrap();
        assert_ne!(second.revision_id(), first.revision_id());

        let stale = f.upsert_alias("live", AliasRequest::new("1").if_revision(first.revision_id()));
        assert!(matches!(stale, Err(Error::ResourceConflict(_))));
        assert_eq!(f.alias("live").unwrap().function_version(), "2");

        let missing = f.upsert_alias("other", AliasRequest::new("1").if_revision("x"));
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resolve_targets() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.upsert_alias("live", AliasRequest::new("1")).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(f.resolve(None, &mut rng).unwrap().is_latest());
        assert_eq!(f.resolve(Some("1"), &mut rng).unwrap().qualifier(), "1");
        assert_eq!(f.resolve(Some("live"), &mut rng).unwrap().qualifier(), "1");
        assert!(matches!(
            f.resolve(Some("nope"), &mut rng),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_version_state_transitions() {
        let f = function();
        let v1 = f.publish_version(config("a1")).unwrap();

        let active = f.set_version_state("1", VersionState::active()).unwrap();
        assert_eq!(active.config().state().state, State::Active);
        assert_ne!(active.config().revision_id(), v1.config().revision_id());
        assert_eq!(v1.config().state().state, State::Pending);

        assert!(matches!(
            f.set_version_state("1", VersionState::pending()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_latest_update_cycle() {
        let f = function();
        f.set_version_state(LATEST, VersionState::active()).unwrap();

        assert!(matches!(
            f.complete_latest_update(UpdateStatus::successful()),
            Err(Error::Validation(_))
        ));

        let current = f.latest().unwrap();
        let updated = f
            .update_latest(current.config().to_builder().env("A", "1").build().unwrap())
            .unwrap();
        assert_eq!(
            updated.config().last_update().and_then(|u| u.status),
            Some(LastUpdateStatus::InProgress)
        );

        let done = f.complete_latest_update(UpdateStatus::successful()).unwrap();
        assert_eq!(
            done.config().last_update().and_then(|u| u.status),
            Some(LastUpdateStatus::Successful)
        );
        assert_eq!(done.config().internal_revision(), updated.config().internal_revision());
    }

    #[test]
    fn test_provisioned_concurrency_rules() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.upsert_alias("live", AliasRequest::new("1")).unwrap();

        assert!(matches!(
            f.put_provisioned_concurrency(LATEST, 1),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.put_provisioned_concurrency("1", 0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.put_provisioned_concurrency("7", 1),
            Err(Error::NotFound(_))
        ));

        f.set_reserved_concurrency(Some(10), &AccountSettings::default(), 0)
            .unwrap();
        f.put_provisioned_concurrency("1", 6).unwrap();
        assert!(f.put_provisioned_concurrency("live", 5).is_err());
        f.put_provisioned_concurrency("live", 4).unwrap();
        // replacing a config does not count against itself
        f.put_provisioned_concurrency("1", 6).unwrap();
    }

    #[test]
    fn test_provisioned_state_is_separate() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.put_provisioned_concurrency("1", 3).unwrap();
        assert_eq!(
            f.provisioned_concurrency_state("1").unwrap(),
            ProvisionedConcurrencyState::default()
        );

        let ready = ProvisionedConcurrencyState {
            allocated: 3,
            available: 3,
            status: ProvisionedConcurrencyStatus::Ready,
            status_reason: None,
        };
        f.set_provisioned_concurrency_state("1", ready.clone()).unwrap();
        assert_eq!(f.provisioned_concurrency_state("1"), Some(ready));

        f.delete_provisioned_concurrency("1").unwrap();
        assert!(f.provisioned_concurrency_state("1").is_none());
        assert!(f
            .set_provisioned_concurrency_state("1", ProvisionedConcurrencyState::default())
            .is_err());
    }

    #[test]
    fn test_permissions_revisioned() {
        let f = function();
        let statement = serde_json::json!({"Sid": "s3", "Effect": "Allow", "Action": "lambda:InvokeFunction"});

        let first = f.add_permission_statement(LATEST, statement.clone(), None).unwrap();
        assert!(matches!(
            f.add_permission_statement(LATEST, statement, None),
            Err(Error::ResourceConflict(_))
        ));

        let sns = serde_json::json!({"Sid": "sns", "Effect": "Allow"});
        assert!(matches!(
            f.add_permission_statement(LATEST, sns.clone(), Some("stale")),
            Err(Error::ResourceConflict(_))
        ));
        let second = f
            .add_permission_statement(LATEST, sns, Some(&first.revision_id))
            .unwrap();
        assert_ne!(second.revision_id, first.revision_id);
        assert_eq!(second.policy.statement.len(), 2);

        f.remove_permission(LATEST, "s3", None).unwrap();
        assert!(matches!(
            f.remove_permission(LATEST, "s3", None),
            Err(Error::NotFound(_))
        ));
        f.remove_permission(LATEST, "sns", None).unwrap();
        assert!(f.policy(LATEST).is_none());

        assert!(matches!(
            f.add_permission_statement(LATEST, serde_json::json!({"Effect": "Allow"}), None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_event_invoke_config_lifecycle() {
        let f = function();
        let config = EventInvokeConfig {
            function_name: String::new(),
            qualifier: LATEST.to_string(),
            last_modified: None,
            destination_config: None,
            maximum_retry_attempts: Some(1),
            maximum_event_age_in_seconds: Some(120),
        };
        let stored = f.put_event_invoke_config(config).unwrap();
        assert_eq!(stored.function_name, "f");
        assert!(stored.last_modified.is_some());
        assert_eq!(f.event_invoke_config(LATEST), Some(stored));

        f.delete_event_invoke_config(LATEST).unwrap();
        assert!(matches!(
            f.delete_event_invoke_config(LATEST),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_function_url_rules() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.upsert_alias("live", AliasRequest::new("1")).unwrap();

        let url = f
            .create_function_url_config(None, FunctionUrlAuthType::None, Cors::default())
            .unwrap();
        assert!(url.url.starts_with("https://"));
        assert!(url.url.ends_with(".lambda-url.us-east-1.on.aws/"));
        assert_eq!(url.function_qualifier, LATEST);

        assert!(matches!(
            f.create_function_url_config(None, FunctionUrlAuthType::None, Cors::default()),
            Err(Error::ResourceConflict(_))
        ));
        assert!(matches!(
            f.create_function_url_config(Some("1"), FunctionUrlAuthType::None, Cors::default()),
            Err(Error::Validation(_))
        ));

        let aliased = f
            .create_function_url_config(Some("live"), FunctionUrlAuthType::AwsIam, Cors::default())
            .unwrap();
        assert!(aliased.function_arn.ends_with(":live"));

        let updated = f
            .update_function_url_config(Some("live"), FunctionUrlAuthType::None, Cors::default())
            .unwrap();
        assert_eq!(updated.url, aliased.url);
        assert!(updated.last_modified_time.is_some());

        f.delete_alias("live").unwrap();
        assert!(f.function_url_config(Some("live")).is_none());
        f.delete_function_url_config(None).unwrap();
    }

    #[test]
    fn test_tags_and_settings() {
        let f = function();
        f.set_tags(HashMap::from([
            ("team".to_string(), "core".to_string()),
            ("env".to_string(), "dev".to_string()),
        ]));
        f.untag(&["env", "missing"]);
        assert_eq!(f.tags().len(), 1);

        f.set_code_signing_config_arn(Some("arn:csc".to_string()));
        assert_eq!(f.code_signing_config_arn().as_deref(), Some("arn:csc"));
        assert_eq!(f.reserved_concurrency(), None);
    }

    #[test]
    fn test_reserved_concurrency_bounds() {
        let f = function();
        let settings = AccountSettings::default();
        f.publish_version(config("a1")).unwrap();

        // 150 in the account, 100 must stay unreserved
        assert!(f.set_reserved_concurrency(Some(51), &settings, 0).is_err());
        assert!(f.set_reserved_concurrency(Some(30), &settings, 20).is_ok());

        f.put_provisioned_concurrency("1", 20).unwrap();
        assert!(matches!(
            f.set_reserved_concurrency(Some(10), &settings, 0),
            Err(Error::Validation(_))
        ));
        f.set_reserved_concurrency(None, &settings, 0).unwrap();
        assert_eq!(f.reserved_concurrency(), None);
    }

    #[test]
    fn test_destroy_clears_everything() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.upsert_alias("live", AliasRequest::new("1")).unwrap();
        f.destroy();

        assert!(matches!(f.latest(), Err(Error::NotFound(_))));
        assert!(f.versions().is_empty());
        assert!(f.aliases().is_empty());
    }

    #[test]
    fn test_released_code_cannot_be_published_again() {
        let f = function();
        let v1 = f.publish_version(config("a1")).unwrap();
        f.destroy_version("1").unwrap();

        assert!(matches!(
            f.publish_version(v1.config().clone()),
            Err(Error::ResourceConflict(_))
        ));
        assert!(matches!(
            f.update_latest(v1.config().clone()),
            Err(Error::ResourceConflict(_))
        ));
        assert_eq!(f.latest().unwrap().config().code().id(), "a0");

        // replaced $LATEST code is released the same way
        let old_head = f.latest().unwrap();
        f.update_latest(config("a2")).unwrap();
        assert!(matches!(
            f.publish_version(old_head.config().clone()),
            Err(Error::ResourceConflict(_))
        ));
        assert_eq!(f.versions().len(), 1);
    }

    #[test]
    fn test_shared_code_stays_publishable_while_referenced() {
        let f = function();
        let v1 = f.publish_version(config("a1")).unwrap();
        f.publish_version(v1.config().clone()).unwrap();
        f.destroy_version("1").unwrap();
        assert_eq!(
            f.publish_version(v1.config().clone()).unwrap().qualifier(),
            "3"
        );
    }

    #[test]
    fn test_provisioned_totals_do_not_overflow() {
        let f = function();
        let settings = AccountSettings::default();
        f.publish_version(config("a1")).unwrap();
        f.publish_version(config("a2")).unwrap();
        f.put_provisioned_concurrency("1", u32::MAX).unwrap();
        f.put_provisioned_concurrency("2", u32::MAX).unwrap();

        assert!(matches!(
            f.set_reserved_concurrency(Some(10), &settings, 0),
            Err(Error::Validation(_))
        ));
        assert_eq!(f.reserved_concurrency(), None);
    }

    #[test]
    fn test_provisioned_check_against_reserved_is_wide() {
        let f = function();
        f.publish_version(config("a1")).unwrap();
        f.publish_version(config("a2")).unwrap();
        f.set_reserved_concurrency(Some(50), &AccountSettings::default(), 0)
            .unwrap();
        f.put_provisioned_concurrency("1", 40).unwrap();
        assert!(matches!(
            f.put_provisioned_concurrency("2", u32::MAX),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_mutations_after_destroy_fail() {
        let f = function();
        f.destroy();

        assert!(matches!(
            f.publish_version(config("a1")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(f.update_latest(config("a2")), Err(Error::NotFound(_))));
        assert!(matches!(
            f.upsert_alias("live", AliasRequest::new("1")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.create_function_url_config(None, FunctionUrlAuthType::None, Cors::default()),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.set_reserved_concurrency(Some(1), &AccountSettings::default(), 0),
            Err(Error::NotFound(_))
        ));
        assert!(f.versions().is_empty());
        assert!(f.latest().is_err());
    }
}
