//! Version Configuration - immutable execution parameters of one version

use super::runtime::{runtime_image, Architecture, PackageType, TracingMode};
use super::state::{UpdateStatus, VersionState};
use crate::artifact::ArtifactCache;
use crate::limits::check_environment_size;
use crate::revision::new_revision_id;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Smallest memory size in MB.
pub const MIN_MEMORY_SIZE: u32 = 128;
/// Largest memory size in MB.
pub const MAX_MEMORY_SIZE: u32 = 10_240;
/// Largest timeout in seconds.
pub const MAX_TIMEOUT: u32 = 900;
/// Smallest and default `/tmp` size in MB.
pub const MIN_EPHEMERAL_STORAGE: u32 = 512;
/// Largest `/tmp` size in MB.
pub const MAX_EPHEMERAL_STORAGE: u32 = 10_240;

/// Container image overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Working directory inside the image
    pub working_directory: String,
    /// Command override
    pub command: Vec<String>,
    /// Entrypoint override
    pub entrypoint: Vec<String>,
}

/// Size of the `/tmp` directory available to the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralStorage {
    /// Size in MB
    pub size: u32,
}

impl Default for EphemeralStorage {
    fn default() -> Self {
        Self {
            size: MIN_EPHEMERAL_STORAGE,
        }
    }
}

/// Dead-letter target. Carried through, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterConfig {
    /// Queue or topic ARN
    pub target_arn: String,
}

/// Mounted file system. Carried through, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemConfig {
    /// Access point ARN
    pub arn: String,
    /// Mount path inside the execution environment
    pub local_mount_path: String,
}

/// Network attachment. Carried through, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VpcConfig {
    /// Security groups
    pub security_group_ids: Vec<String>,
    /// Subnets
    pub subnet_ids: Vec<String>,
}

/// Immutable snapshot of everything needed to run one version.
///
/// Two tokens are carried:
/// - `revision_id` is fresh for every instance and backs optimistic
///   concurrency on the resource.
/// - `internal_revision` only changes when the running environment has to be
///   restarted to pick up the new configuration (code, environment, runtime,
///   handler, sizing, ...). A description or state change keeps it.
///
/// Updates go through [`to_builder`](Self::to_builder) and always yield a new
/// instance.
#[derive(Debug, Clone, Serialize)]
pub struct VersionConfig {
    description: String,
    role: String,
    timeout: u32,
    runtime: Option<String>,
    memory_size: u32,
    handler: Option<String>,
    package_type: PackageType,
    reserved_concurrent_executions: Option<u32>,
    environment: HashMap<String, String>,
    architectures: Vec<Architecture>,
    internal_revision: String,
    ephemeral_storage: EphemeralStorage,
    tracing_config_mode: TracingMode,
    code: Arc<ArtifactCache>,
    last_modified: DateTime<Utc>,
    state: VersionState,
    image_config: Option<ImageConfig>,
    last_update: Option<UpdateStatus>,
    revision_id: String,
    layers: Vec<String>,
    dead_letter_config: Option<DeadLetterConfig>,
    file_system_configs: Vec<FileSystemConfig>,
    vpc_config: Option<VpcConfig>,
    kms_key_arn: Option<String>,
}

impl VersionConfig {
    /// Start a new configuration for the given code.
    #[must_use]
    pub fn builder(code: Arc<ArtifactCache>) -> VersionConfigBuilder {
        VersionConfigBuilder::new(code)
    }

    /// Start a builder pre-filled with this configuration.
    ///
    /// The built configuration keeps this `internal_revision` unless a
    /// restart-relevant field changed.
    #[must_use]
    pub fn to_builder(&self) -> VersionConfigBuilder {
        VersionConfigBuilder {
            description: self.description.clone(),
            role: self.role.clone(),
            timeout: self.timeout,
            runtime: self.runtime.clone(),
            memory_size: self.memory_size,
            handler: self.handler.clone(),
            package_type: self.package_type,
            reserved_concurrent_executions: self.reserved_concurrent_executions,
            environment: self.environment.clone(),
            architectures: self.architectures.clone(),
            ephemeral_storage: self.ephemeral_storage,
            tracing_config_mode: self.tracing_config_mode,
            code: Arc::clone(&self.code),
            state: self.state.clone(),
            image_config: self.image_config.clone(),
            last_update: self.last_update.clone(),
            layers: self.layers.clone(),
            dead_letter_config: self.dead_letter_config.clone(),
            file_system_configs: self.file_system_configs.clone(),
            vpc_config: self.vpc_config.clone(),
            kms_key_arn: self.kms_key_arn.clone(),
            previous: Some(Box::new(self.clone())),
        }
    }

    /// Same configuration in a different lifecycle state.
    #[must_use]
    pub fn with_state(&self, state: VersionState) -> Self {
        let mut builder = self.to_builder();
        builder.state = state;
        builder.assemble()
    }

    /// Same configuration with a different last-update status.
    #[must_use]
    pub fn with_last_update(&self, last_update: UpdateStatus) -> Self {
        let mut builder = self.to_builder();
        builder.last_update = Some(last_update);
        builder.assemble()
    }

    /// Whether running `next` instead of `self` needs a fresh environment.
    #[must_use]
    pub fn requires_restart(&self, next: &Self) -> bool {
        self.code.id() != next.code.id()
            || self.role != next.role
            || self.timeout != next.timeout
            || self.runtime != next.runtime
            || self.memory_size != next.memory_size
            || self.handler != next.handler
            || self.package_type != next.package_type
            || self.environment != next.environment
            || self.architectures != next.architectures
            || self.ephemeral_storage != next.ephemeral_storage
            || self.tracing_config_mode != next.tracing_config_mode
            || self.image_config != next.image_config
            || self.layers != next.layers
    }

    /// Get the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the execution role ARN.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Get the timeout in seconds.
    #[must_use]
    pub const fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Get the runtime identifier (`None` for image packages).
    #[must_use]
    pub fn runtime(&self) -> Option<&str> {
        self.runtime.as_deref()
    }

    /// Get the pinned runtime image for zip packages.
    #[must_use]
    pub fn runtime_image(&self) -> Option<&'static str> {
        self.runtime.as_deref().and_then(runtime_image)
    }

    /// Get the memory size in MB.
    #[must_use]
    pub const fn memory_size(&self) -> u32 {
        self.memory_size
    }

    /// Get the handler (`None` for image packages).
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    /// Get the package type.
    #[must_use]
    pub const fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// Get the reserved concurrency, if any.
    #[must_use]
    pub const fn reserved_concurrent_executions(&self) -> Option<u32> {
        self.reserved_concurrent_executions
    }

    /// Get the environment variables.
    #[must_use]
    pub const fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    /// Get the architectures.
    #[must_use]
    pub fn architectures(&self) -> &[Architecture] {
        &self.architectures
    }

    /// Get the runtime-restart token.
    #[must_use]
    pub fn internal_revision(&self) -> &str {
        &self.internal_revision
    }

    /// Get the ephemeral storage size.
    #[must_use]
    pub const fn ephemeral_storage(&self) -> EphemeralStorage {
        self.ephemeral_storage
    }

    /// Get the tracing mode.
    #[must_use]
    pub const fn tracing_config_mode(&self) -> TracingMode {
        self.tracing_config_mode
    }

    /// Get the code artifact.
    #[must_use]
    pub const fn code(&self) -> &Arc<ArtifactCache> {
        &self.code
    }

    /// Get the modification timestamp.
    #[must_use]
    pub const fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Get the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &VersionState {
        &self.state
    }

    /// Get the image overrides, if any.
    #[must_use]
    pub const fn image_config(&self) -> Option<&ImageConfig> {
        self.image_config.as_ref()
    }

    /// Get the last-update status, if any.
    #[must_use]
    pub const fn last_update(&self) -> Option<&UpdateStatus> {
        self.last_update.as_ref()
    }

    /// Get the revision token of this instance.
    #[must_use]
    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }

    /// Get the layer ARNs.
    #[must_use]
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Get the dead-letter config, if any.
    #[must_use]
    pub const fn dead_letter_config(&self) -> Option<&DeadLetterConfig> {
        self.dead_letter_config.as_ref()
    }

    /// Get the file system mounts.
    #[must_use]
    pub fn file_system_configs(&self) -> &[FileSystemConfig] {
        &self.file_system_configs
    }

    /// Get the VPC config, if any.
    #[must_use]
    pub const fn vpc_config(&self) -> Option<&VpcConfig> {
        self.vpc_config.as_ref()
    }

    /// Get the KMS key ARN, if any.
    #[must_use]
    pub fn kms_key_arn(&self) -> Option<&str> {
        self.kms_key_arn.as_deref()
    }
}

/// Builder for `VersionConfig`.
#[derive(Debug)]
pub struct VersionConfigBuilder {
    description: String,
    role: String,
    timeout: u32,
    runtime: Option<String>,
    memory_size: u32,
    handler: Option<String>,
    package_type: PackageType,
    reserved_concurrent_executions: Option<u32>,
    environment: HashMap<String, String>,
    architectures: Vec<Architecture>,
    ephemeral_storage: EphemeralStorage,
    tracing_config_mode: TracingMode,
    code: Arc<ArtifactCache>,
    state: VersionState,
    image_config: Option<ImageConfig>,
    last_update: Option<UpdateStatus>,
    layers: Vec<String>,
    dead_letter_config: Option<DeadLetterConfig>,
    file_system_configs: Vec<FileSystemConfig>,
    vpc_config: Option<VpcConfig>,
    kms_key_arn: Option<String>,
    previous: Option<Box<VersionConfig>>,
}

impl VersionConfigBuilder {
    /// Create a builder with platform defaults.
    #[must_use]
    pub fn new(code: Arc<ArtifactCache>) -> Self {
        Self {
            description: String::new(),
            role: String::new(),
            timeout: 3,
            runtime: None,
            memory_size: MIN_MEMORY_SIZE,
            handler: None,
            package_type: PackageType::Zip,
            reserved_concurrent_executions: None,
            environment: HashMap::new(),
            architectures: vec![Architecture::X86_64],
            ephemeral_storage: EphemeralStorage::default(),
            tracing_config_mode: TracingMode::PassThrough,
            code,
            state: VersionState::pending(),
            image_config: None,
            last_update: None,
            layers: Vec::new(),
            dead_letter_config: None,
            file_system_configs: Vec::new(),
            vpc_config: None,
            kms_key_arn: None,
            previous: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the execution role ARN.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub const fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the runtime identifier.
    #[must_use]
    pub fn runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Set the memory size in MB.
    #[must_use]
    pub const fn memory_size(mut self, megabytes: u32) -> Self {
        self.memory_size = megabytes;
        self
    }

    /// Set the handler.
    #[must_use]
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Set the package type.
    #[must_use]
    pub const fn package_type(mut self, package_type: PackageType) -> Self {
        self.package_type = package_type;
        self
    }

    /// Set the reserved concurrency.
    #[must_use]
    pub const fn reserved_concurrent_executions(mut self, reserved: Option<u32>) -> Self {
        self.reserved_concurrent_executions = reserved;
        self
    }

    /// Replace all environment variables.
    #[must_use]
    pub fn environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Set one environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Set the architecture.
    #[must_use]
    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architectures = vec![architecture];
        self
    }

    /// Set the ephemeral storage size in MB.
    #[must_use]
    pub const fn ephemeral_storage(mut self, megabytes: u32) -> Self {
        self.ephemeral_storage = EphemeralStorage { size: megabytes };
        self
    }

    /// Set the tracing mode.
    #[must_use]
    pub const fn tracing_config_mode(mut self, mode: TracingMode) -> Self {
        self.tracing_config_mode = mode;
        self
    }

    /// Replace the code artifact.
    #[must_use]
    pub fn code(mut self, code: Arc<ArtifactCache>) -> Self {
        self.code = code;
        self
    }

    /// Set the lifecycle state.
    #[must_use]
    pub fn state(mut self, state: VersionState) -> Self {
        self.state = state;
        self
    }

    /// Set the image overrides.
    #[must_use]
    pub fn image_config(mut self, image_config: ImageConfig) -> Self {
        self.image_config = Some(image_config);
        self
    }

    /// Set the last-update status.
    #[must_use]
    pub fn last_update(mut self, last_update: UpdateStatus) -> Self {
        self.last_update = Some(last_update);
        self
    }

    /// Replace the layer ARNs.
    #[must_use]
    pub fn layers(mut self, layers: Vec<String>) -> Self {
        self.layers = layers;
        self
    }

    /// Set the dead-letter config.
    #[must_use]
    pub fn dead_letter_config(mut self, config: DeadLetterConfig) -> Self {
        self.dead_letter_config = Some(config);
        self
    }

    /// Replace the file system mounts.
    #[must_use]
    pub fn file_system_configs(mut self, configs: Vec<FileSystemConfig>) -> Self {
        self.file_system_configs = configs;
        self
    }

    /// Set the VPC config.
    #[must_use]
    pub fn vpc_config(mut self, config: VpcConfig) -> Self {
        self.vpc_config = Some(config);
        self
    }

    /// Set the KMS key ARN.
    #[must_use]
    pub fn kms_key_arn(mut self, arn: impl Into<String>) -> Self {
        self.kms_key_arn = Some(arn.into());
        self
    }

    /// Validate and build the `VersionConfig`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for out-of-range sizing, an unsupported or
    ///   missing runtime, a missing handler, or runtime/handler on an image
    ///   package
    /// - [`Error::RequestEntityTooLarge`] if the environment exceeds 4 KiB
    pub fn build(self) -> Result<VersionConfig> {
        self.validate()?;
        Ok(self.assemble())
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_TIMEOUT).contains(&self.timeout) {
            return Err(Error::Validation(format!(
                "Timeout must be between 1 and {MAX_TIMEOUT} seconds, got {}",
                self.timeout
            )));
        }
        if !(MIN_MEMORY_SIZE..=MAX_MEMORY_SIZE).contains(&self.memory_size) {
            return Err(Error::Validation(format!(
                "MemorySize must be between {MIN_MEMORY_SIZE} and {MAX_MEMORY_SIZE} MB, got {}",
                self.memory_size
            )));
        }
        if !(MIN_EPHEMERAL_STORAGE..=MAX_EPHEMERAL_STORAGE).contains(&self.ephemeral_storage.size)
        {
            return Err(Error::Validation(format!(
                "EphemeralStorage size must be between {MIN_EPHEMERAL_STORAGE} and \
                 {MAX_EPHEMERAL_STORAGE} MB, got {}",
                self.ephemeral_storage.size
            )));
        }
        if self.architectures.len() != 1 {
            return Err(Error::Validation(
                "Exactly one architecture must be specified".to_string(),
            ));
        }

        match self.package_type {
            PackageType::Zip => {
                let runtime = self
                    .runtime
                    .as_deref()
                    .ok_or_else(|| Error::Validation("Runtime is required for Zip packages".to_string()))?;
                if runtime_image(runtime).is_none() {
                    return Err(Error::Validation(format!(
                        "Value {runtime} at 'runtime' failed to satisfy constraint: \
                         Member must satisfy enum value set"
                    )));
                }
                if self.handler.as_deref().map_or(true, str::is_empty) {
                    return Err(Error::Validation(
                        "Handler is required for Zip packages".to_string(),
                    ));
                }
            }
            PackageType::Image => {
                if self.runtime.is_some() || self.handler.is_some() {
                    return Err(Error::Validation(
                        "Runtime and Handler are not supported for Image packages".to_string(),
                    ));
                }
            }
        }

        check_environment_size(&self.environment)
    }

    fn assemble(self) -> VersionConfig {
        let mut config = VersionConfig {
            description: self.description,
            role: self.role,
            timeout: self.timeout,
            runtime: self.runtime,
            memory_size: self.memory_size,
            handler: self.handler,
            package_type: self.package_type,
            reserved_concurrent_executions: self.reserved_concurrent_executions,
            environment: self.environment,
            architectures: self.architectures,
            internal_revision: String::new(),
            ephemeral_storage: self.ephemeral_storage,
            tracing_config_mode: self.tracing_config_mode,
            code: self.code,
            last_modified: Utc::now(),
            state: self.state,
            image_config: self.image_config,
            last_update: self.last_update,
            revision_id: new_revision_id(),
            layers: self.layers,
            dead_letter_config: self.dead_letter_config,
            file_system_configs: self.file_system_configs,
            vpc_config: self.vpc_config,
            kms_key_arn: self.kms_key_arn,
        };
        config.internal_revision = match self.previous {
            Some(previous) if !previous.requires_restart(&config) => previous.internal_revision,
            _ => new_revision_id(),
        };
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactRef, CacheConfig};
    use crate::function::state::State;
    use crate::store::MemoryObjectStore;

    fn code(id: &str) -> Arc<ArtifactCache> {
        let artifact = ArtifactRef::new(id, "tasks", format!("{id}.zip"), None, "00", 1);
        Arc::new(ArtifactCache::new(
            artifact,
            Arc::new(MemoryObjectStore::new()),
            &CacheConfig::default(),
        ))
    }

    fn base() -> VersionConfig {
        VersionConfig::builder(code("a1"))
            .runtime("python3.9")
            .handler("index.handler")
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = base();
        assert_eq!(config.timeout(), 3);
        assert_eq!(config.memory_size(), 128);
        assert_eq!(config.ephemeral_storage().size, 512);
        assert_eq!(config.architectures(), &[Architecture::X86_64]);
        assert_eq!(config.package_type(), PackageType::Zip);
        assert_eq!(config.tracing_config_mode(), TracingMode::PassThrough);
        assert_eq!(config.state().state, State::Pending);
        assert!(config.runtime_image().is_some());
    }

    #[test]
    fn test_description_change_keeps_internal_revision() {
        let config = base();
        let updated = config.to_builder().description("new text").build().unwrap();

        assert_eq!(updated.internal_revision(), config.internal_revision());
        assert_ne!(updated.revision_id(), config.revision_id());
    }

    #[test]
    fn test_environment_change_needs_restart() {
        let config = base();
        let updated = config.to_builder().env("STAGE", "prod").build().unwrap();

        assert!(config.requires_restart(&updated));
        assert_ne!(updated.internal_revision(), config.internal_revision());
    }

    #[test]
    fn test_code_change_needs_restart() {
        let config = base();
        let updated = config.to_builder().code(code("a2")).build().unwrap();
        assert_ne!(updated.internal_revision(), config.internal_revision());
    }

    #[test]
    fn test_with_state_is_new_instance() {
        let config = base();
        let active = config.with_state(VersionState::active());

        assert_eq!(active.state().state, State::Active);
        assert_eq!(config.state().state, State::Pending);
        assert_ne!(active.revision_id(), config.revision_id());
        assert_eq!(active.internal_revision(), config.internal_revision());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_memory = VersionConfig::builder(code("a1"))
            .runtime("python3.9")
            .handler("h")
            .memory_size(64)
            .build();
        assert!(matches!(bad_memory, Err(Error::Validation(_))));

        let bad_timeout = VersionConfig::builder(code("a1"))
            .runtime("python3.9")
            .handler("h")
            .timeout(0)
            .build();
        assert!(matches!(bad_timeout, Err(Error::Validation(_))));

        let unknown_runtime = VersionConfig::builder(code("a1"))
            .runtime("cobol85")
            .handler("h")
            .build();
        assert!(matches!(unknown_runtime, Err(Error::Validation(_))));

        let no_handler = VersionConfig::builder(code("a1")).runtime("python3.9").build();
        assert!(matches!(no_handler, Err(Error::Validation(_))));

        let image_with_runtime = VersionConfig::builder(code("a1"))
            .package_type(PackageType::Image)
            .runtime("python3.9")
            .build();
        assert!(matches!(image_with_runtime, Err(Error::Validation(_))));
    }

    #[test]
    fn test_inert_fields_pass_through() {
        let config = VersionConfig::builder(code("a1"))
            .package_type(PackageType::Image)
            .vpc_config(VpcConfig {
                security_group_ids: vec!["sg-1".to_string()],
                subnet_ids: vec!["subnet-1".to_string()],
            })
            .dead_letter_config(DeadLetterConfig {
                target_arn: "arn:aws:sqs:us-east-1:000000000000:dlq".to_string(),
            })
            .kms_key_arn("arn:aws:kms:us-east-1:000000000000:key/k")
            .build()
            .unwrap();

        assert_eq!(config.vpc_config().unwrap().subnet_ids, vec!["subnet-1"]);
        assert!(config.dead_letter_config().is_some());
        assert!(config.kms_key_arn().is_some());
        assert!(config.file_system_configs().is_empty());
        assert!(config.runtime().is_none());
    }

    #[test]
    fn test_serializes_code_reference() {
        let json = serde_json::to_value(base()).unwrap();
        assert_eq!(json["code"]["id"], "a1");
        assert_eq!(json["runtime"], "python3.9");
    }
}
