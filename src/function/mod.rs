//! Functions, versions and aliases
//!
//! ```text
//! Function ─┬─ $LATEST ──────────┐
//!           ├─ version "1" ──────┼──> VersionConfig ──> ArtifactCache
//!           ├─ version "2" ──────┘
//!           └─ alias "live" ──> "1" (70%) / "2" (30%)
//! ```
//!
//! A [`Function`] owns every version and alias. Versions are immutable: a
//! state change or a new `$LATEST` replaces the record. Aliases point at one
//! primary version and optionally route a weighted share of traffic to one
//! secondary version.
//!
//! # Example
//!
//! ```rust,no_run
//! use lambda_model::function::{AliasRequest, Function, VersionConfig};
//! # use lambda_model::artifact::ArtifactCache;
//! # use std::sync::Arc;
//! # fn example(code: Arc<ArtifactCache>) -> lambda_model::Result<()> {
//! let config = VersionConfig::builder(code)
//!     .runtime("python3.9")
//!     .handler("index.handler")
//!     .build()?;
//! let function = Function::new("orders", "us-east-1", "000000000000", config.clone());
//!
//! function.publish_version(config.clone())?;
//! function.publish_version(config)?;
//! function.upsert_alias("live", AliasRequest::new("1").weighted("2", 0.3))?;
//!
//! let mut rng = rand::thread_rng();
//! let version = function.resolve(Some("live"), &mut rng)?;
//! println!("invoking {}", version.qualified_arn());
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod alias;
mod config;
mod resources;
mod runtime;
mod state;
mod version;

pub use aggregate::Function;
pub use alias::{AliasRequest, AliasRoutingConfig, VersionAlias};
pub use config::{
    DeadLetterConfig, EphemeralStorage, FileSystemConfig, ImageConfig, VersionConfig,
    VersionConfigBuilder, VpcConfig, MAX_EPHEMERAL_STORAGE, MAX_MEMORY_SIZE, MAX_TIMEOUT,
    MIN_EPHEMERAL_STORAGE, MIN_MEMORY_SIZE,
};
pub use resources::{
    AllowedPublishers, CodeSigningConfig, CodeSigningPolicies, Cors, DestinationConfig,
    EventInvokeConfig, FunctionResourcePolicy, FunctionUrlAuthType, FunctionUrlConfig,
    OnDestination, ProvisionedConcurrencyConfiguration, ProvisionedConcurrencyState,
    ProvisionedConcurrencyStatus, ResourcePolicy, UntrustedArtifactOnDeployment,
    MAX_EVENT_AGE_SECONDS, MAX_RETRY_ATTEMPTS, MIN_EVENT_AGE_SECONDS,
};
pub use runtime::{runtime_image, Architecture, PackageType, TracingMode, RUNTIME_IMAGES};
pub use state::{LastUpdateStatus, State, StateReasonCode, UpdateStatus, VersionState};
pub use version::{
    is_published_qualifier, qualified_lambda_arn, unqualified_lambda_arn, FunctionVersion,
    VersionIdentifier, LATEST,
};
