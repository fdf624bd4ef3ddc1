//! # lambda-model: Function, Version and Code Artifact Model
//!
//! **Version**: 0.1.0
//!
//! The resource model behind a Lambda-compatible execution platform: functions
//! with immutable published versions, aliases with weighted traffic splits,
//! and code archives that are materialized on local disk at most once.
//!
//! ## Design Principles
//!
//! - **Immutable records**: every update yields a new version or alias with a
//!   fresh revision token
//! - **Single-flight materialization**: concurrent callers share one download
//! - **Eager cleanup**: an artifact is destroyed when its last version goes
//! - **Absorbed cleanup failures**: eviction and remote deletion only log
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lambda_model::artifact::{create_archive, CacheConfig};
//! use lambda_model::function::{AliasRequest, Function, VersionConfig};
//! use lambda_model::limits::AccountSettings;
//! use lambda_model::store::MemoryObjectStore;
//! use std::sync::Arc;
//!
//! # fn example(zip_bytes: Vec<u8>) -> lambda_model::Result<()> {
//! let store = Arc::new(MemoryObjectStore::new());
//! let code = create_archive(
//!     store,
//!     &CacheConfig::default(),
//!     &AccountSettings::default(),
//!     "awslambda-us-east-1-tasks",
//!     zip_bytes,
//! )?;
//!
//! let config = VersionConfig::builder(code)
//!     .runtime("python3.9")
//!     .handler("index.handler")
//!     .build()?;
//! let function = Function::new("orders", "us-east-1", "000000000000", config.clone());
//! function.publish_version(config)?;
//! function.upsert_alias("live", AliasRequest::new("1"))?;
//!
//! let version = function.resolve(Some("live"), &mut rand::thread_rng())?;
//! let code_dir = version.config().code().materialize_for_execution()?;
//! println!("{} runs from {}", version.qualified_arn(), code_dir.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod artifact;
pub mod endpoint;
pub mod error;
pub mod function;
pub mod limits;
pub mod revision;
pub mod store;

pub use error::{Error, Result};
