//! Code artifacts: remote archives and their local materialization
//!
//! ```text
//! ArtifactRef ──> ArtifactCache ──> <base>/lambda/<bucket>/<id>/code
//!     │                │
//!     └─ bucket/key    └─ ObjectStore (get / presign / delete)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use lambda_model::artifact::{create_archive, CacheConfig};
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
//! let path = code.materialize_for_execution()?;
//! println!("code unzipped at {}", path.display());
//! code.destroy();
//! # Ok(())
//! # }
//! ```

mod archive;
mod cache;
mod config;
mod reference;

pub use cache::ArtifactCache;
pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_PRESIGN_EXPIRY};
pub use reference::{sha256_hex, ArtifactRef};

use crate::limits::AccountSettings;
use crate::revision::short_id;
use crate::store::ObjectStore;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Upload a new code archive and wrap it in a cache entry.
///
/// The archive gets a fresh id and is stored at `code/<id>.zip` in `bucket`.
/// Its digest and size are computed here; the digest is verified again when
/// the archive is first materialized.
///
/// # Errors
///
/// - [`Error::RequestEntityTooLarge`] if the zipped archive exceeds the limit
/// - [`Error::Validation`] if the archive is not a readable zip or unzips
///   beyond the limit
/// - [`Error::ArtifactUnavailable`] if the store rejects the upload
pub fn create_archive(
    store: Arc<dyn ObjectStore>,
    config: &CacheConfig,
    settings: &AccountSettings,
    bucket: &str,
    archive: Vec<u8>,
) -> Result<Arc<ArtifactCache>> {
    settings.check_zipped_size(archive.len() as u64)?;
    let unzipped = archive::unzipped_size(&archive)
        .map_err(|e| Error::Validation(format!("Could not unzip uploaded file: {e}")))?;
    settings.check_unzipped_size(unzipped)?;

    let id = short_id(32);
    let key = format!("code/{id}.zip");
    let code_sha256 = sha256_hex(&archive);
    let code_size = archive.len() as u64;

    let version = store
        .put_object(bucket, &key, archive)
        .map_err(|e| Error::artifact_unavailable(&id, e))?;

    info!(artifact_id = %id, bucket, code_size, "Stored code archive");
    let artifact = ArtifactRef::new(id, bucket, key, version, code_sha256, code_size);
    Ok(Arc::new(ArtifactCache::new(artifact, store, config)))
}
