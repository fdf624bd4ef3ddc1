//! Lazily materialized local copy of a remote code archive.

use super::archive;
use super::config::CacheConfig;
use super::reference::ArtifactRef;
use crate::store::ObjectStore;
use crate::{Error, Result};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A code archive stored remotely, plus its unzipped copy on local disk.
///
/// ## Local cache
///
/// After [`materialize_for_execution`](Self::materialize_for_execution) the
/// unzipped archive lives at `<base>/lambda/<bucket>/<id>/code`, ready to be
/// mounted or copied by an execution engine. The whole `<id>` directory is
/// removed by [`evict_local`](Self::evict_local) or [`destroy`](Self::destroy).
///
/// ## Concurrency
///
/// One disk lock per artifact serializes materialization and eviction. The
/// first caller downloads and unzips; concurrent callers block on the lock and
/// then find the directory in place. Extraction happens in a scratch directory
/// that is renamed to `code` only once complete, so a half-written cache is
/// never visible at the target path.
pub struct ArtifactCache {
    artifact: ArtifactRef,
    store: Arc<dyn ObjectStore>,
    code_location: PathBuf,
    presign_expiry: Duration,
    disk_lock: Mutex<()>,
}

impl ArtifactCache {
    /// Wrap an artifact reference.
    #[must_use]
    pub fn new(artifact: ArtifactRef, store: Arc<dyn ObjectStore>, config: &CacheConfig) -> Self {
        let code_location = config
            .base_dir()
            .join("lambda")
            .join(artifact.s3_bucket())
            .join(artifact.id())
            .join("code");
        Self {
            artifact,
            store,
            code_location,
            presign_expiry: config.presign_expiry(),
            disk_lock: Mutex::new(()),
        }
    }

    /// Get the wrapped artifact reference.
    #[must_use]
    pub const fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    /// Get the artifact ID.
    #[must_use]
    pub fn id(&self) -> &str {
        self.artifact.id()
    }

    /// Location of the unzipped code on disk (present or not).
    #[must_use]
    pub fn unzipped_code_location(&self) -> &Path {
        &self.code_location
    }

    /// Whether the unzipped code is currently present on disk.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.code_location.exists()
    }

    fn artifact_dir(&self) -> &Path {
        self.code_location
            .parent()
            .unwrap_or(self.code_location.as_path())
    }

    /// Make sure the unzipped code is on local disk and return its location.
    ///
    /// Returns immediately when the directory already exists; its content is
    /// not re-checked. Otherwise downloads the archive (pinned to the object
    /// version when set), checks its digest and unzips it. Blocks for the
    /// whole download when another thread is materializing the same artifact.
    ///
    /// # Errors
    ///
    /// - [`Error::ArtifactUnavailable`] if the object is missing, the download
    ///   fails, the digest does not match or the archive is unreadable
    /// - [`Error::Io`] if the local cache directory cannot be written
    pub fn materialize_for_execution(&self) -> Result<PathBuf> {
        let target = &self.code_location;
        let _guard = self.disk_lock.lock();
        if target.exists() {
            return Ok(target.clone());
        }

        debug!(artifact_id = %self.id(), path = %target.display(), "Saving code to disk");
        let artifact_dir = self.artifact_dir();
        fs::create_dir_all(artifact_dir)?;

        let mut file = tempfile::tempfile_in(artifact_dir)?;
        let body = self
            .store
            .get_object(&self.artifact.location())
            .map_err(|e| Error::artifact_unavailable(self.id(), e))?;
        let digest = archive::spool(body, &mut file)
            .map_err(|e| Error::artifact_unavailable(self.id(), format!("download failed: {e}")))?;

        if !digest.eq_ignore_ascii_case(self.artifact.code_sha256()) {
            return Err(Error::artifact_unavailable(
                self.id(),
                format!(
                    "digest mismatch: expected {}, downloaded {digest}",
                    self.artifact.code_sha256()
                ),
            ));
        }

        let scratch = tempfile::Builder::new()
            .prefix(".code-")
            .tempdir_in(artifact_dir)?;
        archive::extract(&mut file, scratch.path())
            .map_err(|e| Error::artifact_unavailable(self.id(), format!("unzip failed: {e}")))?;
        fs::rename(scratch.path(), target)?;

        debug!(artifact_id = %self.id(), "Code saved to disk");
        Ok(target.clone())
    }

    /// Materialize on the blocking thread pool.
    ///
    /// Dropping the returned future does not cancel the download; it runs to
    /// completion and later callers reuse the result.
    ///
    /// # Errors
    ///
    /// Same as [`materialize_for_execution`](Self::materialize_for_execution),
    /// plus [`Error::Other`] if the blocking task panics.
    #[cfg(feature = "tokio")]
    pub async fn materialize_for_execution_async(self: Arc<Self>) -> Result<PathBuf> {
        tokio::task::spawn_blocking(move || self.materialize_for_execution())
            .await
            .map_err(|e| Error::Other(format!("materialization task failed: {e}")))?
    }

    /// Time-limited URL granting direct read access to the remote archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactUnavailable`] if the store cannot sign a URL.
    pub fn generate_presigned_url(&self) -> Result<String> {
        self.store
            .presign_get_object(&self.artifact.location(), self.presign_expiry)
            .map_err(|e| Error::artifact_unavailable(self.id(), e))
    }

    /// Remove the local copy, if any. Failures are logged, not raised.
    pub fn evict_local(&self) {
        let _guard = self.disk_lock.lock();
        let artifact_dir = self.artifact_dir();
        if !artifact_dir.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(artifact_dir) {
            warn!(
                artifact_id = %self.id(),
                path = %artifact_dir.display(),
                error = %e,
                "Could not clean up function code path"
            );
        }
    }

    /// Delete the local copy and the remote archive.
    ///
    /// A failing remote delete is logged and swallowed; the archive then stays
    /// behind as an orphaned object.
    pub fn destroy(&self) {
        debug!(artifact_id = %self.id(), "Final code destruction");
        self.evict_local();
        if let Err(e) = self.store.delete_object(&self.artifact.location()) {
            warn!(
                artifact_id = %self.id(),
                bucket = %self.artifact.s3_bucket(),
                key = %self.artifact.s3_key(),
                error = %e,
                "Cannot delete code archive"
            );
        }
    }
}

impl std::fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("artifact", &self.artifact)
            .field("code_location", &self.code_location)
            .finish_non_exhaustive()
    }
}

impl Serialize for ArtifactCache {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.artifact.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;

    fn cache_for(store: Arc<MemoryObjectStore>, base: &Path, id: &str) -> ArtifactCache {
        let config = CacheConfig::builder().base_dir(base).build();
        let artifact = ArtifactRef::new(id, "tasks", format!("{id}.zip"), None, "00", 2);
        ArtifactCache::new(artifact, store, &config)
    }

    #[test]
    fn test_code_location_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_for(Arc::new(MemoryObjectStore::new()), dir.path(), "a1");
        assert_eq!(
            cache.unzipped_code_location(),
            dir.path().join("lambda").join("tasks").join("a1").join("code")
        );
        assert!(!cache.is_materialized());
    }

    #[test]
    fn test_missing_object_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_for(Arc::new(MemoryObjectStore::new()), dir.path(), "a1");
        let err = cache.materialize_for_execution().unwrap_err();
        assert!(matches!(err, Error::ArtifactUnavailable { ref artifact_id, .. } if artifact_id == "a1"));
        assert!(!cache.is_materialized());
    }

    #[test]
    fn test_digest_mismatch_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        store.put_object("tasks", "a1.zip", b"PK".to_vec()).unwrap();
        let cache = cache_for(store, dir.path(), "a1");

        let err = cache.materialize_for_execution().unwrap_err();
        assert!(err.to_string().contains("digest mismatch"));
        assert!(!cache.is_materialized());
    }

    #[test]
    fn test_evict_absent_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_for(Arc::new(MemoryObjectStore::new()), dir.path(), "a1");
        cache.evict_local();
        cache.evict_local();
        assert!(!cache.is_materialized());
    }

    #[test]
    fn test_serializes_as_reference() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_for(Arc::new(MemoryObjectStore::new()), dir.path(), "a1");
        let json = serde_json::to_value(&cache).unwrap();
        assert_eq!(json["id"], "a1");
        assert_eq!(json["s3_bucket"], "tasks");
    }
}
