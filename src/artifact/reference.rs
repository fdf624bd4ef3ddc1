//! Artifact Reference - identity of a code archive in object storage

use crate::store::ObjectLocation;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifies one code archive stored remotely.
///
/// The `code_sha256` is the lowercase hex SHA-256 of the archive bytes and is
/// checked once, when the archive is first materialized to disk. Identity is
/// the `id`: two references with the same id point at the same archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRef {
    id: String,
    s3_bucket: String,
    s3_key: String,
    s3_object_version: Option<String>,
    code_sha256: String,
    code_size: u64,
}

impl ArtifactRef {
    /// Create a new artifact reference.
    ///
    /// # Arguments
    ///
    /// * `id` - Artifact identifier, unique per bucket
    /// * `s3_bucket` - Bucket holding the archive
    /// * `s3_key` - Object key of the archive
    /// * `s3_object_version` - Pinned object version, if the bucket is versioned
    /// * `code_sha256` - Hex SHA-256 digest of the archive
    /// * `code_size` - Archive size in bytes
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        s3_bucket: impl Into<String>,
        s3_key: impl Into<String>,
        s3_object_version: Option<String>,
        code_sha256: impl Into<String>,
        code_size: u64,
    ) -> Self {
        Self {
            id: id.into(),
            s3_bucket: s3_bucket.into(),
            s3_key: s3_key.into(),
            s3_object_version,
            code_sha256: code_sha256.into(),
            code_size,
        }
    }

    /// Build a reference for archive bytes, computing digest and size.
    #[must_use]
    pub fn for_archive(
        id: impl Into<String>,
        s3_bucket: impl Into<String>,
        s3_key: impl Into<String>,
        s3_object_version: Option<String>,
        archive: &[u8],
    ) -> Self {
        Self::new(
            id,
            s3_bucket,
            s3_key,
            s3_object_version,
            sha256_hex(archive),
            archive.len() as u64,
        )
    }

    /// Get the artifact ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the bucket name.
    #[must_use]
    pub fn s3_bucket(&self) -> &str {
        &self.s3_bucket
    }

    /// Get the object key.
    #[must_use]
    pub fn s3_key(&self) -> &str {
        &self.s3_key
    }

    /// Get the pinned object version, if any.
    #[must_use]
    pub fn s3_object_version(&self) -> Option<&str> {
        self.s3_object_version.as_deref()
    }

    /// Get the hex SHA-256 digest of the archive.
    #[must_use]
    pub fn code_sha256(&self) -> &str {
        &self.code_sha256
    }

    /// Get the archive size in bytes.
    #[must_use]
    pub const fn code_size(&self) -> u64 {
        self.code_size
    }

    /// Object store location of the archive.
    #[must_use]
    pub fn location(&self) -> ObjectLocation {
        ObjectLocation::new(
            self.s3_bucket.clone(),
            self.s3_key.clone(),
            self.s3_object_version.clone(),
        )
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
