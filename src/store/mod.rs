//! Object storage contract for code archives
//!
//! The model never talks to a concrete storage backend. Code archives live in
//! an object store reachable through the [`ObjectStore`] trait; hosts plug in
//! their S3 client, tests and embedded setups use [`MemoryObjectStore`].
//!
//! # Example
//!
//! ```rust
//! use lambda_model::store::{MemoryObjectStore, ObjectLocation, ObjectStore};
//! use std::io::Read;
//!
//! # fn example() -> Result<(), lambda_model::store::ObjectStoreError> {
//! let store = MemoryObjectStore::new();
//! let version = store.put_object("code-bucket", "fn/archive.zip", b"PK..".to_vec())?;
//!
//! let location = ObjectLocation::new("code-bucket", "fn/archive.zip", version);
//! let mut body = Vec::new();
//! store.get_object(&location)?.read_to_end(&mut body).unwrap();
//! assert_eq!(body, b"PK..");
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryObjectStore;

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Address of one object (optionally one object version) in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
    /// Pinned object version, `None` for the current one
    pub version_id: Option<String>,
}

impl ObjectLocation {
    /// Build a location.
    #[must_use]
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        version_id: Option<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id,
        }
    }
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)?;
        if let Some(version) = &self.version_id {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

/// Failures reported by an object store backend.
///
/// The model treats all of them as retryable by the caller; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    /// Bucket/key does not exist
    #[error("No such key: {bucket}/{key}")]
    NoSuchKey {
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
    },

    /// Key exists but the pinned version does not
    #[error("No such version {version_id} of {bucket}/{key}")]
    NoSuchVersion {
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
        /// Requested version
        version_id: String,
    },

    /// Transport or backend failure
    #[error("Object store backend error: {0}")]
    Backend(String),
}

/// Blocking object storage contract.
///
/// Implementations must be safe to share across threads; the artifact cache
/// calls them from whichever worker happens to need the code.
pub trait ObjectStore: Send + Sync {
    /// Stream the object body.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::NoSuchKey`] / [`ObjectStoreError::NoSuchVersion`]
    /// when the object is missing, [`ObjectStoreError::Backend`] otherwise.
    fn get_object(
        &self,
        location: &ObjectLocation,
    ) -> Result<Box<dyn Read + Send>, ObjectStoreError>;

    /// Produce a time-limited URL granting direct read access to the object.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot sign the request.
    fn presign_get_object(
        &self,
        location: &ObjectLocation,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError>;

    /// Delete the object (or the pinned object version).
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or the backend fails.
    fn delete_object(&self, location: &ObjectLocation) -> Result<(), ObjectStoreError>;

    /// Store a new object, returning the version id assigned by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<Option<String>, ObjectStoreError>;
}
