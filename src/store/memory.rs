//! In-memory object store using `DashMap`.
//!
//! Objects are versioned: every `put_object` appends a new version and the
//! unpinned read returns the newest one. Data is lost on process restart.

use super::{ObjectLocation, ObjectStore, ObjectStoreError};
use crate::revision::short_id;
use chrono::Utc;
use dashmap::DashMap;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct StoredVersion {
    version_id: String,
    body: Arc<Vec<u8>>,
}

/// Versioned in-memory object store.
///
/// Thread-safe; keeps a counter of `get_object` calls so callers can observe
/// how often an archive was actually downloaded.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<(String, String), Vec<StoredVersion>>,
    gets: AtomicUsize,
}

impl MemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `get_object` calls served so far.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Check whether a bucket/key has at least one stored version.
    #[must_use]
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .is_some_and(|versions| !versions.is_empty())
    }

    /// Number of distinct keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn lookup(&self, location: &ObjectLocation) -> Result<Arc<Vec<u8>>, ObjectStoreError> {
        let versions = self
            .objects
            .get(&(location.bucket.clone(), location.key.clone()))
            .ok_or_else(|| no_such_key(location))?;

        let found = match &location.version_id {
            Some(wanted) => versions.iter().find(|v| &v.version_id == wanted),
            None => versions.last(),
        };

        match (found, &location.version_id) {
            (Some(version), _) => Ok(Arc::clone(&version.body)),
            (None, Some(version_id)) => Err(ObjectStoreError::NoSuchVersion {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                version_id: version_id.clone(),
            }),
            (None, None) => Err(no_such_key(location)),
        }
    }
}

fn no_such_key(location: &ObjectLocation) -> ObjectStoreError {
    ObjectStoreError::NoSuchKey {
        bucket: location.bucket.clone(),
        key: location.key.clone(),
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get_object(
        &self,
        location: &ObjectLocation,
    ) -> Result<Box<dyn Read + Send>, ObjectStoreError> {
        let body = self.lookup(location)?;
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(body.as_ref().clone())))
    }

    fn presign_get_object(
        &self,
        location: &ObjectLocation,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError> {
        self.lookup(location)?;
        let expires_in = chrono::Duration::from_std(expires_in)
            .map_err(|e| ObjectStoreError::Backend(format!("invalid expiry: {e}")))?;
        let expires_at = (Utc::now() + expires_in).timestamp();

        let mut url = format!(
            "memory://{}/{}?X-Expires={expires_at}",
            location.bucket, location.key
        );
        if let Some(version_id) = &location.version_id {
            url.push_str("&versionId=");
            url.push_str(version_id);
        }
        Ok(url)
    }

    fn delete_object(&self, location: &ObjectLocation) -> Result<(), ObjectStoreError> {
        let key = (location.bucket.clone(), location.key.clone());
        let mut versions = self.objects.get_mut(&key).ok_or_else(|| no_such_key(location))?;

        match &location.version_id {
            Some(version_id) => {
                let before = versions.len();
                versions.retain(|v| &v.version_id != version_id);
                if versions.len() == before {
                    return Err(ObjectStoreError::NoSuchVersion {
                        bucket: location.bucket.clone(),
                        key: location.key.clone(),
                        version_id: version_id.clone(),
                    });
                }
            }
            None => versions.clear(),
        }

        let now_empty = versions.is_empty();
        drop(versions);
        if now_empty {
            self.objects.remove_if(&key, |_, v| v.is_empty());
        }
        Ok(())
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<Option<String>, ObjectStoreError> {
        let version_id = short_id(32);
        self.objects
            .entry((bucket.to_string(), key.to_string()))
            .or_default()
            .push(StoredVersion {
                version_id: version_id.clone(),
                body: Arc::new(body),
            });
        Ok(Some(version_id))
    }
}
