//! Artifact cache configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lifetime of presigned archive URLs (one hour).
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// Where and how code archives are materialized.
///
/// Unzipped code lives at `<base_dir>/lambda/<bucket>/<artifact-id>/code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    base_dir: PathBuf,
    #[serde(with = "duration_secs")]
    presign_expiry: Duration,
}

impl CacheConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Base directory of the local cache.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Lifetime of presigned archive URLs.
    #[must_use]
    pub const fn presign_expiry(&self) -> Duration {
        self.presign_expiry
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir(),
            presign_expiry: DEFAULT_PRESIGN_EXPIRY,
        }
    }
}

/// Builder for `CacheConfig`.
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set the base directory of the local cache.
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    /// Set the lifetime of presigned URLs.
    #[must_use]
    pub const fn presign_expiry(mut self, expiry: Duration) -> Self {
        self.config.presign_expiry = expiry;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.base_dir(), std::env::temp_dir());
        assert_eq!(config.presign_expiry(), Duration::from_secs(3600));
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::builder()
            .base_dir("/var/cache/fn")
            .presign_expiry(Duration::from_secs(60))
            .build();
        assert_eq!(config.base_dir(), Path::new("/var/cache/fn"));
        assert_eq!(config.presign_expiry(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_json_partial() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"presign_expiry": 900}"#).expect("valid config");
        assert_eq!(config.presign_expiry(), Duration::from_secs(900));
        assert_eq!(config.base_dir(), std::env::temp_dir());
    }
}
