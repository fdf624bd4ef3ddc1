//! Error types for the function/version model
//!
//! Every failure is scoped to a single request. Cleanup failures (cache
//! eviction, remote archive deletion) never surface here; they are logged and
//! absorbed by the artifact cache.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Function model error types
#[derive(Error, Debug)]
pub enum Error {
    /// Remote code archive is missing, unreachable or corrupt
    #[error("Code artifact {artifact_id} unavailable: {reason}")]
    ArtifactUnavailable {
        /// Identifier of the artifact
        artifact_id: String,
        /// What went wrong while reaching it
        reason: String,
    },

    /// Malformed alias/version reference, weight or parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation targets a qualifier, alias or config that does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Stale revision token or a mutation that conflicts with current state
    #[error("Resource conflict: {0}")]
    ResourceConflict(String),

    /// Payload exceeds a platform size limit
    #[error("Request entity too large: {0}")]
    RequestEntityTooLarge(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Machine-readable error code used by the surrounding API layer.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ArtifactUnavailable { .. } => "CodeStorageUnavailableException",
            Self::Validation(_) => "ValidationException",
            Self::NotFound(_) => "ResourceNotFoundException",
            Self::ResourceConflict(_) => "ResourceConflictException",
            Self::RequestEntityTooLarge(_) => "RequestEntityTooLargeException",
            Self::Io(_) | Self::Other(_) => "ServiceException",
        }
    }

    /// HTTP status the API layer answers with for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::ResourceConflict(_) => 409,
            Self::RequestEntityTooLarge(_) => 413,
            Self::ArtifactUnavailable { .. } => 503,
            Self::Io(_) | Self::Other(_) => 500,
        }
    }

    pub(crate) fn artifact_unavailable(artifact_id: &str, reason: impl ToString) -> Self {
        Self::ArtifactUnavailable {
            artifact_id: artifact_id.to_string(),
            reason: reason.to_string(),
        }
    }
}
