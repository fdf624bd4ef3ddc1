//! Platform limits and account settings
//!
//! Defaults match the documented service quotas. Limit *accounting* (summing
//! usage across functions) belongs to the control plane; this module only
//! carries the numbers and the per-request checks the model itself enforces.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum zipped deployment package size (50 MiB).
pub const CODE_SIZE_ZIPPED_DEFAULT: u64 = 52_428_800;
/// Maximum unzipped deployment package size (250 MiB).
pub const CODE_SIZE_UNZIPPED_DEFAULT: u64 = 262_144_000;
/// Concurrent executions per account.
pub const CONCURRENT_EXECUTIONS_DEFAULT: u32 = 150;
/// Maximum serialized size of a function's environment variables.
pub const MAX_FUNCTION_ENVVAR_SIZE_BYTES: usize = 4 * 1024;
/// Concurrency that must stay unreserved in every account.
pub const MINIMUM_UNRESERVED_CONCURRENCY: u32 = 100;

/// Per-account limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Zipped package limit in bytes
    pub code_size_zipped: u64,
    /// Unzipped package limit in bytes
    pub code_size_unzipped: u64,
    /// Concurrent executions
    pub concurrent_executions: u32,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            code_size_zipped: CODE_SIZE_ZIPPED_DEFAULT,
            code_size_unzipped: CODE_SIZE_UNZIPPED_DEFAULT,
            concurrent_executions: CONCURRENT_EXECUTIONS_DEFAULT,
        }
    }
}

impl AccountSettings {
    /// Reject a zipped archive larger than the account allows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestEntityTooLarge`] when `size` exceeds the limit.
    pub fn check_zipped_size(&self, size: u64) -> Result<()> {
        if size > self.code_size_zipped {
            return Err(Error::RequestEntityTooLarge(format!(
                "Zipped size must be smaller than {} bytes",
                self.code_size_zipped
            )));
        }
        Ok(())
    }

    /// Reject an unzipped package larger than the account allows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `size` exceeds the limit.
    pub fn check_unzipped_size(&self, size: u64) -> Result<()> {
        if size > self.code_size_unzipped {
            return Err(Error::Validation(format!(
                "Unzipped size must be smaller than {} bytes",
                self.code_size_unzipped
            )));
        }
        Ok(())
    }

    /// Reject a reservation that would leave less than the minimum unreserved
    /// concurrency in the account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the reservation is too large.
    pub fn check_reserved_concurrency(&self, already_reserved: u32, requested: u32) -> Result<()> {
        let unreserved = self
            .concurrent_executions
            .saturating_sub(already_reserved)
            .saturating_sub(requested);
        if unreserved < MINIMUM_UNRESERVED_CONCURRENCY {
            return Err(Error::Validation(format!(
                "Specified ReservedConcurrentExecutions for function decreases account's \
                 UnreservedConcurrentExecution below its minimum value of \
                 [{MINIMUM_UNRESERVED_CONCURRENCY}]."
            )));
        }
        Ok(())
    }
}

/// Reject environment variables whose serialized form exceeds 4 KiB.
///
/// # Errors
///
/// Returns [`Error::RequestEntityTooLarge`] when the limit is exceeded.
pub fn check_environment_size(
    environment: &std::collections::HashMap<String, String>,
) -> Result<()> {
    let size = serde_json::to_vec(environment)
        .map_err(|e| Error::Other(format!("environment not serializable: {e}")))?
        .len();
    if size > MAX_FUNCTION_ENVVAR_SIZE_BYTES {
        return Err(Error::RequestEntityTooLarge(format!(
            "Lambda was unable to configure your environment variables because the \
             environment variables you have provided exceeded the 4KB limit. \
             String measured: {size}"
        )));
    }
    Ok(())
}
