//! Version lifecycle states

use serde::{Deserialize, Serialize};

/// Lifecycle state of a function version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// Version created, runtime/config not validated yet.
    Pending,
    /// Version can be invoked.
    Active,
    /// Version idle long enough to release its resources.
    Inactive,
    /// Validation of the version failed.
    Failed,
}

/// Machine-readable reason attached to a version state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateReasonCode {
    /// Idle
    Idle,
    /// Being created
    Creating,
    /// Being restored
    Restoring,
    /// ENI limit reached
    EniLimitExceeded,
    /// Execution role lacks permissions
    InsufficientRolePermissions,
    /// Configuration is invalid
    InvalidConfiguration,
    /// Platform error
    InternalError,
    /// Subnet has no free addresses
    SubnetOutOfIPAddresses,
    /// Subnet is invalid
    InvalidSubnet,
    /// Security group is invalid
    InvalidSecurityGroup,
    /// Container image deleted
    ImageDeleted,
    /// Container image not accessible
    ImageAccessDenied,
    /// Container image invalid
    InvalidImage,
}

/// Outcome of the last in-place configuration update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LastUpdateStatus {
    /// Update applied
    Successful,
    /// Update rejected
    Failed,
    /// Update still being applied
    InProgress,
}

/// State of a version together with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionState {
    /// Lifecycle state
    pub state: State,
    /// Reason code, if any
    pub code: Option<StateReasonCode>,
    /// Human-readable reason, if any
    pub reason: Option<String>,
}

impl VersionState {
    /// A freshly created version.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            state: State::Pending,
            code: None,
            reason: None,
        }
    }

    /// A validated, invokable version.
    #[must_use]
    pub const fn active() -> Self {
        Self {
            state: State::Active,
            code: None,
            reason: None,
        }
    }

    /// A version whose validation failed.
    #[must_use]
    pub fn failed(code: StateReasonCode, reason: impl Into<String>) -> Self {
        Self {
            state: State::Failed,
            code: Some(code),
            reason: Some(reason.into()),
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Only `Pending -> Active` and `Pending -> Failed` are recorded by the
    /// model; everything else is driven outside of it.
    #[must_use]
    pub const fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self.state, next.state),
            (State::Pending, State::Active | State::Failed)
        )
    }
}

impl Default for VersionState {
    fn default() -> Self {
        Self::pending()
    }
}

/// Status of the last in-place update of `$LATEST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    /// Update status, `None` if never updated
    pub status: Option<LastUpdateStatus>,
    /// Reason code, if any
    pub code: Option<String>,
    /// Human-readable reason, if any
    pub reason: Option<String>,
}

impl UpdateStatus {
    /// An update that is being applied.
    #[must_use]
    pub const fn in_progress() -> Self {
        Self {
            status: Some(LastUpdateStatus::InProgress),
            code: None,
            reason: None,
        }
    }

    /// An update that was applied.
    #[must_use]
    pub const fn successful() -> Self {
        Self {
            status: Some(LastUpdateStatus::Successful),
            code: None,
            reason: None,
        }
    }

    /// An update that was rejected.
    #[must_use]
    pub fn failed(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: Some(LastUpdateStatus::Failed),
            code: Some(code.into()),
            reason: Some(reason.into()),
        }
    }

    /// Whether this status ends an update cycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            Some(LastUpdateStatus::Successful | LastUpdateStatus::Failed)
        )
    }
}
