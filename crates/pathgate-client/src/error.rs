//! Error types for the client helpers.

use pathgate::perms::PermsError;
use pathgate::{PathError, PermissionKey, RegistryError};
use thiserror::Error;

/// Errors that can occur in client-side operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Path or prefix rejected before any registry call.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// The registry refused or failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The audit log could not be folded into local state.
    #[error("replay error: {0}")]
    Replay(#[from] PermsError),

    /// A capability check did not answer in time.
    #[error("timeout checking {0}")]
    Timeout(PermissionKey),

    /// A background check task failed.
    #[error("task failed: {0}")]
    Task(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
