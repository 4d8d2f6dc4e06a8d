//! Error types for the permissions module.

use pathgate_core::{Address, PathError, PermissionKey};
use thiserror::Error;

/// Errors that can occur during permission operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// Caller is not the current administrator.
    #[error("{0} is not the administrator")]
    NotAdmin(Address),

    /// Administration was renounced; no admin operation can succeed again.
    #[error("administration has been renounced")]
    AdminDisabled,

    /// The zero address cannot be made administrator.
    #[error("invalid administrator address {0}")]
    InvalidAdmin(Address),

    /// A prefix failed the grammar.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(#[from] PathError),

    /// A replayed log entry does not carry the prefix list.
    #[error("prefix list for {0} was not indexed in the log")]
    PrefixesNotIndexed(PermissionKey),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
