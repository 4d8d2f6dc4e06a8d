//! Error types for the registry.

use pathgate_core::{Address, CanonicalPath, PathError, PermissionKey, TokenId};
use pathgate_perms::PermsError;
use pathgate_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
///
/// Every variant aborts the whole operation; nothing is written and no event
/// is logged.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Write attempted with an empty content identifier.
    #[error("cid must not be empty")]
    EmptyCid,

    /// The key's ownership contract is not a deployed contract.
    #[error("{0} is not a deployed contract")]
    InvalidNftContract(Address),

    /// Caller is not the current owner of the key's token, or the owner
    /// could not be resolved.
    #[error("{caller} does not own token {key}")]
    NotTokenOwner {
        key: PermissionKey,
        caller: Address,
    },

    /// An administrator blocked writes for this key.
    #[error("writes revoked for {0}")]
    TokenWritesRevoked(PermissionKey),

    /// Path or prefix failed the grammar.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// No granted prefix covers the path.
    #[error("{key} is not authorized to write {path}")]
    UnauthorizedPath {
        key: PermissionKey,
        path: CanonicalPath,
    },

    /// Read against a path with no record.
    #[error("no file at {0}")]
    FileNotFound(CanonicalPath),

    /// Caller is not the administrator.
    #[error("{0} is not the administrator")]
    NotAdmin(Address),

    /// Administration was renounced.
    #[error("administration has been renounced")]
    AdminDisabled,

    /// The zero address cannot be made administrator.
    #[error("invalid administrator address {0}")]
    InvalidAdmin(Address),

    /// Replacement set exceeds the configured limit.
    #[error("{key}: {count} prefixes exceeds the limit of {max}")]
    TooManyPrefixes {
        key: PermissionKey,
        count: usize,
        max: usize,
    },

    /// `create` called on a store that already holds a registry.
    #[error("registry already initialized")]
    AlreadyInitialized,

    /// `open` called on an empty store.
    #[error("registry not initialized")]
    NotInitialized,

    /// Permission state error not covered above.
    #[error("permission error: {0}")]
    Permission(PermsError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<PermsError> for RegistryError {
    fn from(err: PermsError) -> Self {
        match err {
            PermsError::NotAdmin(caller) => RegistryError::NotAdmin(caller),
            PermsError::AdminDisabled => RegistryError::AdminDisabled,
            PermsError::InvalidAdmin(addr) => RegistryError::InvalidAdmin(addr),
            PermsError::InvalidPrefix(path) => RegistryError::InvalidPath(path),
            other => RegistryError::Permission(other),
        }
    }
}

/// Coarse failure classes, for callers deciding whether and when to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Grammar failure. Always a caller bug.
    InvalidGrammar,
    /// Ownership contract is not deployed.
    InvalidTarget,
    /// Caller does not own the token.
    NotAuthorized,
    /// Administrator block on the key.
    WritesRevoked,
    /// No covering prefix.
    UnauthorizedPath,
    /// Read of a missing record.
    NotFound,
    /// Empty CID.
    EmptyValue,
    /// Administrator operation refused.
    AdminDenied,
    /// Configured limit exceeded.
    LimitExceeded,
    /// Registry lifecycle misuse.
    Lifecycle,
    /// Storage backend failure.
    Storage,
}

impl ErrorKind {
    /// Whether the same call may succeed once the token changes hands.
    pub fn is_retryable_after_transfer(&self) -> bool {
        matches!(self, ErrorKind::NotAuthorized)
    }

    /// Whether the failure is a write-authorization decision, as opposed to
    /// an infrastructure failure.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidGrammar
                | ErrorKind::InvalidTarget
                | ErrorKind::NotAuthorized
                | ErrorKind::WritesRevoked
                | ErrorKind::UnauthorizedPath
        )
    }
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::EmptyCid => ErrorKind::EmptyValue,
            RegistryError::InvalidNftContract(_) => ErrorKind::InvalidTarget,
            RegistryError::NotTokenOwner { .. } => ErrorKind::NotAuthorized,
            RegistryError::TokenWritesRevoked(_) => ErrorKind::WritesRevoked,
            RegistryError::InvalidPath(_) => ErrorKind::InvalidGrammar,
            RegistryError::UnauthorizedPath { .. } => ErrorKind::UnauthorizedPath,
            RegistryError::FileNotFound(_) => ErrorKind::NotFound,
            RegistryError::NotAdmin(_)
            | RegistryError::AdminDisabled
            | RegistryError::InvalidAdmin(_) => ErrorKind::AdminDenied,
            RegistryError::TooManyPrefixes { .. } => ErrorKind::LimitExceeded,
            RegistryError::AlreadyInitialized | RegistryError::NotInitialized => {
                ErrorKind::Lifecycle
            }
            RegistryError::Permission(_) | RegistryError::Store(_) => ErrorKind::Storage,
        }
    }

    /// The permission key the failure concerns, if any.
    pub fn key(&self) -> Option<&PermissionKey> {
        match self {
            RegistryError::NotTokenOwner { key, .. }
            | RegistryError::TokenWritesRevoked(key)
            | RegistryError::UnauthorizedPath { key, .. }
            | RegistryError::TooManyPrefixes { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors from the in-memory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no contract deployed at {0}")]
    NotDeployed(Address),

    #[error("contract {0} does not track token ownership")]
    NotNft(Address),

    #[error("address {0} is already in use")]
    AddressInUse(Address),

    #[error("token {token_id} already minted in {contract}")]
    AlreadyMinted { contract: Address, token_id: TokenId },

    #[error("token {token_id} does not exist in {contract}")]
    NoSuchToken { contract: Address, token_id: TokenId },

    #[error("{from} does not hold token {token_id} in {contract}")]
    NotHolder {
        contract: Address,
        token_id: TokenId,
        from: Address,
    },

    #[error("cannot assign a token to the zero address")]
    ZeroRecipient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_taxonomy() {
        let key = PermissionKey::new(Address::repeat_byte(1), 1u64);
        let not_owner = RegistryError::NotTokenOwner {
            key,
            caller: Address::repeat_byte(2),
        };
        assert_eq!(not_owner.kind(), ErrorKind::NotAuthorized);
        assert!(not_owner.kind().is_retryable_after_transfer());
        assert_eq!(not_owner.key(), Some(&key));

        let revoked = RegistryError::TokenWritesRevoked(key);
        assert!(!revoked.kind().is_retryable_after_transfer());
        assert!(revoked.kind().is_authorization_failure());

        let missing = RegistryError::FileNotFound(CanonicalPath::parse("/a").unwrap());
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(!missing.kind().is_authorization_failure());
    }

    #[test]
    fn test_perms_error_mapping() {
        let admin = Address::repeat_byte(9);
        assert!(matches!(
            RegistryError::from(PermsError::NotAdmin(admin)),
            RegistryError::NotAdmin(a) if a == admin
        ));
        assert!(matches!(
            RegistryError::from(PermsError::AdminDisabled),
            RegistryError::AdminDisabled
        ));
        assert!(matches!(
            RegistryError::from(PermsError::InvalidPrefix(PathError::Empty)),
            RegistryError::InvalidPath(PathError::Empty)
        ));
    }
}
