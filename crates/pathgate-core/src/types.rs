//! Strong type definitions for Pathgate.
//!
//! Identifiers are newtypes so a token id can never be passed where a path
//! hash is expected.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalPath;
use crate::error::CoreError;

/// A 20-byte ledger account or contract address.
pub use alloy_primitives::Address;

/// Identifier of a token inside its ownership contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TokenId(pub U256);

impl TokenId {
    /// Big-endian 32-byte encoding, as used for storage keys.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    /// Decode from the big-endian 32-byte encoding.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        Self(U256::from(id))
    }
}

impl From<U256> for TokenId {
    fn from(id: U256) -> Self {
        Self(id)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The composite key that scopes a prefix set and a revocation flag.
///
/// Whoever currently owns `token_id` in `contract` may exercise the key's
/// write capability. The key itself is never stored as an entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Contract answering `ownerOf` for this key.
    pub contract: Address,
    /// Token inside that contract.
    pub token_id: TokenId,
}

impl PermissionKey {
    /// Create a new permission key.
    pub fn new(contract: Address, token_id: impl Into<TokenId>) -> Self {
        Self {
            contract,
            token_id: token_id.into(),
        }
    }
}

impl fmt::Debug for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionKey({}#{})", self.contract, self.token_id)
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.contract, self.token_id)
    }
}

impl FromStr for PermissionKey {
    type Err = CoreError;

    /// Parse the `0x<contract>#<decimal token id>` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (contract, token) = s
            .split_once('#')
            .ok_or_else(|| CoreError::Address(format!("missing '#' in {s:?}")))?;
        let contract =
            Address::from_str(contract).map_err(|e| CoreError::Address(e.to_string()))?;
        let token_id = U256::from_str_radix(token, 10)
            .map_err(|e| CoreError::Address(format!("bad token id {token:?}: {e}")))?;
        Ok(Self::new(contract, token_id))
    }
}

/// Keccak-256 of a canonical path's UTF-8 bytes, with no length prefix or
/// separator. This is the key of the file record store and must match the
/// ledger contract bit for bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathHash(pub [u8; 32]);

impl PathHash {
    /// Hash a canonical path.
    pub fn of(path: &CanonicalPath) -> Self {
        Self(keccak256(path.as_str().as_bytes()).0)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::Hex(hex::FromHexError::InvalidStringLength))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for PathHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PathHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for PathHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An opaque content identifier. No format is enforced beyond non-emptiness
/// at write time.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Cid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Cid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({:?})", self.0)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
