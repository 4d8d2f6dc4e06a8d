//! The registry surface the client helpers depend on.
//!
//! Kept narrow so a remote registry (reached over RPC) can stand in for the
//! in-process [`RegistryReader`].

use async_trait::async_trait;

use pathgate::store::Store;
use pathgate::{Address, Event, OwnershipOracle, PermissionKey, RegistryError, RegistryReader};

/// Result type for registry calls.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Read-only registry access used by the client.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Side-effect-free dry run of a write by `account` under `key`.
    async fn can_write(&self, key: &PermissionKey, account: &Address, path: &str)
        -> Result<bool>;

    /// Audit log entries with `seq > after_seq`, in order.
    async fn events_since(&self, after_seq: u64) -> Result<Vec<Event>>;
}

#[async_trait]
impl<S, O> RegistryApi for RegistryReader<S, O>
where
    S: Store + 'static,
    O: OwnershipOracle + 'static,
{
    async fn can_write(
        &self,
        key: &PermissionKey,
        account: &Address,
        path: &str,
    ) -> Result<bool> {
        RegistryReader::can_write(self, key, account, path).await
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<Event>> {
        RegistryReader::events_since(self, after_seq).await
    }
}
