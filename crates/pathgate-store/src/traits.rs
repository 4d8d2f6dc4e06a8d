//! Store trait: the abstract interface for registry persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pathgate_core::{Cid, Event, EventBody, PathHash, PermissionKey};
use pathgate_perms::{AdminState, PermissionRecord};

use crate::error::Result;

/// The latest value stored at a path.
///
/// Only the hash of the canonical path is kept; the path itself and the
/// writer are recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path_hash: PathHash,
    pub cid: Cid,
}

/// The Store trait: async interface for registry persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` is used internally to avoid blocking the
/// runtime.
///
/// # Design Notes
///
/// - **Atomic logging**: each mutating method appends exactly one event in
///   the same commit as the state change, and returns it with its sequence
///   number.
/// - **Dense sequence**: sequence numbers start at 1 and have no gaps.
/// - **Upsert only**: there is no delete for any record kind.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // File Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the file record stored under `path_hash`.
    async fn get_file(&self, path_hash: &PathHash) -> Result<Option<FileRecord>>;

    /// Create or overwrite a file record.
    async fn upsert_file(&self, record: &FileRecord, event: EventBody) -> Result<Event>;

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the permission record of `key`, if one was ever written.
    async fn get_permission(&self, key: &PermissionKey) -> Result<Option<PermissionRecord>>;

    /// Replace the permission record of `key`.
    async fn put_permission(
        &self,
        key: &PermissionKey,
        record: &PermissionRecord,
        event: EventBody,
    ) -> Result<Event>;

    // ─────────────────────────────────────────────────────────────────────────
    // Administrator
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the administrator state, `None` if the registry was never created.
    async fn get_admin(&self) -> Result<Option<AdminState>>;

    /// Replace the administrator state.
    async fn put_admin(&self, state: &AdminState, event: EventBody) -> Result<Event>;

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Log
    // ─────────────────────────────────────────────────────────────────────────

    /// Events with `seq > after_seq`, ordered by seq.
    async fn events_since(&self, after_seq: u64) -> Result<Vec<Event>>;

    /// Events filed under `key`, ordered by seq.
    async fn events_for_key(&self, key: &PermissionKey) -> Result<Vec<Event>>;

    /// Events filed under `path_hash`, ordered by seq.
    async fn events_for_path(&self, path_hash: &PathHash) -> Result<Vec<Event>>;

    /// Sequence number of the newest event, 0 for an empty log.
    async fn head_seq(&self) -> Result<u64>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// The permission record of `key`, or the empty record.
    fn permission_or_default(
        &self,
        key: &PermissionKey,
    ) -> impl std::future::Future<Output = Result<PermissionRecord>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn permission_or_default(&self, key: &PermissionKey) -> Result<PermissionRecord> {
        Ok(self.get_permission(key).await?.unwrap_or_default())
    }
}
