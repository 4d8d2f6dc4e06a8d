//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use pathgate_core::{Cid, Event, EventBody, PathHash, PermissionKey};
use pathgate_perms::{AdminState, PermissionRecord};

use crate::error::{Result, StoreError};
use crate::traits::{FileRecord, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// File records: path hash -> latest cid.
    files: HashMap<PathHash, Cid>,

    /// Permission records.
    permissions: HashMap<PermissionKey, PermissionRecord>,

    /// Administrator state.
    admin: Option<AdminState>,

    /// Audit log, `events[i].seq == i + 1`.
    events: Vec<Event>,
}

impl MemoryStoreInner {
    fn append(&mut self, body: EventBody) -> Event {
        let event = Event::new(self.events.len() as u64 + 1, body);
        self.events.push(event.clone());
        event
    }

    fn filtered(&self, pred: impl Fn(&EventBody) -> bool) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| pred(&e.body))
            .cloned()
            .collect()
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_file(&self, path_hash: &PathHash) -> Result<Option<FileRecord>> {
        let inner = self.read()?;
        Ok(inner.files.get(path_hash).map(|cid| FileRecord {
            path_hash: *path_hash,
            cid: cid.clone(),
        }))
    }

    async fn upsert_file(&self, record: &FileRecord, event: EventBody) -> Result<Event> {
        let mut inner = self.write()?;
        inner.files.insert(record.path_hash, record.cid.clone());
        Ok(inner.append(event))
    }

    async fn get_permission(&self, key: &PermissionKey) -> Result<Option<PermissionRecord>> {
        let inner = self.read()?;
        Ok(inner.permissions.get(key).cloned())
    }

    async fn put_permission(
        &self,
        key: &PermissionKey,
        record: &PermissionRecord,
        event: EventBody,
    ) -> Result<Event> {
        let mut inner = self.write()?;
        inner.permissions.insert(*key, record.clone());
        Ok(inner.append(event))
    }

    async fn get_admin(&self) -> Result<Option<AdminState>> {
        Ok(self.read()?.admin)
    }

    async fn put_admin(&self, state: &AdminState, event: EventBody) -> Result<Event> {
        let mut inner = self.write()?;
        inner.admin = Some(*state);
        Ok(inner.append(event))
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<Event>> {
        let inner = self.read()?;
        let start = usize::try_from(after_seq)
            .unwrap_or(usize::MAX)
            .min(inner.events.len());
        Ok(inner.events[start..].to_vec())
    }

    async fn events_for_key(&self, key: &PermissionKey) -> Result<Vec<Event>> {
        Ok(self.read()?.filtered(|body| body.key() == Some(key)))
    }

    async fn events_for_path(&self, path_hash: &PathHash) -> Result<Vec<Event>> {
        Ok(self.read()?.filtered(|body| body.path_hash() == Some(path_hash)))
    }

    async fn head_seq(&self) -> Result<u64> {
        Ok(self.read()?.events.len() as u64)
    }
}
