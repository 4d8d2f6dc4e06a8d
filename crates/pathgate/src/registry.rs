//! The Registry: write authorization state machine over a store.
//!
//! Mutations go through [`Registry`] and take `&mut self`, so at most one is
//! in flight at a time. Reads go through [`RegistryReader`], a cheap
//! cloneable handle that never mutates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pathgate_core::{
    Address, CanonicalPath, Cid, Event, EventBody, PathHash, PermissionKey,
};
use pathgate_perms::{AdminState, PrefixSet};
use pathgate_store::{FileRecord, Store, StoreExt};

use crate::error::{RegistryError, Result};
use crate::oracle::OwnershipOracle;

/// Configuration for the Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Whether "prefixes replaced" events carry the new prefix list.
    ///
    /// Without it, the log cannot be replayed into permission state.
    pub index_prefixes_in_events: bool,
    /// Upper bound on a key's prefix set after deduplication.
    pub max_prefixes_per_key: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            index_prefixes_in_events: true,
            max_prefixes_per_key: None,
        }
    }
}

/// Read-only handle onto a registry.
///
/// Every query is evaluated against the store's current state and never
/// blocks a writer for longer than one store call.
///
/// The handle does not expose the underlying store, so holding one grants no
/// way around the write preconditions or the administrator checks:
///
/// ```compile_fail
/// use pathgate::store::MemoryStore;
/// use pathgate::{MemoryLedger, RegistryReader};
///
/// fn bypass(reader: &RegistryReader<MemoryStore, MemoryLedger>) {
///     let _ = reader.store();
/// }
/// ```
pub struct RegistryReader<S: Store, O: OwnershipOracle> {
    store: Arc<S>,
    oracle: Arc<O>,
    config: RegistryConfig,
}

impl<S: Store, O: OwnershipOracle> Clone for RegistryReader<S, O> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            oracle: Arc::clone(&self.oracle),
            config: self.config.clone(),
        }
    }
}

impl<S: Store, O: OwnershipOracle> RegistryReader<S, O> {
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Reads (public, no authorization)
    // ─────────────────────────────────────────────────────────────────────────

    /// The latest CID written at `path`.
    pub async fn read(&self, path: &str) -> Result<Cid> {
        let path = CanonicalPath::parse(path)?;
        match self.store.get_file(&PathHash::of(&path)).await? {
            Some(record) => Ok(record.cid),
            None => Err(RegistryError::FileNotFound(path)),
        }
    }

    /// Whether a record exists at `path`.
    ///
    /// A path that fails the grammar can never have been written, so it
    /// reports `false` rather than an error.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let Ok(path) = CanonicalPath::parse(path) else {
            return Ok(false);
        };
        Ok(self.store.get_file(&PathHash::of(&path)).await?.is_some())
    }

    /// The record at `path`, with its hash key.
    pub async fn file_record(&self, path: &str) -> Result<Option<FileRecord>> {
        let path = CanonicalPath::parse(path)?;
        Ok(self.store.get_file(&PathHash::of(&path)).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluate the write preconditions for `account` writing `path` under
    /// `key`, returning the canonical path on success.
    ///
    /// Checks run in a fixed order so the reported failure is always the
    /// first one that applies: contract deployed, exact current ownership,
    /// revocation flag, path grammar, prefix coverage. [`Registry::write`]
    /// runs exactly this function after the CID check.
    pub async fn check_write(
        &self,
        key: &PermissionKey,
        account: &Address,
        path: &str,
    ) -> Result<CanonicalPath> {
        if !self.oracle.is_contract(&key.contract).await {
            return Err(RegistryError::InvalidNftContract(key.contract));
        }

        // Direct ownership only. Operator approvals are not consulted.
        let owner = self.oracle.owner_of(&key.contract, &key.token_id).await;
        if !owner.is_held_by(account) {
            return Err(RegistryError::NotTokenOwner {
                key: *key,
                caller: *account,
            });
        }

        let record = self.store.permission_or_default(key).await?;
        if record.revoked {
            return Err(RegistryError::TokenWritesRevoked(*key));
        }

        let path = CanonicalPath::parse(path)?;
        if !record.prefixes.authorizes(&path) {
            return Err(RegistryError::UnauthorizedPath { key: *key, path });
        }

        Ok(path)
    }

    /// Dry run of [`check_write`](Self::check_write).
    ///
    /// Authorization failures become `false`; storage failures still
    /// propagate. A `true` result can be invalidated by a transfer, a
    /// revocation or a prefix change before the real write lands.
    pub async fn can_write(
        &self,
        key: &PermissionKey,
        account: &Address,
        path: &str,
    ) -> Result<bool> {
        match self.check_write(key, account, path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind().is_authorization_failure() => {
                debug!(%key, %account, path, reason = %e, "dry run refused");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Current prefix set of `key`; empty for keys never granted.
    pub async fn prefixes(&self, key: &PermissionKey) -> Result<PrefixSet> {
        Ok(self.store.permission_or_default(key).await?.prefixes)
    }

    pub async fn is_revoked(&self, key: &PermissionKey) -> Result<bool> {
        Ok(self.store.permission_or_default(key).await?.revoked)
    }

    /// Current administrator state.
    pub async fn admin(&self) -> Result<AdminState> {
        self.store
            .get_admin()
            .await?
            .ok_or(RegistryError::NotInitialized)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Log
    // ─────────────────────────────────────────────────────────────────────────

    /// Sequence number of the latest event, `0` for an empty log.
    pub async fn head_seq(&self) -> Result<u64> {
        Ok(self.store.head_seq().await?)
    }

    /// Events with `seq > after_seq`.
    pub async fn events_since(&self, after_seq: u64) -> Result<Vec<Event>> {
        Ok(self.store.events_since(after_seq).await?)
    }

    pub async fn events_for_key(&self, key: &PermissionKey) -> Result<Vec<Event>> {
        Ok(self.store.events_for_key(key).await?)
    }

    /// Write events for `path`, oldest first.
    pub async fn events_for_path(&self, path: &str) -> Result<Vec<Event>> {
        let path = CanonicalPath::parse(path)?;
        Ok(self.store.events_for_path(&PathHash::of(&path)).await?)
    }
}

/// The main Registry struct.
///
/// Provides:
/// - Authorized file writes
/// - Administrator-only permission mutations
/// - Administrator transfer and renunciation
///
/// Reads are available through [`reader`](Self::reader).
pub struct Registry<S: Store, O: OwnershipOracle> {
    reader: RegistryReader<S, O>,
}

impl<S: Store, O: OwnershipOracle> Registry<S, O> {
    /// Initialize a registry in an empty store, administered by `admin`.
    pub async fn create(
        store: S,
        oracle: Arc<O>,
        admin: Address,
        config: RegistryConfig,
    ) -> Result<Self> {
        if store.get_admin().await?.is_some() {
            return Err(RegistryError::AlreadyInitialized);
        }

        let state = AdminState::new(admin)?;
        store
            .put_admin(
                &state,
                EventBody::AdminTransferred {
                    previous: None,
                    new: Some(admin),
                },
            )
            .await?;
        info!(%admin, "registry created");

        Ok(Self::from_parts(store, oracle, config))
    }

    /// Open a registry previously created in `store`.
    pub async fn open(store: S, oracle: Arc<O>, config: RegistryConfig) -> Result<Self> {
        let admin = store
            .get_admin()
            .await?
            .ok_or(RegistryError::NotInitialized)?;
        debug!(?admin, "registry opened");
        Ok(Self::from_parts(store, oracle, config))
    }

    fn from_parts(store: S, oracle: Arc<O>, config: RegistryConfig) -> Self {
        Self {
            reader: RegistryReader {
                store: Arc::new(store),
                oracle,
                config,
            },
        }
    }

    /// Read-only view of this registry.
    pub fn reader(&self) -> &RegistryReader<S, O> {
        &self.reader
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Upsert `cid` at `path` under `key`'s authority.
    pub async fn write(
        &mut self,
        caller: &Address,
        key: &PermissionKey,
        path: &str,
        cid: impl Into<Cid>,
    ) -> Result<Event> {
        let cid = cid.into();
        let checked = if cid.is_empty() {
            Err(RegistryError::EmptyCid)
        } else {
            self.reader.check_write(key, caller, path).await
        };

        let path = match checked {
            Ok(path) => path,
            Err(e) => {
                debug!(%key, %caller, path, kind = ?e.kind(), "write rejected");
                return Err(e);
            }
        };

        let path_hash = PathHash::of(&path);
        let record = FileRecord {
            path_hash,
            cid: cid.clone(),
        };
        let event = self
            .reader
            .store
            .upsert_file(
                &record,
                EventBody::FileWritten {
                    key: *key,
                    path_hash,
                    path,
                    cid,
                    writer: *caller,
                },
            )
            .await?;

        info!(seq = event.seq, %key, %path_hash, "file written");
        Ok(event)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Mutations (administrator only)
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace `key`'s prefix set with the canonical, deduplicated `prefixes`.
    ///
    /// The first invalid prefix aborts the call and the stored set is left
    /// untouched. An empty list removes every path.
    pub async fn replace_prefixes<I, P>(
        &mut self,
        caller: &Address,
        key: &PermissionKey,
        prefixes: I,
    ) -> Result<Event>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.authorize_admin(caller).await?;
        self.require_contract(key).await?;

        let prefixes = PrefixSet::from_raw(prefixes)?;
        if let Some(max) = self.reader.config.max_prefixes_per_key {
            if prefixes.len() > max {
                return Err(RegistryError::TooManyPrefixes {
                    key: *key,
                    count: prefixes.len(),
                    max,
                });
            }
        }

        let mut record = self.reader.store.permission_or_default(key).await?;
        record.prefixes = prefixes;

        let indexed = self
            .reader
            .config
            .index_prefixes_in_events
            .then(|| record.prefixes.as_slice().to_vec());
        let event = self
            .reader
            .store
            .put_permission(
                key,
                &record,
                EventBody::PrefixesReplaced {
                    key: *key,
                    prefixes: indexed,
                },
            )
            .await?;

        info!(seq = event.seq, %key, count = record.prefixes.len(), "prefixes replaced");
        Ok(event)
    }

    /// Set `key`'s revocation flag.
    ///
    /// Returns `None` without logging when the flag already has that value.
    pub async fn set_revoked(
        &mut self,
        caller: &Address,
        key: &PermissionKey,
        revoked: bool,
    ) -> Result<Option<Event>> {
        self.authorize_admin(caller).await?;
        self.require_contract(key).await?;

        let mut record = self.reader.store.permission_or_default(key).await?;
        if record.revoked == revoked {
            debug!(%key, revoked, "revocation unchanged");
            return Ok(None);
        }
        record.revoked = revoked;

        let event = self
            .reader
            .store
            .put_permission(key, &record, EventBody::RevocationChanged { key: *key, revoked })
            .await?;

        info!(seq = event.seq, %key, revoked, "revocation changed");
        Ok(Some(event))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────

    /// Hand administration to `new`.
    pub async fn transfer_admin(&mut self, caller: &Address, new: Address) -> Result<Event> {
        let current = self.reader.admin().await?;
        let next = current.transfer(caller, new)?;

        let event = self
            .reader
            .store
            .put_admin(
                &next,
                EventBody::AdminTransferred {
                    previous: current.owner(),
                    new: Some(new),
                },
            )
            .await?;

        info!(seq = event.seq, previous = %caller, %new, "administrator transferred");
        Ok(event)
    }

    /// Give up administration permanently. No admin operation can succeed
    /// afterwards.
    pub async fn renounce_admin(&mut self, caller: &Address) -> Result<Event> {
        let current = self.reader.admin().await?;
        let next = current.renounce(caller)?;

        let event = self
            .reader
            .store
            .put_admin(
                &next,
                EventBody::AdminTransferred {
                    previous: current.owner(),
                    new: None,
                },
            )
            .await?;

        warn!(seq = event.seq, previous = %caller, "administration renounced");
        Ok(event)
    }

    async fn authorize_admin(&self, caller: &Address) -> Result<()> {
        let admin = self.reader.admin().await?;
        if let Err(e) = admin.authorize(caller) {
            debug!(%caller, reason = %e, "admin operation refused");
            return Err(e.into());
        }
        Ok(())
    }

    async fn require_contract(&self, key: &PermissionKey) -> Result<()> {
        if self.reader.oracle.is_contract(&key.contract).await {
            Ok(())
        } else {
            Err(RegistryError::InvalidNftContract(key.contract))
        }
    }
}
