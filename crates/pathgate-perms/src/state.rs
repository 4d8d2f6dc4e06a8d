//! Permission records and their replay from the audit log.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pathgate_core::{CanonicalPath, Event, EventBody, PermissionKey};

use crate::admin::AdminState;
use crate::error::{PermsError, Result};
use crate::prefix::PrefixSet;

/// Prefix set and revocation flag of one permission key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Granted subtrees.
    pub prefixes: PrefixSet,
    /// Explicit administrator block, independent of the prefixes.
    pub revoked: bool,
}

impl PermissionRecord {
    /// Whether the record alone lets a write to `path` through.
    ///
    /// Ownership is not part of the record and has to be checked separately.
    pub fn permits(&self, path: &CanonicalPath) -> bool {
        !self.revoked && self.prefixes.authorizes(path)
    }
}

/// Permission state rebuilt by replaying the audit log.
#[derive(Debug, Default)]
pub struct PermissionState {
    records: HashMap<PermissionKey, PermissionRecord>,
    admin: Option<AdminState>,
    last_seq: u64,
}

impl PermissionState {
    /// Create a new empty permission state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from a full log.
    pub fn replay<'a, I>(events: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut state = Self::new();
        for event in events {
            state.apply_event(event)?;
        }
        Ok(state)
    }

    /// Fold one entry into the state.
    ///
    /// Entries at or below the last applied sequence number are ignored, so
    /// re-feeding an overlapping page of the log is harmless.
    pub fn apply_event(&mut self, event: &Event) -> Result<()> {
        if event.seq != 0 && event.seq <= self.last_seq {
            return Ok(());
        }

        match &event.body {
            EventBody::PrefixesReplaced { key, prefixes } => {
                let prefixes = prefixes
                    .as_ref()
                    .ok_or(PermsError::PrefixesNotIndexed(*key))?;
                self.records.entry(*key).or_default().prefixes =
                    prefixes.iter().cloned().collect();
            }
            EventBody::RevocationChanged { key, revoked } => {
                self.records.entry(*key).or_default().revoked = *revoked;
            }
            EventBody::AdminTransferred { new, .. } => {
                self.admin = Some(match new {
                    Some(admin) => AdminState::Owner(*admin),
                    None => AdminState::Disabled,
                });
            }
            EventBody::FileWritten { .. } => {}
        }

        self.last_seq = event.seq;
        Ok(())
    }

    /// The record for `key`; keys never touched have an empty record.
    pub fn record(&self, key: &PermissionKey) -> PermissionRecord {
        self.records.get(key).cloned().unwrap_or_default()
    }

    /// Whether `key`'s record lets a write to `path` through.
    pub fn permits(&self, key: &PermissionKey, path: &CanonicalPath) -> bool {
        self.records.get(key).is_some_and(|r| r.permits(path))
    }

    /// Keys whose record currently lets a write to `path` through.
    pub fn keys_permitting(&self, path: &CanonicalPath) -> Vec<PermissionKey> {
        let mut keys: Vec<_> = self
            .records
            .iter()
            .filter(|(_, r)| r.permits(path))
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        keys
    }

    /// Administrator as of the last applied entry.
    pub fn admin(&self) -> Option<&AdminState> {
        self.admin.as_ref()
    }

    /// Sequence number of the last applied entry.
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }
}
