//! Off-registry replica built by following the audit log.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use pathgate::perms::{PermissionRecord, PermissionState};
use pathgate::{CanonicalPath, Event, EventBody, PermissionKey};

use crate::api::RegistryApi;
use crate::error::Result;
use crate::history::HistoryIndex;

/// Permission records and file histories rebuilt from the log.
///
/// Knows nothing about token ownership, so it can say whether a key's
/// record covers a path but not whether a given account may use that key.
///
/// A registry configured without prefix indexing logs prefix replacements
/// without the new list. The mirror keeps following such a log: the key is
/// marked as having unknown prefixes until an indexed replacement arrives,
/// and is left out of [`keys_permitting`](Self::keys_permitting) meanwhile.
#[derive(Debug, Default)]
pub struct Mirror {
    permissions: PermissionState,
    history: HistoryIndex,
    unknown_prefixes: BTreeSet<PermissionKey>,
    last_seq: u64,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold events in log order.
    ///
    /// Entries at or below [`last_seq`](Self::last_seq) are ignored.
    pub fn apply<'a, I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        for event in events {
            if event.seq != 0 && event.seq <= self.last_seq {
                continue;
            }
            match &event.body {
                EventBody::PrefixesReplaced {
                    key,
                    prefixes: None,
                } => {
                    warn!(%key, seq = event.seq, "prefix list not indexed; record unknown");
                    self.unknown_prefixes.insert(*key);
                }
                EventBody::PrefixesReplaced { key, .. } => {
                    self.unknown_prefixes.remove(key);
                    self.permissions.apply_event(event)?;
                }
                _ => self.permissions.apply_event(event)?,
            }
            self.history.apply(event);
            self.last_seq = event.seq;
        }
        Ok(())
    }

    /// Pull and fold everything newer than the last applied entry.
    ///
    /// Returns the number of new events.
    pub async fn catch_up<R: RegistryApi + ?Sized>(&mut self, registry: &R) -> Result<usize> {
        let events = registry.events_since(self.last_seq()).await?;
        self.apply(&events)?;
        debug!(new = events.len(), head = self.last_seq(), "mirror caught up");
        Ok(events.len())
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// The record as last seen in the log.
    ///
    /// Its prefixes are stale when [`prefixes_known`](Self::prefixes_known)
    /// is false.
    pub fn record(&self, key: &PermissionKey) -> PermissionRecord {
        self.permissions.record(key)
    }

    /// Whether the log carried `key`'s latest prefix list.
    pub fn prefixes_known(&self, key: &PermissionKey) -> bool {
        !self.unknown_prefixes.contains(key)
    }

    /// Keys whose record covers `path` and is not revoked.
    pub fn keys_permitting(&self, path: &CanonicalPath) -> Vec<PermissionKey> {
        let mut keys = self.permissions.keys_permitting(path);
        keys.retain(|key| self.prefixes_known(key));
        keys
    }

    pub fn permissions(&self) -> &PermissionState {
        &self.permissions
    }

    pub fn history(&self) -> &HistoryIndex {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathgate::{Address, CanonicalPrefix, Cid, EventBody, PathHash};

    #[test]
    fn test_apply_tracks_permissions_and_files() {
        let key = PermissionKey::new(Address::repeat_byte(0xc0), 1u64);
        let path = CanonicalPath::parse("/agent1/a").unwrap();
        let log = vec![
            Event::new(
                1,
                EventBody::PrefixesReplaced {
                    key,
                    prefixes: Some(vec![CanonicalPrefix::parse("/agent1").unwrap()]),
                },
            ),
            Event::new(
                2,
                EventBody::FileWritten {
                    key,
                    path_hash: PathHash::of(&path),
                    path: path.clone(),
                    cid: Cid::from("v1"),
                    writer: Address::repeat_byte(0xa1),
                },
            ),
        ];

        let mut mirror = Mirror::new();
        mirror.apply(&log).unwrap();
        assert_eq!(mirror.last_seq(), 2);
        assert_eq!(mirror.keys_permitting(&path), vec![key]);
        assert_eq!(
            mirror.history().get(&path).unwrap().latest().unwrap().cid.as_str(),
            "v1"
        );
    }

    #[test]
    fn test_unindexed_prefixes_do_not_stall() {
        let key = PermissionKey::new(Address::repeat_byte(0xc0), 1u64);
        let path = CanonicalPath::parse("/agent1/a").unwrap();
        let written = |seq, cid: &str| {
            Event::new(
                seq,
                EventBody::FileWritten {
                    key,
                    path_hash: PathHash::of(&path),
                    path: path.clone(),
                    cid: Cid::from(cid),
                    writer: Address::repeat_byte(0xa1),
                },
            )
        };
        let replaced = |seq, prefixes: Option<Vec<CanonicalPrefix>>| {
            Event::new(seq, EventBody::PrefixesReplaced { key, prefixes })
        };

        let mut mirror = Mirror::new();
        mirror.apply(&[replaced(1, None), written(2, "v1")]).unwrap();
        assert_eq!(mirror.last_seq(), 2);
        assert!(!mirror.prefixes_known(&key));
        assert!(mirror.keys_permitting(&path).is_empty());

        // Later pages keep folding after the unindexed entry.
        mirror.apply(&[written(3, "v2")]).unwrap();
        mirror.apply(&[written(3, "v2")]).unwrap();
        let history = mirror.history().get(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().cid.as_str(), "v2");

        let indexed = Some(vec![CanonicalPrefix::parse("/agent1").unwrap()]);
        mirror.apply(&[replaced(4, indexed)]).unwrap();
        assert!(mirror.prefixes_known(&key));
        assert_eq!(mirror.keys_permitting(&path), vec![key]);
        assert_eq!(mirror.last_seq(), 4);
    }
}
