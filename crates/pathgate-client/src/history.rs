//! File history reconstructed from the audit log.
//!
//! The registry keeps only the latest CID per path. Earlier values exist
//! solely as `FileWritten` events, and this module folds them back into
//! per-path timelines.

use std::collections::BTreeMap;

use pathgate::{
    Address, CanonicalPath, CanonicalPrefix, Cid, Event, EventBody, PathHash, PermissionKey,
};

/// One committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seq: u64,
    pub key: PermissionKey,
    pub cid: Cid,
    pub writer: Address,
}

/// Every write to one path, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHistory {
    path: CanonicalPath,
    path_hash: PathHash,
    entries: Vec<HistoryEntry>,
}

impl FileHistory {
    pub fn new(path: CanonicalPath) -> Self {
        let path_hash = PathHash::of(&path);
        Self {
            path,
            path_hash,
            entries: Vec::new(),
        }
    }

    /// Collect the writes to `path` found in `events`.
    pub fn from_events<'a, I>(path: CanonicalPath, events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut history = Self::new(path);
        for event in events {
            history.apply(event);
        }
        history
    }

    /// Fold one event; events for other paths and replays of an already
    /// applied sequence number are ignored.
    pub fn apply(&mut self, event: &Event) -> bool {
        let EventBody::FileWritten {
            key,
            path_hash,
            cid,
            writer,
            ..
        } = &event.body
        else {
            return false;
        };
        if *path_hash != self.path_hash {
            return false;
        }
        if self.entries.last().is_some_and(|last| last.seq >= event.seq) {
            return false;
        }
        self.entries.push(HistoryEntry {
            seq: event.seq,
            key: *key,
            cid: cid.clone(),
            writer: *writer,
        });
        true
    }

    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    pub fn path_hash(&self) -> &PathHash {
        &self.path_hash
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The current value, matching what the registry's `read` returns.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Histories for every path seen in the log.
#[derive(Debug, Default)]
pub struct HistoryIndex {
    files: BTreeMap<CanonicalPath, FileHistory>,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut index = Self::new();
        for event in events {
            index.apply(event);
        }
        index
    }

    /// Fold one event. Returns whether it was a new write.
    pub fn apply(&mut self, event: &Event) -> bool {
        let EventBody::FileWritten { path, .. } = &event.body else {
            return false;
        };
        self.files
            .entry(path.clone())
            .or_insert_with(|| FileHistory::new(path.clone()))
            .apply(event)
    }

    pub fn get(&self, path: &CanonicalPath) -> Option<&FileHistory> {
        self.files.get(path)
    }

    /// Every path written at least once, in byte order.
    pub fn paths(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.files.keys()
    }

    /// Every path under `prefix` written at least once.
    ///
    /// The registry has no listing primitive; this is only as complete as
    /// the log it was built from.
    pub fn paths_under<'a>(
        &'a self,
        prefix: &'a CanonicalPrefix,
    ) -> impl Iterator<Item = &'a CanonicalPath> + 'a {
        self.files.keys().filter(move |path| prefix.covers(path))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
