//! Audit log entries.
//!
//! The log is append-only and is the only history the system keeps. Every
//! committed mutation produces exactly one [`Event`]; rejected operations
//! produce none. External indexers rebuild history by folding the log.

use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalPath, CanonicalPrefix};
use crate::types::{Address, Cid, PathHash, PermissionKey};

/// A sequenced audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the log, starting at 1.
    pub seq: u64,
    /// What happened.
    pub body: EventBody,
}

/// The payload of an audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventBody {
    /// The prefix set of `key` was replaced wholesale.
    ///
    /// `prefixes` is `None` when the registry is configured not to index the
    /// new set in the log.
    PrefixesReplaced {
        key: PermissionKey,
        prefixes: Option<Vec<CanonicalPrefix>>,
    },

    /// The revocation flag of `key` changed to `revoked`.
    RevocationChanged { key: PermissionKey, revoked: bool },

    /// A file record was created or overwritten.
    FileWritten {
        key: PermissionKey,
        path_hash: PathHash,
        path: CanonicalPath,
        cid: Cid,
        writer: Address,
    },

    /// The administrator changed. `new == None` means administration was
    /// renounced for good.
    AdminTransferred {
        previous: Option<Address>,
        new: Option<Address>,
    },
}

impl EventBody {
    /// The permission key this entry is filed under, if any.
    pub fn key(&self) -> Option<&PermissionKey> {
        match self {
            EventBody::PrefixesReplaced { key, .. }
            | EventBody::RevocationChanged { key, .. }
            | EventBody::FileWritten { key, .. } => Some(key),
            EventBody::AdminTransferred { .. } => None,
        }
    }

    /// The path hash this entry is filed under, if any.
    pub fn path_hash(&self) -> Option<&PathHash> {
        match self {
            EventBody::FileWritten { path_hash, .. } => Some(path_hash),
            _ => None,
        }
    }

    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            EventBody::PrefixesReplaced { .. } => "prefixes-replaced",
            EventBody::RevocationChanged { .. } => "revocation-changed",
            EventBody::FileWritten { .. } => "file-written",
            EventBody::AdminTransferred { .. } => "admin-transferred",
        }
    }
}

impl Event {
    pub fn new(seq: u64, body: EventBody) -> Self {
        Self { seq, body }
    }
}
