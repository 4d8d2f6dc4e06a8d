//! # Pathgate Permissions
//!
//! Permission records and administrator state.
//!
//! ## Overview
//!
//! Every [`PermissionKey`](pathgate_core::PermissionKey) owns one
//! [`PermissionRecord`]: a [`PrefixSet`] and a revocation flag. The two are
//! independent. Revoking blocks writes even while prefixes remain, and
//! restoring access means clearing the flag, not re-granting prefixes.
//!
//! Prefix sets are never patched. An administrator replaces the whole set,
//! and replacing it with an empty set is how a key loses all paths.
//!
//! ## Administration
//!
//! [`AdminState`] is an explicit two-state machine:
//!
//! ```text
//! Owner(a) --transfer(b)--> Owner(b)
//! Owner(a) --renounce-----> Disabled   (terminal)
//! ```
//!
//! ## Replay
//!
//! [`PermissionState`] rebuilds every record from the audit log, so an
//! off-ledger indexer can answer the same authorization questions as the
//! registry without reading its storage.

pub mod admin;
pub mod error;
pub mod prefix;
pub mod state;

pub use admin::AdminState;
pub use error::{PermsError, Result};
pub use prefix::PrefixSet;
pub use state::{PermissionRecord, PermissionState};
