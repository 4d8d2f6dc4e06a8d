//! # Pathgate Core
//!
//! Pure primitives for Pathgate: the path grammar, strict-subtree matching,
//! permission keys and the audit event vocabulary.
//!
//! This crate contains no I/O, no storage, no ledger access. Everything here
//! is deterministic so that the registry and any client produce byte-identical
//! results for the same input.
//!
//! ## Key Types
//!
//! - [`CanonicalPath`] - A validated file path (final segment may carry one `.`)
//! - [`CanonicalPrefix`] - A validated prefix; `/` matches everything
//! - [`PermissionKey`] - `(ownership contract, token id)`, the unit of delegation
//! - [`PathHash`] - Keccak-256 of the canonical path bytes, the file record key
//! - [`Event`] - One entry of the append-only audit log
//!
//! ## Grammar
//!
//! See the [`canonical`] module for the exact rules, and [`matcher`] for how a
//! path is decided to sit inside a prefix's subtree.

pub mod canonical;
pub mod error;
pub mod events;
pub mod matcher;
pub mod types;

pub use canonical::{canonicalize, CanonicalPath, CanonicalPrefix, PathMode};
pub use error::{CoreError, PathError};
pub use events::{Event, EventBody};
pub use matcher::{any_matches, matches};
pub use types::{Address, Cid, PathHash, PermissionKey, TokenId};
