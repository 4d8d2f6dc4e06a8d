//! # Pathgate
//!
//! A path-addressed CID registry whose write authority is delegated through
//! NFT ownership.
//!
//! ## Overview
//!
//! Callers write and read a content identifier at a hierarchical path. Write
//! capability is bundled into a [`PermissionKey`]: a `(contract, token id)`
//! pair carrying a set of granted path prefixes and a revocation flag.
//! Whoever holds the token *right now*, according to the
//! [`OwnershipOracle`], may write any path under one of the key's prefixes.
//!
//! ## Key Concepts
//!
//! - **Strict subtree**: prefix `/agent1` covers `/agent1/x` but never
//!   `/agent10/x`. The root prefix `/` covers everything.
//! - **Upsert only**: a write replaces the previous CID. There is no delete.
//! - **Audit log**: every committed mutation appends one event. The log is
//!   the only history; state keeps just the latest values.
//! - **Administrator**: a single address mutates permission records. It can
//!   be transferred, or renounced for good.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pathgate::{Address, MemoryLedger, PermissionKey, Registry, RegistryConfig};
//! use pathgate::store::SqliteStore;
//!
//! async fn example() {
//!     let admin = Address::repeat_byte(0xad);
//!     let alice = Address::repeat_byte(0xa1);
//!     let nft = Address::repeat_byte(0xc0);
//!
//!     let ledger = Arc::new(MemoryLedger::new());
//!     ledger.deploy_contract(nft).unwrap();
//!     ledger.mint(nft, 1u64, alice).unwrap();
//!
//!     let store = SqliteStore::open("pathgate.db").unwrap();
//!     let mut registry = Registry::create(store, ledger, admin, RegistryConfig::default())
//!         .await
//!         .unwrap();
//!
//!     let key = PermissionKey::new(nft, 1u64);
//!     registry.replace_prefixes(&admin, &key, ["/agent1"]).await.unwrap();
//!     registry
//!         .write(&alice, &key, "/agent1/files/manifest.json", "bafy...")
//!         .await
//!         .unwrap();
//!
//!     let cid = registry.reader().read("/agent1/files/manifest.json").await.unwrap();
//!     assert_eq!(cid.as_str(), "bafy...");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `pathgate::core` - Path grammar, matcher, identifiers, events
//! - `pathgate::perms` - Prefix sets, permission records, admin state
//! - `pathgate::store` - Storage abstraction and SQLite

pub mod error;
pub mod oracle;
pub mod registry;

// Re-export component crates
pub use pathgate_core as core;
pub use pathgate_perms as perms;
pub use pathgate_store as store;

// Re-export main types for convenience
pub use error::{ErrorKind, LedgerError, RegistryError, Result};
pub use oracle::{MemoryLedger, Ownership, OwnershipOracle};
pub use registry::{Registry, RegistryConfig, RegistryReader};

// Re-export commonly used core types
pub use pathgate_core::{
    Address, CanonicalPath, CanonicalPrefix, Cid, Event, EventBody, PathError, PathHash, PathMode,
    PermissionKey, TokenId,
};
pub use pathgate_perms::{AdminState, PrefixSet};
