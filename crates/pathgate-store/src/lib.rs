//! # Pathgate Store
//!
//! Storage abstraction for the Pathgate registry. Provides a trait-based
//! interface over the registry's authoritative maps and its audit log, with
//! SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The registry keeps four things:
//!
//! - file records, keyed by [`PathHash`](pathgate_core::PathHash)
//! - permission records, keyed by [`PermissionKey`](pathgate_core::PermissionKey)
//! - the administrator state
//! - the append-only audit log
//!
//! Every mutating method takes the [`EventBody`](pathgate_core::EventBody)
//! describing it and commits the state change and the log entry together.
//! There is no way to change state without logging, and no way to log
//! without the change.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`FileRecord`] - The latest CID stored at a path
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pathgate_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("pathgate.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let head = store.head_seq().await.unwrap();
//!     let events = store.events_since(head).await.unwrap();
//!     assert!(events.is_empty());
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{FileRecord, Store, StoreExt};
