//! # Pathgate Client
//!
//! Client-side helpers layered on top of a Pathgate registry.
//!
//! ## Overview
//!
//! None of this is part of the registry's authorization decision. It exists
//! so a caller can avoid submitting writes that are bound to fail and can
//! answer history questions the registry itself does not store.
//!
//! - [`paths`] - the registry's grammar and hash, for local pre-validation
//! - [`WriteScanner`] - find which of an account's keys authorizes a path
//! - [`FileHistory`] / [`HistoryIndex`] - per-path write timelines from the log
//! - [`Mirror`] - permission records and histories kept in step with the log
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pathgate::{Address, PermissionKey, RegistryReader};
//! use pathgate::store::MemoryStore;
//! use pathgate::MemoryLedger;
//! use pathgate_client::{ClientConfig, WriteScanner};
//!
//! async fn example(reader: RegistryReader<MemoryStore, MemoryLedger>) {
//!     let account = Address::repeat_byte(0xa1);
//!     let nft = Address::repeat_byte(0xc0);
//!     let candidates: Vec<_> = (0..4u64).map(|id| PermissionKey::new(nft, id)).collect();
//!
//!     let scanner = WriteScanner::new(Arc::new(reader), ClientConfig::default());
//!     if let Some(key) = scanner
//!         .find_writable_key(&candidates, &account, "/agent1/files/manifest.json")
//!         .await
//!         .unwrap()
//!     {
//!         println!("write with {key}");
//!     }
//! }
//! ```
//!
//! ## Races
//!
//! A positive dry run is advice, not a reservation. The token may be
//! transferred, the key revoked, or its prefixes replaced before the write
//! lands; the registry re-evaluates everything at that point.

pub mod api;
pub mod error;
pub mod history;
pub mod mirror;
pub mod paths;
pub mod scan;

pub use api::RegistryApi;
pub use error::{ClientError, Result};
pub use history::{FileHistory, HistoryEntry, HistoryIndex};
pub use mirror::Mirror;
pub use paths::{canonical_file_path, canonical_prefix, is_authorized, path_hash};
pub use scan::{ClientConfig, WriteScanner};
