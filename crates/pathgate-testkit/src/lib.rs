//! # Pathgate Testkit
//!
//! Testing utilities for Pathgate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: The single reference set for canonicalization,
//!   matching and path hashing. Every implementation is checked against it.
//! - **Generators**: Proptest strategies for paths, prefixes, keys and CIDs
//! - **Fixtures**: A registry over a memory ledger with a deployed contract
//!
//! ## Golden Vectors
//!
//! ```rust
//! use pathgate_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, detail) in verify_all_vectors() {
//!     assert!(passed, "{name}: {detail}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pathgate_core::CanonicalPath;
//! use pathgate_testkit::generators::file_path;
//!
//! proptest! {
//!     #[test]
//!     fn canonical_is_idempotent(p in file_path()) {
//!         let once = CanonicalPath::parse(&p).unwrap();
//!         prop_assert_eq!(CanonicalPath::parse(once.as_str()).unwrap(), once);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use pathgate_testkit::fixtures::{TestFixture, ALICE};
//!
//! let mut fx = TestFixture::new().await;
//! let key = fx.holder(1, ALICE, &["/agent1"]).await;
//! fx.registry.write(&ALICE, &key, "/agent1/a.json", "bafy...").await.unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::TestFixture;
pub use vectors::{hash_vectors, match_vectors, path_vectors, verify_all_vectors};
