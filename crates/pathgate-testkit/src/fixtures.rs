//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use pathgate::store::{MemoryStore, SqliteStore, Store};
use pathgate::{Address, MemoryLedger, PermissionKey, Registry, RegistryConfig};

/// Registry administrator.
pub const ADMIN: Address = Address::repeat_byte(0xad);
/// First token holder.
pub const ALICE: Address = Address::repeat_byte(0xa1);
/// Second token holder.
pub const BOB: Address = Address::repeat_byte(0xb0);
/// The fixture's non-fungible token contract.
pub const NFT: Address = Address::repeat_byte(0xc0);

/// A registry over `S` with one deployed token contract.
pub struct TestFixture<S: Store = MemoryStore> {
    pub registry: Registry<S, MemoryLedger>,
    pub ledger: Arc<MemoryLedger>,
}

impl TestFixture<MemoryStore> {
    /// Create a new fixture backed by memory.
    pub async fn new() -> Self {
        Self::with_store(MemoryStore::new(), RegistryConfig::default()).await
    }
}

impl TestFixture<SqliteStore> {
    /// Create a new fixture backed by an in-memory SQLite database.
    pub async fn sqlite() -> Self {
        let store = SqliteStore::open_memory().expect("open sqlite");
        Self::with_store(store, RegistryConfig::default()).await
    }
}

impl<S: Store> TestFixture<S> {
    /// Create a fixture over `store`, administered by [`ADMIN`].
    pub async fn with_store(store: S, config: RegistryConfig) -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.deploy_contract(NFT).expect("deploy fixture contract");
        let registry = Registry::create(store, Arc::clone(&ledger), ADMIN, config)
            .await
            .expect("create registry");
        Self { registry, ledger }
    }

    /// Mint token `id` of [`NFT`] to `to` and return its key.
    pub fn mint(&self, id: u64, to: Address) -> PermissionKey {
        self.ledger.mint(NFT, id, to).expect("mint");
        PermissionKey::new(NFT, id)
    }

    /// Transfer token `id` of [`NFT`].
    pub fn transfer(&self, id: u64, from: Address, to: Address) {
        self.ledger.transfer(NFT, id, from, to).expect("transfer");
    }

    /// Replace `key`'s prefixes as [`ADMIN`].
    pub async fn grant(&mut self, key: &PermissionKey, prefixes: &[&str]) {
        self.registry
            .replace_prefixes(&ADMIN, key, prefixes)
            .await
            .expect("grant prefixes");
    }

    /// Mint token `id` to `to` and grant it `prefixes` in one step.
    pub async fn holder(&mut self, id: u64, to: Address, prefixes: &[&str]) -> PermissionKey {
        let key = self.mint(id, to);
        self.grant(&key, prefixes).await;
        key
    }
}
