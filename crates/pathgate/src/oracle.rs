//! Ownership oracle: the external source of truth for token holders.
//!
//! The registry never caches ownership. Every write asks the oracle who holds
//! the key's token right now, so a transfer takes effect on the very next
//! write attempt.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use pathgate_core::{Address, TokenId};

use crate::error::LedgerError;

/// Outcome of an `ownerOf` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The token's current holder.
    Owner(Address),
    /// The contract has no ownership lookup, the token does not exist, or the
    /// call failed. Never grants write capability.
    Unresolvable,
}

impl Ownership {
    /// Whether `account` is exactly the resolved holder.
    pub fn is_held_by(&self, account: &Address) -> bool {
        matches!(self, Ownership::Owner(owner) if owner == account)
    }
}

/// Narrow read-only view of the ledger.
///
/// Any contract answering `ownerOf` may serve as a key's ownership source;
/// implementations must not filter on contract type.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// Whether code is deployed at `contract`.
    async fn is_contract(&self, contract: &Address) -> bool;

    /// Current holder of `token_id` in `contract`.
    async fn owner_of(&self, contract: &Address, token_id: &TokenId) -> Ownership;
}

#[derive(Debug)]
enum Contract {
    /// Tracks token holders.
    NonFungible { holders: HashMap<TokenId, Address> },
    /// Deployed code without an ownership lookup.
    Opaque,
}

/// In-process ledger with non-fungible contracts.
///
/// Supports exactly the operations whose effect the registry observes:
/// deployment, mint, transfer and burn.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    contracts: RwLock<HashMap<Address, Contract>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy an empty non-fungible token contract at `address`.
    pub fn deploy_contract(&self, address: Address) -> Result<(), LedgerError> {
        self.deploy(address, Contract::NonFungible { holders: HashMap::new() })
    }

    /// Deploy a contract that answers no ownership queries.
    pub fn deploy_opaque(&self, address: Address) -> Result<(), LedgerError> {
        self.deploy(address, Contract::Opaque)
    }

    fn deploy(&self, address: Address, contract: Contract) -> Result<(), LedgerError> {
        let mut contracts = self.contracts.write().unwrap_or_else(PoisonError::into_inner);
        if contracts.contains_key(&address) {
            return Err(LedgerError::AddressInUse(address));
        }
        contracts.insert(address, contract);
        debug!(%address, "deployed contract");
        Ok(())
    }

    /// Create `token_id` in `contract`, held by `to`.
    pub fn mint(
        &self,
        contract: Address,
        token_id: impl Into<TokenId>,
        to: Address,
    ) -> Result<(), LedgerError> {
        let token_id = token_id.into();
        if to == Address::ZERO {
            return Err(LedgerError::ZeroRecipient);
        }
        self.with_holders(contract, |holders| {
            if holders.contains_key(&token_id) {
                return Err(LedgerError::AlreadyMinted { contract, token_id });
            }
            holders.insert(token_id, to);
            Ok(())
        })
    }

    /// Move `token_id` from `from` to `to`.
    pub fn transfer(
        &self,
        contract: Address,
        token_id: impl Into<TokenId>,
        from: Address,
        to: Address,
    ) -> Result<(), LedgerError> {
        let token_id = token_id.into();
        if to == Address::ZERO {
            return Err(LedgerError::ZeroRecipient);
        }
        self.with_holders(contract, |holders| {
            let holder = holders
                .get_mut(&token_id)
                .ok_or(LedgerError::NoSuchToken { contract, token_id })?;
            if *holder != from {
                return Err(LedgerError::NotHolder { contract, token_id, from });
            }
            *holder = to;
            Ok(())
        })
    }

    /// Destroy `token_id`. Its key becomes unresolvable.
    pub fn burn(&self, contract: Address, token_id: impl Into<TokenId>) -> Result<(), LedgerError> {
        let token_id = token_id.into();
        self.with_holders(contract, |holders| {
            holders
                .remove(&token_id)
                .map(|_| ())
                .ok_or(LedgerError::NoSuchToken { contract, token_id })
        })
    }

    fn with_holders<T>(
        &self,
        contract: Address,
        f: impl FnOnce(&mut HashMap<TokenId, Address>) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut contracts = self.contracts.write().unwrap_or_else(PoisonError::into_inner);
        match contracts.get_mut(&contract) {
            Some(Contract::NonFungible { holders }) => f(holders),
            Some(Contract::Opaque) => Err(LedgerError::NotNft(contract)),
            None => Err(LedgerError::NotDeployed(contract)),
        }
    }
}

#[async_trait]
impl OwnershipOracle for MemoryLedger {
    async fn is_contract(&self, contract: &Address) -> bool {
        self.contracts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(contract)
    }

    async fn owner_of(&self, contract: &Address, token_id: &TokenId) -> Ownership {
        let contracts = self.contracts.read().unwrap_or_else(PoisonError::into_inner);
        match contracts.get(contract) {
            Some(Contract::NonFungible { holders }) => holders
                .get(token_id)
                .map_or(Ownership::Unresolvable, |owner| Ownership::Owner(*owner)),
            _ => Ownership::Unresolvable,
        }
    }
}
