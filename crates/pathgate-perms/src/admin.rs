//! Administrator state.

use serde::{Deserialize, Serialize};

use pathgate_core::Address;

use crate::error::{PermsError, Result};

/// Who may mutate permission records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminState {
    /// A single administrator address.
    Owner(Address),
    /// Administration has been renounced. Terminal.
    Disabled,
}

impl AdminState {
    /// Start administered by `admin`.
    pub fn new(admin: Address) -> Result<Self> {
        if admin == Address::ZERO {
            return Err(PermsError::InvalidAdmin(admin));
        }
        Ok(AdminState::Owner(admin))
    }

    /// The current administrator, if any.
    pub fn owner(&self) -> Option<Address> {
        match self {
            AdminState::Owner(a) => Some(*a),
            AdminState::Disabled => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, AdminState::Disabled)
    }

    /// Check that `caller` may perform an admin operation.
    pub fn authorize(&self, caller: &Address) -> Result<()> {
        match self {
            AdminState::Disabled => Err(PermsError::AdminDisabled),
            AdminState::Owner(admin) if admin == caller => Ok(()),
            AdminState::Owner(_) => Err(PermsError::NotAdmin(*caller)),
        }
    }

    /// Hand administration to `new`. Returns the state to persist.
    pub fn transfer(&self, caller: &Address, new: Address) -> Result<AdminState> {
        self.authorize(caller)?;
        AdminState::new(new)
    }

    /// Give up administration permanently.
    pub fn renounce(&self, caller: &Address) -> Result<AdminState> {
        self.authorize(caller)?;
        Ok(AdminState::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    #[test]
    fn test_zero_address_rejected() {
        assert_eq!(
            AdminState::new(Address::ZERO),
            Err(PermsError::InvalidAdmin(Address::ZERO))
        );
    }

    #[test]
    fn test_only_owner_authorized() {
        let state = AdminState::new(ALICE).unwrap();
        assert!(state.authorize(&ALICE).is_ok());
        assert_eq!(state.authorize(&BOB), Err(PermsError::NotAdmin(BOB)));
    }

    #[test]
    fn test_transfer() {
        let state = AdminState::new(ALICE).unwrap();
        let next = state.transfer(&ALICE, BOB).unwrap();
        assert_eq!(next.owner(), Some(BOB));
        assert_eq!(next.authorize(&ALICE), Err(PermsError::NotAdmin(ALICE)));
        assert_eq!(
            next.transfer(&BOB, Address::ZERO),
            Err(PermsError::InvalidAdmin(Address::ZERO))
        );
    }

    #[test]
    fn test_renounce_is_terminal() {
        let state = AdminState::new(ALICE).unwrap().renounce(&ALICE).unwrap();
        assert!(state.is_disabled());
        assert_eq!(state.owner(), None);
        assert_eq!(state.authorize(&ALICE), Err(PermsError::AdminDisabled));
        assert_eq!(state.transfer(&ALICE, BOB), Err(PermsError::AdminDisabled));
        assert_eq!(state.renounce(&ALICE), Err(PermsError::AdminDisabled));
    }
}
