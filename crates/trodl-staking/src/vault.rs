// crates/trodl-staking/src/vault.rs
//
// In-memory TRO token vault.
//
// Tracks participants' external TRO balances, the allowance each participant
// has granted the pool, and the pool's custody balance. Implements
// `PrincipalTransfer` with all-or-nothing semantics: a declined transfer
// changes no balance.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use trodl_core::{Amount, ParticipantId, PrincipalTransfer, TransferError};

#[derive(Debug, Default)]
struct VaultState {
    balances: HashMap<ParticipantId, Amount>,
    allowances: HashMap<ParticipantId, Amount>,
    custody: Amount,
}

/// Token balances and pool custody, guarded by one mutex.
#[derive(Debug, Default)]
pub struct TokenVault {
    state: Mutex<VaultState>,
}

impl TokenVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, VaultState> {
        // Every mutation below is a single step, so a poisoned guard still
        // holds consistent balances.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credit `amount` to `to`'s external balance (issuance / faucet).
    pub fn fund(&self, to: &ParticipantId, amount: Amount) {
        let mut state = self.state();
        let balance = state.balances.entry(to.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Set the amount the pool may pull from `owner`'s balance.
    ///
    /// Replaces any previous allowance.
    pub fn approve(&self, owner: &ParticipantId, amount: Amount) {
        self.state().allowances.insert(owner.clone(), amount);
    }

    /// External balance of `owner`.
    pub fn balance_of(&self, owner: &ParticipantId) -> Amount {
        self.state().balances.get(owner).copied().unwrap_or(0)
    }

    /// Remaining allowance `owner` has granted the pool.
    pub fn allowance(&self, owner: &ParticipantId) -> Amount {
        self.state().allowances.get(owner).copied().unwrap_or(0)
    }

    /// TRO held in pool custody.
    pub fn custody_balance(&self) -> Amount {
        self.state().custody
    }
}

impl PrincipalTransfer for TokenVault {
    fn transfer_in(&self, from: &ParticipantId, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state();

        let allowance = state.allowances.get(from).copied().unwrap_or(0);
        if amount > allowance {
            return Err(TransferError::NotApproved {
                requested: amount,
                allowance,
            });
        }
        let available = state.balances.get(from).copied().unwrap_or(0);
        if amount > available {
            return Err(TransferError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        let custody = state
            .custody
            .checked_add(amount)
            .ok_or(TransferError::Overflow { requested: amount })?;

        state.allowances.insert(from.clone(), allowance - amount);
        state.balances.insert(from.clone(), available - amount);
        state.custody = custody;
        Ok(())
    }

    fn transfer_out(&self, to: &ParticipantId, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state();

        if amount > state.custody {
            return Err(TransferError::InsufficientBalance {
                requested: amount,
                available: state.custody,
            });
        }
        let balance = state
            .balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TransferError::Overflow { requested: amount })?;

        state.custody -= amount;
        state.balances.insert(to.clone(), balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s).unwrap()
    }

    #[test]
    fn test_transfer_in_requires_approval() {
        let vault = TokenVault::new();
        vault.fund(&id("alice"), 300);
        let err = vault.transfer_in(&id("alice"), 100).unwrap_err();
        assert_eq!(
            err,
            TransferError::NotApproved {
                requested: 100,
                allowance: 0
            }
        );
        assert_eq!(vault.balance_of(&id("alice")), 300);
        assert_eq!(vault.custody_balance(), 0);
    }

    #[test]
    fn test_transfer_in_requires_balance() {
        let vault = TokenVault::new();
        vault.fund(&id("alice"), 300);
        vault.approve(&id("alice"), 400);
        let err = vault.transfer_in(&id("alice"), 400).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance { .. }));
        assert_eq!(vault.allowance(&id("alice")), 400);
    }

    #[test]
    fn test_transfer_in_spends_allowance() {
        let vault = TokenVault::new();
        vault.fund(&id("alice"), 300);
        vault.approve(&id("alice"), 150);
        vault.transfer_in(&id("alice"), 100).unwrap();
        assert_eq!(vault.balance_of(&id("alice")), 200);
        assert_eq!(vault.allowance(&id("alice")), 50);
        assert_eq!(vault.custody_balance(), 100);
        assert!(vault.transfer_in(&id("alice"), 100).is_err());
    }

    #[test]
    fn test_transfer_out() {
        let vault = TokenVault::new();
        vault.fund(&id("alice"), 100);
        vault.approve(&id("alice"), 100);
        vault.transfer_in(&id("alice"), 100).unwrap();
        vault.transfer_out(&id("alice"), 40).unwrap();
        assert_eq!(vault.balance_of(&id("alice")), 40);
        assert_eq!(vault.custody_balance(), 60);
        assert!(vault.transfer_out(&id("bob"), 61).is_err());
        assert_eq!(vault.custody_balance(), 60);
    }

    #[test]
    fn test_transfer_out_rejects_recipient_overflow() {
        let vault = TokenVault::new();
        vault.fund(&id("alice"), 100);
        vault.approve(&id("alice"), 100);
        vault.transfer_in(&id("alice"), 100).unwrap();
        vault.fund(&id("bob"), Amount::MAX);

        let err = vault.transfer_out(&id("bob"), 1).unwrap_err();
        assert_eq!(err, TransferError::Overflow { requested: 1 });
        assert_eq!(vault.balance_of(&id("bob")), Amount::MAX);
        assert_eq!(vault.custody_balance(), 100);
    }
}
