// crates/trodl-staking/src/account.rs
//
// Per-participant account record.
//
// Created lazily on first stake and never destroyed: balances may return to
// zero but the record (and its reward history) persists. Fields are only
// mutated through the methods below, each of which preserves the account's
// invariants or rejects the change without touching anything:
//   - staked, unstaked, reward_used never go negative (unsigned, checked)
//   - reward_used <= reward_accrued
//   - staked + unstaked + total_withdrawn == total_staked_ever

use serde::{Deserialize, Serialize};

use trodl_core::{Amount, StakingError, Timestamp};

/// The accounting record of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantAccount {
    /// Principal currently earning reward.
    pub(crate) staked: Amount,
    /// Principal out of the earning pool, waiting out the lock.
    pub(crate) unstaked: Amount,
    /// Reward credited as of `last_settlement_time`.
    pub(crate) reward_accrued: Amount,
    /// Reward consumed through the consumption gate.
    pub(crate) reward_used: Amount,
    /// Fixed-point remainder not yet large enough to credit one wei of reward.
    pub(crate) reward_carry: u128,
    /// Checkpoint: accrual after this instant is not yet in `reward_accrued`.
    pub(crate) last_settlement_time: Timestamp,
    /// Most recent unstake; governs the lock of the whole `unstaked` balance.
    pub(crate) last_unstake_time: Option<Timestamp>,
    /// Sum of every amount ever staked (restakes excluded).
    pub(crate) total_staked_ever: Amount,
    /// Sum of every amount ever withdrawn.
    pub(crate) total_withdrawn: Amount,
}

impl ParticipantAccount {
    /// Open an empty account with its first checkpoint at `opened_at`.
    pub fn new(opened_at: Timestamp) -> Self {
        Self {
            staked: 0,
            unstaked: 0,
            reward_accrued: 0,
            reward_used: 0,
            reward_carry: 0,
            last_settlement_time: opened_at,
            last_unstake_time: None,
            total_staked_ever: 0,
            total_withdrawn: 0,
        }
    }

    pub fn staked(&self) -> Amount {
        self.staked
    }

    pub fn unstaked(&self) -> Amount {
        self.unstaked
    }

    /// Reward accrued as of the last checkpoint (not as of "now").
    pub fn reward_accrued(&self) -> Amount {
        self.reward_accrued
    }

    pub fn reward_used(&self) -> Amount {
        self.reward_used
    }

    pub fn last_settlement_time(&self) -> Timestamp {
        self.last_settlement_time
    }

    pub fn last_unstake_time(&self) -> Option<Timestamp> {
        self.last_unstake_time
    }

    pub fn total_staked_ever(&self) -> Amount {
        self.total_staked_ever
    }

    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }

    /// Unused reward as of the last checkpoint.
    pub fn available_reward(&self) -> Amount {
        self.reward_accrued - self.reward_used
    }

    /// Whether no principal is created or destroyed for this account.
    pub fn principal_conserved(&self) -> bool {
        self.staked
            .checked_add(self.unstaked)
            .and_then(|sum| sum.checked_add(self.total_withdrawn))
            == Some(self.total_staked_ever)
    }

    /// Add freshly staked principal.
    pub(crate) fn credit_stake(&mut self, amount: Amount) -> Result<(), StakingError> {
        let staked = self
            .staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow("staked balance"))?;
        let ever = self
            .total_staked_ever
            .checked_add(amount)
            .ok_or(StakingError::Overflow("lifetime staked"))?;
        self.staked = staked;
        self.total_staked_ever = ever;
        Ok(())
    }

    /// Move `amount` from staked to unstaked and restart the lock at `now`.
    ///
    /// The lock restarts for the entire resulting unstaked balance, including
    /// any remainder whose earlier lock had already elapsed.
    pub(crate) fn move_to_unstaked(
        &mut self,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if amount > self.staked {
            return Err(StakingError::InsufficientStaked {
                requested: amount,
                available: self.staked,
            });
        }
        // unstaked <= total_staked_ever, so this cannot overflow
        self.staked -= amount;
        self.unstaked += amount;
        self.last_unstake_time = Some(now);
        Ok(())
    }

    /// Return the whole unstaked balance to staked. Returns the amount moved.
    pub(crate) fn restake_all(&mut self) -> Amount {
        let amount = self.unstaked;
        self.staked += amount;
        self.unstaked = 0;
        amount
    }

    /// Remove withdrawn principal from the unstaked balance.
    pub(crate) fn debit_unstaked(&mut self, amount: Amount) -> Result<(), StakingError> {
        if amount > self.unstaked {
            return Err(StakingError::InsufficientUnstaked {
                requested: amount,
                available: self.unstaked,
            });
        }
        self.unstaked -= amount;
        self.total_withdrawn += amount;
        Ok(())
    }

    /// Record consumption of `amount` reward. Returns the new cumulative usage.
    pub(crate) fn record_use(&mut self, amount: Amount) -> Result<Amount, StakingError> {
        let available = self.available_reward();
        if amount > available {
            return Err(StakingError::InsufficientRewards {
                requested: amount,
                available,
            });
        }
        self.reward_used += amount;
        Ok(self.reward_used)
    }
}

/// The four-tuple returned by account info queries.
///
/// `reward_accrued` is evaluated as of the query instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub staked: Amount,
    pub unstaked: Amount,
    pub reward_accrued: Amount,
    pub reward_used: Amount,
}

/// Full view of an account as of a query instant, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub staked: Amount,
    pub unstaked: Amount,
    pub reward_accrued: Amount,
    pub reward_used: Amount,
    /// `reward_accrued - reward_used`.
    pub reward_balance: Amount,
    /// Unstaked principal that may be withdrawn right now.
    pub withdrawable: Amount,
    /// When the pending unstaked balance unlocks, if any is pending.
    pub unlocks_at: Option<Timestamp>,
    pub total_staked_ever: Amount,
    pub total_withdrawn: Amount,
    /// The instant this snapshot was evaluated at.
    pub as_of: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_empty() {
        let account = ParticipantAccount::new(10);
        assert_eq!(account.staked(), 0);
        assert_eq!(account.unstaked(), 0);
        assert_eq!(account.reward_accrued(), 0);
        assert_eq!(account.last_settlement_time(), 10);
        assert_eq!(account.last_unstake_time(), None);
        assert!(account.principal_conserved());
    }

    #[test]
    fn test_stake_unstake_withdraw_conserves_principal() {
        let mut account = ParticipantAccount::new(0);
        account.credit_stake(100).unwrap();
        account.move_to_unstaked(60, 5).unwrap();
        account.debit_unstaked(25).unwrap();
        assert_eq!(account.staked(), 40);
        assert_eq!(account.unstaked(), 35);
        assert_eq!(account.total_withdrawn(), 25);
        assert!(account.principal_conserved());
    }

    #[test]
    fn test_unstake_more_than_staked_leaves_account_unchanged() {
        let mut account = ParticipantAccount::new(0);
        account.credit_stake(10).unwrap();
        let before = account.clone();
        let err = account.move_to_unstaked(11, 1).unwrap_err();
        assert!(matches!(
            err,
            StakingError::InsufficientStaked {
                requested: 11,
                available: 10
            }
        ));
        assert_eq!(account, before);
    }

    #[test]
    fn test_unstake_resets_lock_timestamp() {
        let mut account = ParticipantAccount::new(0);
        account.credit_stake(10).unwrap();
        account.move_to_unstaked(4, 100).unwrap();
        account.move_to_unstaked(1, 900).unwrap();
        assert_eq!(account.unstaked(), 5);
        assert_eq!(account.last_unstake_time(), Some(900));
    }

    #[test]
    fn test_restake_all() {
        let mut account = ParticipantAccount::new(0);
        account.credit_stake(100).unwrap();
        account.move_to_unstaked(30, 1).unwrap();
        assert_eq!(account.restake_all(), 30);
        assert_eq!(account.staked(), 100);
        assert_eq!(account.unstaked(), 0);
        // Restake is not a new stake
        assert_eq!(account.total_staked_ever(), 100);
    }

    #[test]
    fn test_record_use_bounded_by_accrued() {
        let mut account = ParticipantAccount::new(0);
        account.reward_accrued = 5;
        assert_eq!(account.record_use(3).unwrap(), 3);
        let err = account.record_use(3).unwrap_err();
        assert!(matches!(
            err,
            StakingError::InsufficientRewards {
                requested: 3,
                available: 2
            }
        ));
        assert_eq!(account.reward_used(), 3);
    }

    #[test]
    fn test_credit_stake_overflow() {
        let mut account = ParticipantAccount::new(0);
        account.credit_stake(u128::MAX).unwrap();
        assert_eq!(
            account.credit_stake(1).unwrap_err(),
            StakingError::Overflow("staked balance")
        );
        assert_eq!(account.staked(), u128::MAX);
    }
}
