// crates/trodl-staking/src/lock.rs
//
// Withdrawal lock window.
//
// Unstaked principal may only be withdrawn once `lock_duration_days` have
// passed since the participant's most recent unstake. A new unstake restarts
// the window for the whole pending unstaked balance. Restaking is never
// locked.

use trodl_core::{Amount, StakingError, Timestamp, SECONDS_PER_DAY};

use crate::account::ParticipantAccount;

/// Enforces the withdrawal lock for participant accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockManager {
    lock_duration_days: u64,
}

impl LockManager {
    pub fn new(lock_duration_days: u64) -> Self {
        Self { lock_duration_days }
    }

    /// Length of the lock window in seconds.
    pub fn lock_duration_secs(&self) -> u64 {
        self.lock_duration_days.saturating_mul(SECONDS_PER_DAY)
    }

    /// Instant at which the pending unstaked balance unlocks.
    ///
    /// `None` if nothing has ever been unstaked.
    pub fn unlock_time(&self, account: &ParticipantAccount) -> Option<Timestamp> {
        account
            .last_unstake_time
            .map(|at| at.saturating_add(self.lock_duration_secs()))
    }

    /// Whether the lock window has elapsed at `now`.
    pub fn is_unlocked(&self, account: &ParticipantAccount, now: Timestamp) -> bool {
        self.unlock_time(account).map_or(true, |unlocks_at| now >= unlocks_at)
    }

    /// Unstaked principal that may be withdrawn at `now`.
    pub fn withdrawable(&self, account: &ParticipantAccount, now: Timestamp) -> Amount {
        if self.is_unlocked(account, now) {
            account.unstaked
        } else {
            0
        }
    }

    /// Reject a withdrawal attempted inside the lock window.
    ///
    /// # Errors
    /// Returns `StakingError::WithdrawLocked` carrying the unlock instant.
    pub fn ensure_unlocked(
        &self,
        account: &ParticipantAccount,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        match self.unlock_time(account) {
            Some(unlocks_at) if now < unlocks_at => {
                Err(StakingError::WithdrawLocked { unlocks_at })
            }
            _ => Ok(()),
        }
    }
}
