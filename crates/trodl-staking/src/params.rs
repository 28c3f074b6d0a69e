// crates/trodl-staking/src/params.rs
//
// Immutable pool parameters, fixed at pool creation.

use serde::{Deserialize, Serialize};

use trodl_core::{StakingError, SECONDS_PER_DAY};

/// Reward rate used by the reference deployment: 40% of stake per day.
pub const DEFAULT_REWARD_RATE: u64 = 40;

/// Lock window used by the reference deployment: 1 day.
pub const DEFAULT_LOCK_DURATION_DAYS: u64 = 1;

/// Upper bound on the reward rate (percent per day) accepted at creation.
pub const MAX_REWARD_RATE: u64 = 1_000_000;

/// Upper bound on the lock window accepted at creation (100 years).
pub const MAX_LOCK_DURATION_DAYS: u64 = 36_500;

/// Parameters of a staking pool.
///
/// There is no reconfiguration path: a `PoolLedger` copies these at creation
/// and never changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    /// Reward accrued per day, in percent of staked principal.
    pub reward_rate: u64,
    /// Minimum wait between an unstake and a withdrawal, in days.
    pub lock_duration_days: u64,
}

impl PoolParams {
    /// Create and validate a parameter set.
    pub fn new(reward_rate: u64, lock_duration_days: u64) -> Result<Self, StakingError> {
        let params = Self {
            reward_rate,
            lock_duration_days,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameters are within supported bounds.
    ///
    /// # Errors
    /// Returns `StakingError::Config` if the rate or lock window is out of range.
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.reward_rate > MAX_REWARD_RATE {
            return Err(StakingError::Config(format!(
                "reward_rate {} exceeds maximum {}",
                self.reward_rate, MAX_REWARD_RATE
            )));
        }
        if self.lock_duration_days > MAX_LOCK_DURATION_DAYS {
            return Err(StakingError::Config(format!(
                "lock_duration_days {} exceeds maximum {}",
                self.lock_duration_days, MAX_LOCK_DURATION_DAYS
            )));
        }
        Ok(())
    }

    /// Lock window in seconds.
    pub fn lock_duration_secs(&self) -> u64 {
        self.lock_duration_days * SECONDS_PER_DAY
    }
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            reward_rate: DEFAULT_REWARD_RATE,
            lock_duration_days: DEFAULT_LOCK_DURATION_DAYS,
        }
    }
}
