// crates/trodl-staking/src/accrual.rs
//
// Time-weighted reward accrual.
//
// Reward accrued over a segment [last_settlement_time, now] during which the
// participant had `staked` principal is
//
//     delta = staked * (now - last_settlement_time) * reward_rate / ACCRUAL_DENOMINATOR
//
// with `reward_rate` in percent per day and time in seconds, so
// ACCRUAL_DENOMINATOR = 100 * 86_400. The division remainder is carried in the
// account and folded into the next segment, which makes total accrual
// independent of how often an account is settled:
//
//     reward_accrued == floor(sum(staked_i * t_i) * reward_rate / ACCRUAL_DENOMINATOR)
//
// Settlement must run before any change to `staked`, using the balance that
// was in effect for the elapsed segment.

use trodl_core::{Amount, StakingError, Timestamp, SECONDS_PER_DAY};

use crate::account::ParticipantAccount;

/// The reward rate is expressed in percent of stake per day.
pub const RATE_PERCENT_SCALE: u128 = 100;

/// Fixed-point denominator for one segment of accrual.
pub const ACCRUAL_DENOMINATOR: u128 = RATE_PERCENT_SCALE * SECONDS_PER_DAY as u128;

/// Computes and settles reward accrual for participant accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualEngine {
    reward_rate: u64,
}

impl AccrualEngine {
    /// Create an engine for a pool accruing `reward_rate` percent per day.
    pub fn new(reward_rate: u64) -> Self {
        Self { reward_rate }
    }

    /// Reward for one segment, given the carried remainder.
    ///
    /// Returns `(credited, new_carry)` where `new_carry < ACCRUAL_DENOMINATOR`.
    /// The product is split as `staked * rate = q * D + r`, so that only the
    /// actual credited reward can overflow, never an intermediate.
    pub fn segment_accrual(
        &self,
        staked: Amount,
        elapsed: u64,
        carry: u128,
    ) -> Result<(Amount, u128), StakingError> {
        if staked == 0 || elapsed == 0 || self.reward_rate == 0 {
            return Ok((0, carry));
        }

        let per_second = staked
            .checked_mul(self.reward_rate as u128)
            .ok_or(StakingError::Overflow("reward accrual"))?;
        let quotient = per_second / ACCRUAL_DENOMINATOR;
        let remainder = per_second % ACCRUAL_DENOMINATOR;

        // remainder < 8.64e6 and elapsed < 2^64, so this fits comfortably
        let partial = remainder * elapsed as u128 + carry;
        let credited = quotient
            .checked_mul(elapsed as u128)
            .and_then(|whole| whole.checked_add(partial / ACCRUAL_DENOMINATOR))
            .ok_or(StakingError::Overflow("reward accrual"))?;

        Ok((credited, partial % ACCRUAL_DENOMINATOR))
    }

    /// Fold the elapsed segment into `reward_accrued` and move the checkpoint
    /// to `now`. Returns the reward credited.
    ///
    /// Idempotent: a second call at the same `now` credits nothing. On error
    /// the account is left untouched.
    ///
    /// # Errors
    /// Returns `StakingError::ClockRegression` if `now` is before the
    /// account's checkpoint, and `StakingError::Overflow` if the credited
    /// reward does not fit.
    pub fn settle(
        &self,
        account: &mut ParticipantAccount,
        now: Timestamp,
    ) -> Result<Amount, StakingError> {
        let checkpoint = account.last_settlement_time;
        if now < checkpoint {
            tracing::error!(
                "Clock regression during settlement: now {} is before checkpoint {}",
                now,
                checkpoint
            );
            return Err(StakingError::ClockRegression { now, checkpoint });
        }

        let (credited, carry) =
            self.segment_accrual(account.staked, now - checkpoint, account.reward_carry)?;
        let accrued = account
            .reward_accrued
            .checked_add(credited)
            .ok_or(StakingError::Overflow("reward accrued"))?;

        if credited > 0 {
            tracing::debug!(
                "Settled {} wei of reward over {}s on {} wei staked",
                credited,
                now - checkpoint,
                account.staked
            );
        }

        account.reward_accrued = accrued;
        account.reward_carry = carry;
        account.last_settlement_time = now;
        Ok(credited)
    }

    /// A settled copy of `account`, leaving the original unchanged.
    pub fn settled(
        &self,
        account: &ParticipantAccount,
        now: Timestamp,
    ) -> Result<ParticipantAccount, StakingError> {
        let mut copy = account.clone();
        self.settle(&mut copy, now)?;
        Ok(copy)
    }

    /// Total reward accrued as of `now`, without committing a settlement.
    pub fn current_reward(
        &self,
        account: &ParticipantAccount,
        now: Timestamp,
    ) -> Result<Amount, StakingError> {
        Ok(self.settled(account, now)?.reward_accrued)
    }

    /// Unused reward as of `now`: `current_reward - reward_used`.
    pub fn available_reward(
        &self,
        account: &ParticipantAccount,
        now: Timestamp,
    ) -> Result<Amount, StakingError> {
        Ok(self.current_reward(account, now)? - account.reward_used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WEI_PER_TRO;

    fn staked_account(amount: Amount, at: Timestamp) -> ParticipantAccount {
        let mut account = ParticipantAccount::new(at);
        account.credit_stake(amount).unwrap();
        account
    }

    #[test]
    fn test_one_day_accrues_rate_percent() {
        // 100 TRO at 50%/day for one day -> exactly 50 xTRO
        let engine = AccrualEngine::new(50);
        let mut account = staked_account(100 * WEI_PER_TRO, 0);
        let credited = engine.settle(&mut account, SECONDS_PER_DAY).unwrap();
        assert_eq!(credited, 50 * WEI_PER_TRO);
        assert_eq!(account.reward_accrued(), 50 * WEI_PER_TRO);
        assert_eq!(account.last_settlement_time(), SECONDS_PER_DAY);
    }

    #[test]
    fn test_hundred_units_one_day_is_rate() {
        // staked 100 base units, one accrual unit, rate R -> 100 * R%
        for rate in [1u64, 7, 40, 50, 100, 250] {
            let engine = AccrualEngine::new(rate);
            let mut account = staked_account(100, 0);
            engine.settle(&mut account, SECONDS_PER_DAY).unwrap();
            assert_eq!(account.reward_accrued(), 100 * rate as u128 / 100);
        }
    }

    #[test]
    fn test_settle_is_idempotent() {
        let engine = AccrualEngine::new(50);
        let mut account = staked_account(100 * WEI_PER_TRO, 0);
        engine.settle(&mut account, 3_600).unwrap();
        let once = account.clone();
        assert_eq!(engine.settle(&mut account, 3_600).unwrap(), 0);
        assert_eq!(account, once);
    }

    #[test]
    fn test_split_settlement_loses_nothing() {
        // 7000 wei at 1%/day never reaches 1 wei in a single second, but the
        // carry makes per-second settlement match a single settlement.
        let engine = AccrualEngine::new(1);
        let mut stepwise = staked_account(7_000, 0);
        for t in 1..=SECONDS_PER_DAY * 3 {
            engine.settle(&mut stepwise, t).unwrap();
        }
        let mut once = staked_account(7_000, 0);
        engine.settle(&mut once, SECONDS_PER_DAY * 3).unwrap();

        assert_eq!(stepwise.reward_accrued(), once.reward_accrued());
        assert_eq!(stepwise.reward_accrued(), 210);
        assert_eq!(stepwise.reward_carry, once.reward_carry);
    }

    #[test]
    fn test_clock_regression_rejected() {
        let engine = AccrualEngine::new(50);
        let mut account = staked_account(100, 1_000);
        let before = account.clone();
        let err = engine.settle(&mut account, 999).unwrap_err();
        assert_eq!(
            err,
            StakingError::ClockRegression {
                now: 999,
                checkpoint: 1_000
            }
        );
        assert_eq!(account, before);
    }

    #[test]
    fn test_zero_stake_freezes_accrual() {
        let engine = AccrualEngine::new(50);
        let mut account = ParticipantAccount::new(0);
        account.reward_accrued = 12;
        engine.settle(&mut account, SECONDS_PER_DAY * 30).unwrap();
        assert_eq!(account.reward_accrued(), 12);
        assert_eq!(account.last_settlement_time(), SECONDS_PER_DAY * 30);
    }

    #[test]
    fn test_zero_rate_never_accrues() {
        let engine = AccrualEngine::new(0);
        let mut account = staked_account(100 * WEI_PER_TRO, 0);
        engine.settle(&mut account, SECONDS_PER_DAY * 365).unwrap();
        assert_eq!(account.reward_accrued(), 0);
    }

    #[test]
    fn test_current_reward_matches_settle() {
        let engine = AccrualEngine::new(50);
        let mut account = staked_account(100 * WEI_PER_TRO, 0);
        engine.settle(&mut account, 100).unwrap();
        account.move_to_unstaked(40 * WEI_PER_TRO, 100).unwrap();

        let peeked = engine.current_reward(&account, 5_000).unwrap();
        let untouched = account.clone();
        engine.settle(&mut account, 5_000).unwrap();
        assert_eq!(peeked, account.reward_accrued());
        assert_ne!(untouched, account);
    }

    #[test]
    fn test_available_reward_subtracts_used() {
        let engine = AccrualEngine::new(50);
        let mut account = staked_account(100 * WEI_PER_TRO, 0);
        engine.settle(&mut account, SECONDS_PER_DAY).unwrap();
        account.record_use(10 * WEI_PER_TRO).unwrap();
        assert_eq!(
            engine.available_reward(&account, SECONDS_PER_DAY).unwrap(),
            40 * WEI_PER_TRO
        );
    }

    #[test]
    fn test_segment_overflow_reported() {
        let engine = AccrualEngine::new(1_000_000);
        let err = engine.segment_accrual(u128::MAX / 2, 10, 0).unwrap_err();
        assert_eq!(err, StakingError::Overflow("reward accrual"));
    }
}
