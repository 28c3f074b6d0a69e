// crates/trodl-staking/src/ledger.rs
//
// The pool ledger: owns every participant account and the pool-wide
// aggregate, and orchestrates stake / unstake / restake / withdraw / reward
// use as atomic operations.
//
// Each operation follows the same shape:
//   1. validate arguments against the current balances
//   2. settle a *copy* of the participant's account up to "now"
//   3. apply the change to the copy (and call the transfer collaborator, if any)
//   4. commit the copy and the aggregate together
// A failure at any step returns before step 4, so nothing is ever partially
// applied.

use std::collections::HashMap;
use std::sync::Arc;

use trodl_core::{
    Amount, Clock, LedgerEvent, ParticipantId, PrincipalTransfer, RewardConsumerAuthority,
    StakingError, Timestamp,
};

use crate::accrual::AccrualEngine;
use crate::account::{AccountInfo, AccountSnapshot, ParticipantAccount};
use crate::gate::RewardConsumptionGate;
use crate::lock::LockManager;
use crate::params::PoolParams;

/// A single staking pool.
pub struct PoolLedger {
    params: PoolParams,
    engine: AccrualEngine,
    locks: LockManager,
    gate: RewardConsumptionGate,
    transfer: Arc<dyn PrincipalTransfer>,
    clock: Arc<dyn Clock>,
    accounts: HashMap<ParticipantId, ParticipantAccount>,
    /// Participants in first-stake order.
    participants: Vec<ParticipantId>,
    total_staked: Amount,
}

impl PoolLedger {
    /// Create a pool with the given parameters and collaborators.
    ///
    /// # Errors
    /// Returns `StakingError::Config` if `params` fail validation.
    pub fn new(
        params: PoolParams,
        transfer: Arc<dyn PrincipalTransfer>,
        authority: Arc<dyn RewardConsumerAuthority>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StakingError> {
        params.validate()?;
        tracing::info!(
            "Created staking pool: reward rate {}%/day, lock {} day(s)",
            params.reward_rate,
            params.lock_duration_days
        );
        Ok(Self {
            params,
            engine: AccrualEngine::new(params.reward_rate),
            locks: LockManager::new(params.lock_duration_days),
            gate: RewardConsumptionGate::new(authority),
            transfer,
            clock,
            accounts: HashMap::new(),
            participants: Vec::new(),
            total_staked: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Principal operations
    // -----------------------------------------------------------------------

    /// Stake `amount` of principal from `participant` into the pool.
    ///
    /// Pulls the principal through the transfer collaborator; registers the
    /// participant on first stake.
    ///
    /// # Errors
    /// `RequireNonZero` for zero, `TransferFailed` if the collaborator
    /// declines, `ClockRegression` / `Overflow` on internal defects.
    pub fn stake(
        &mut self,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::RequireNonZero);
        }
        let now = self.clock.now();

        let mut account = match self.accounts.get(participant) {
            Some(existing) => self.engine.settled(existing, now)?,
            None => ParticipantAccount::new(now),
        };
        account.credit_stake(amount)?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow("pool total staked"))?;

        self.transfer.transfer_in(participant, amount).map_err(|e| {
            tracing::warn!("Stake of {} wei by {} declined: {}", amount, participant, e);
            StakingError::from(e)
        })?;

        let total = account.staked;
        self.commit(participant, account);
        self.total_staked = total_staked;

        tracing::info!("Staked: {} +{} wei, staked total {}", participant, amount, total);
        Ok(LedgerEvent::Staked {
            participant: participant.clone(),
            amount,
            total,
        })
    }

    /// Move `amount` from staked to unstaked, restarting the lock window for
    /// the whole unstaked balance.
    ///
    /// # Errors
    /// `RequireNonZero` for zero, `InsufficientStaked` if `amount` exceeds
    /// the staked balance.
    pub fn unstake(
        &mut self,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::RequireNonZero);
        }
        let Some(existing) = self.accounts.get(participant) else {
            return Err(StakingError::InsufficientStaked {
                requested: amount,
                available: 0,
            });
        };
        if amount > existing.staked {
            return Err(StakingError::InsufficientStaked {
                requested: amount,
                available: existing.staked,
            });
        }
        let now = self.clock.now();

        let mut account = self.engine.settled(existing, now)?;
        account.move_to_unstaked(amount, now)?;

        let total = account.staked;
        self.commit(participant, account);
        self.total_staked -= amount;

        tracing::info!(
            "Unstaked: {} -{} wei, staked total {}, locked until {}",
            participant,
            amount,
            total,
            now.saturating_add(self.locks.lock_duration_secs())
        );
        Ok(LedgerEvent::Unstaked {
            participant: participant.clone(),
            amount,
            total,
        })
    }

    /// Unstake the participant's entire staked balance.
    ///
    /// # Errors
    /// `RequireNonZero` if nothing is staked.
    pub fn unstake_all(&mut self, participant: &ParticipantId) -> Result<LedgerEvent, StakingError> {
        let staked = self.get_staked(participant);
        if staked == 0 {
            return Err(StakingError::RequireNonZero);
        }
        self.unstake(participant, staked)
    }

    /// Return the entire unstaked balance to the earning pool.
    ///
    /// Allowed regardless of the lock window; does not touch the unstake
    /// timestamp.
    ///
    /// # Errors
    /// `RequireNonZero` if nothing is unstaked.
    pub fn restake(&mut self, participant: &ParticipantId) -> Result<LedgerEvent, StakingError> {
        let Some(existing) = self.accounts.get(participant).filter(|a| a.unstaked > 0) else {
            return Err(StakingError::RequireNonZero);
        };
        let now = self.clock.now();

        let mut account = self.engine.settled(existing, now)?;
        let amount = account.restake_all();
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow("pool total staked"))?;

        let total = account.staked;
        self.commit(participant, account);
        self.total_staked = total_staked;

        tracing::info!("ReStaked: {} +{} wei, staked total {}", participant, amount, total);
        Ok(LedgerEvent::ReStaked {
            participant: participant.clone(),
            amount,
            total,
        })
    }

    /// Withdraw `amount` of unlocked principal back to the participant.
    ///
    /// # Errors
    /// `RequireNonZero` for zero, `InsufficientUnstaked` if `amount` exceeds
    /// the unstaked balance, `WithdrawLocked` inside the lock window,
    /// `TransferFailed` if the collaborator declines the payout.
    pub fn withdraw(
        &mut self,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::RequireNonZero);
        }
        let available = self.get_unstaked(participant);
        if amount > available {
            return Err(StakingError::InsufficientUnstaked {
                requested: amount,
                available,
            });
        }
        let Some(existing) = self.accounts.get(participant) else {
            return Err(StakingError::InsufficientUnstaked {
                requested: amount,
                available: 0,
            });
        };
        let now = self.clock.now();

        let mut account = self.engine.settled(existing, now)?;
        self.locks.ensure_unlocked(&account, now).map_err(|e| {
            tracing::warn!("Withdraw of {} wei by {} rejected: {}", amount, participant, e);
            e
        })?;
        account.debit_unstaked(amount)?;

        self.transfer.transfer_out(participant, amount).map_err(|e| {
            tracing::error!("Payout of {} wei to {} failed: {}", amount, participant, e);
            StakingError::from(e)
        })?;

        let total = account.staked;
        self.commit(participant, account);

        tracing::info!("Withdrawn: {} {} wei, staked total {}", participant, amount, total);
        Ok(LedgerEvent::Withdrawn {
            participant: participant.clone(),
            amount,
            total,
        })
    }

    /// Withdraw the participant's entire unstaked balance.
    ///
    /// # Errors
    /// `RequireNonZero` if nothing is unstaked; otherwise as `withdraw`.
    pub fn withdraw_all(&mut self, participant: &ParticipantId) -> Result<LedgerEvent, StakingError> {
        let unstaked = self.get_unstaked(participant);
        if unstaked == 0 {
            return Err(StakingError::RequireNonZero);
        }
        self.withdraw(participant, unstaked)
    }

    // -----------------------------------------------------------------------
    // Reward consumption
    // -----------------------------------------------------------------------

    /// Spend `amount` of `participant`'s accrued reward on behalf of `caller`.
    ///
    /// Works whether or not the participant still has principal staked.
    ///
    /// # Errors
    /// `RequireNonZero` for zero, `Unauthorized` if `caller` lacks the
    /// reward-consumer capability, `InsufficientRewards` if `amount` exceeds
    /// the unused accrued reward.
    pub fn use_reward(
        &mut self,
        caller: &ParticipantId,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::RequireNonZero);
        }
        self.gate.authorize(caller)?;
        let Some(existing) = self.accounts.get(participant) else {
            return Err(StakingError::InsufficientRewards {
                requested: amount,
                available: 0,
            });
        };
        let now = self.clock.now();

        let mut account = self.engine.settled(existing, now)?;
        let total = self.gate.consume(&mut account, amount)?;
        self.commit(participant, account);

        tracing::info!(
            "RewardUsed: {} spent {} wei of {}'s reward, used total {}",
            caller,
            amount,
            participant,
            total
        );
        Ok(LedgerEvent::RewardUsed {
            participant: participant.clone(),
            consumer: caller.clone(),
            amount,
            total,
        })
    }

    fn commit(&mut self, participant: &ParticipantId, account: ParticipantAccount) {
        if self.accounts.insert(participant.clone(), account).is_none() {
            self.participants.push(participant.clone());
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn params(&self) -> PoolParams {
        self.params
    }

    /// Principal currently staked by `participant` (0 if never staked).
    pub fn get_staked(&self, participant: &ParticipantId) -> Amount {
        self.accounts.get(participant).map_or(0, |a| a.staked)
    }

    /// Principal unstaked but not yet withdrawn by `participant`.
    pub fn get_unstaked(&self, participant: &ParticipantId) -> Amount {
        self.accounts.get(participant).map_or(0, |a| a.unstaked)
    }

    /// Sum of all participants' staked principal.
    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    /// Unused reward of `participant` as of now.
    pub fn reward_balance(&self, participant: &ParticipantId) -> Result<Amount, StakingError> {
        match self.accounts.get(participant) {
            Some(account) => self.engine.available_reward(account, self.clock.now()),
            None => Ok(0),
        }
    }

    /// Sum of every participant's unused reward as of now.
    pub fn total_reward_balance(&self) -> Result<Amount, StakingError> {
        let now = self.clock.now();
        self.accounts.values().try_fold(0u128, |sum, account| {
            let balance = self.engine.available_reward(account, now)?;
            sum.checked_add(balance)
                .ok_or(StakingError::Overflow("total reward balance"))
        })
    }

    /// `(staked, unstaked, reward accrued as of now, reward used)`.
    ///
    /// All zero for a participant that never staked.
    pub fn account_info(&self, participant: &ParticipantId) -> Result<AccountInfo, StakingError> {
        let Some(account) = self.accounts.get(participant) else {
            return Ok(AccountInfo::default());
        };
        Ok(AccountInfo {
            staked: account.staked,
            unstaked: account.unstaked,
            reward_accrued: self.engine.current_reward(account, self.clock.now())?,
            reward_used: account.reward_used,
        })
    }

    /// Full reporting view of an account as of now, if it exists.
    pub fn account_snapshot(
        &self,
        participant: &ParticipantId,
    ) -> Result<Option<AccountSnapshot>, StakingError> {
        let Some(account) = self.accounts.get(participant) else {
            return Ok(None);
        };
        let now = self.clock.now();
        let settled = self.engine.settled(account, now)?;
        Ok(Some(AccountSnapshot {
            staked: settled.staked,
            unstaked: settled.unstaked,
            reward_accrued: settled.reward_accrued,
            reward_used: settled.reward_used,
            reward_balance: settled.available_reward(),
            withdrawable: self.locks.withdrawable(&settled, now),
            unlocks_at: (settled.unstaked > 0)
                .then(|| self.locks.unlock_time(&settled))
                .flatten(),
            total_staked_ever: settled.total_staked_ever,
            total_withdrawn: settled.total_withdrawn,
            as_of: now,
        }))
    }

    /// Unstaked principal `participant` could withdraw right now.
    pub fn withdrawable(&self, participant: &ParticipantId) -> Amount {
        self.accounts
            .get(participant)
            .map_or(0, |a| self.locks.withdrawable(a, self.clock.now()))
    }

    /// When `participant`'s pending unstaked balance unlocks, if any is pending.
    pub fn unlock_time(&self, participant: &ParticipantId) -> Option<Timestamp> {
        self.accounts
            .get(participant)
            .filter(|a| a.unstaked > 0)
            .and_then(|a| self.locks.unlock_time(a))
    }

    /// Participants in first-stake order.
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// The raw account record (checkpointed values, not settled to now).
    pub fn account(&self, participant: &ParticipantId) -> Option<&ParticipantAccount> {
        self.accounts.get(participant)
    }

    /// Check the pool-wide invariants. Returns one message per violation.
    pub fn audit(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let now = self.clock.now();

        let sum: Option<Amount> = self
            .accounts
            .values()
            .try_fold(0u128, |acc, a| acc.checked_add(a.staked));
        if sum != Some(self.total_staked) {
            violations.push(format!(
                "total staked {} does not match sum of accounts {:?}",
                self.total_staked, sum
            ));
        }
        if self.participants.len() != self.accounts.len() {
            violations.push(format!(
                "{} registered participants but {} accounts",
                self.participants.len(),
                self.accounts.len()
            ));
        }
        for (id, account) in &self.accounts {
            if !account.principal_conserved() {
                violations.push(format!("{}: principal not conserved", id));
            }
            match self.engine.current_reward(account, now) {
                Ok(accrued) if account.reward_used > accrued => violations.push(format!(
                    "{}: reward used {} exceeds accrued {}",
                    id, account.reward_used, accrued
                )),
                Ok(_) => {}
                Err(e) => violations.push(format!("{}: {}", id, e)),
            }
        }
        violations
    }
}

impl std::fmt::Debug for PoolLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolLedger")
            .field("params", &self.params)
            .field("participants", &self.participants.len())
            .field("total_staked", &self.total_staked)
            .finish_non_exhaustive()
    }
}
