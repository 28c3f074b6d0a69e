// crates/trodl-staking/src/shared.rs
//
// SharedPool: a cloneable handle to one `PoolLedger` for concurrent callers.
//
// Every balance-affecting operation takes the write lock for its whole
// duration, which serializes operations on each account and on the pool-wide
// aggregate alike. Queries share the read lock.

use std::sync::Arc;

use tokio::sync::RwLock;

use trodl_core::{Amount, LedgerEvent, ParticipantId, StakingError};

use crate::account::AccountInfo;
use crate::ledger::PoolLedger;

/// Shared, lock-guarded access to a staking pool.
#[derive(Clone, Debug)]
pub struct SharedPool {
    inner: Arc<RwLock<PoolLedger>>,
}

impl SharedPool {
    pub fn new(ledger: PoolLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub async fn stake(
        &self,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.stake(participant, amount)
    }

    pub async fn unstake(
        &self,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.unstake(participant, amount)
    }

    pub async fn unstake_all(&self, participant: &ParticipantId) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.unstake_all(participant)
    }

    pub async fn restake(&self, participant: &ParticipantId) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.restake(participant)
    }

    pub async fn withdraw(
        &self,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.withdraw(participant, amount)
    }

    pub async fn withdraw_all(&self, participant: &ParticipantId) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.withdraw_all(participant)
    }

    pub async fn use_reward(
        &self,
        caller: &ParticipantId,
        participant: &ParticipantId,
        amount: Amount,
    ) -> Result<LedgerEvent, StakingError> {
        self.inner.write().await.use_reward(caller, participant, amount)
    }

    pub async fn total_staked(&self) -> Amount {
        self.inner.read().await.total_staked()
    }

    pub async fn reward_balance(&self, participant: &ParticipantId) -> Result<Amount, StakingError> {
        self.inner.read().await.reward_balance(participant)
    }

    pub async fn account_info(&self, participant: &ParticipantId) -> Result<AccountInfo, StakingError> {
        self.inner.read().await.account_info(participant)
    }

    pub async fn participants(&self) -> Vec<ParticipantId> {
        self.inner.read().await.participants().to_vec()
    }

    /// Run a read-only closure against the ledger under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&PoolLedger) -> R) -> R {
        f(&*self.inner.read().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PoolParams;
    use crate::roles::RoleRegistry;
    use crate::vault::TokenVault;
    use trodl_core::ManualClock;

    #[tokio::test]
    async fn test_concurrent_stakers_keep_aggregate() {
        let vault = Arc::new(TokenVault::new());
        let stakers: Vec<ParticipantId> = (0..16)
            .map(|i| ParticipantId::new(format!("staker{}", i)).unwrap())
            .collect();
        for s in &stakers {
            vault.fund(s, 1_000);
            vault.approve(s, 1_000);
        }
        let ledger = PoolLedger::new(
            PoolParams::default(),
            vault.clone(),
            Arc::new(RoleRegistry::new(ParticipantId::new("owner").unwrap())),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap();
        let pool = SharedPool::new(ledger);

        let mut handles = Vec::new();
        for s in stakers.clone() {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    pool.stake(&s, 50).await.unwrap();
                }
                pool.unstake(&s, 100).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(pool.total_staked().await, 16 * 400);
        assert_eq!(pool.participants().await.len(), 16);
        assert!(pool.read(|ledger| ledger.audit()).await.is_empty());
        assert_eq!(vault.custody_balance(), 16 * 500);
    }
}
