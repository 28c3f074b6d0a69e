// crates/trodl-staking/src/gate.rs
//
// Reward consumption gate.
//
// Authorized third parties may spend a participant's accrued, unused reward
// on the participant's behalf. Reward is a virtual credit: consumption never
// touches principal or custody.

use std::sync::Arc;

use trodl_core::{Amount, ParticipantId, RewardConsumerAuthority, StakingError};

use crate::account::ParticipantAccount;

/// Validates and applies reward consumption.
pub struct RewardConsumptionGate {
    authority: Arc<dyn RewardConsumerAuthority>,
}

impl RewardConsumptionGate {
    pub fn new(authority: Arc<dyn RewardConsumerAuthority>) -> Self {
        Self { authority }
    }

    /// Check that `caller` holds the reward-consumer capability.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` otherwise.
    pub fn authorize(&self, caller: &ParticipantId) -> Result<(), StakingError> {
        if self.authority.has_consumer_capability(caller) {
            Ok(())
        } else {
            tracing::warn!("Rejected reward use by {}: missing consumer capability", caller);
            Err(StakingError::Unauthorized(caller.clone()))
        }
    }

    /// Apply consumption to an already-settled account.
    ///
    /// Returns the participant's new cumulative reward used.
    ///
    /// # Errors
    /// Returns `StakingError::RequireNonZero` for zero, and
    /// `StakingError::InsufficientRewards` if `amount` exceeds the unused
    /// accrued reward. The account is unchanged on error.
    pub fn consume(
        &self,
        account: &mut ParticipantAccount,
        amount: Amount,
    ) -> Result<Amount, StakingError> {
        if amount == 0 {
            return Err(StakingError::RequireNonZero);
        }
        account.record_use(amount)
    }
}

impl std::fmt::Debug for RewardConsumptionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardConsumptionGate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedAuthority(HashSet<ParticipantId>);

    impl RewardConsumerAuthority for FixedAuthority {
        fn has_consumer_capability(&self, caller: &ParticipantId) -> bool {
            self.0.contains(caller)
        }
    }

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s).unwrap()
    }

    fn gate_with(consumers: &[&str]) -> RewardConsumptionGate {
        let set = consumers.iter().map(|c| id(c)).collect();
        RewardConsumptionGate::new(Arc::new(FixedAuthority(set)))
    }

    #[test]
    fn test_authorize() {
        let gate = gate_with(&["shop"]);
        assert!(gate.authorize(&id("shop")).is_ok());
        assert_eq!(
            gate.authorize(&id("mallory")),
            Err(StakingError::Unauthorized(id("mallory")))
        );
    }

    #[test]
    fn test_consume_within_quota() {
        let gate = gate_with(&[]);
        let mut account = ParticipantAccount::new(0);
        account.reward_accrued = 10;
        assert_eq!(gate.consume(&mut account, 4).unwrap(), 4);
        assert_eq!(gate.consume(&mut account, 6).unwrap(), 10);
        assert_eq!(account.available_reward(), 0);
    }

    #[test]
    fn test_consume_beyond_quota_leaves_account() {
        let gate = gate_with(&[]);
        let mut account = ParticipantAccount::new(0);
        account.reward_accrued = 10;
        let before = account.clone();
        assert!(matches!(
            gate.consume(&mut account, 11),
            Err(StakingError::InsufficientRewards {
                requested: 11,
                available: 10
            })
        ));
        assert_eq!(account, before);
    }

    #[test]
    fn test_consume_zero_rejected() {
        let gate = gate_with(&[]);
        let mut account = ParticipantAccount::new(0);
        assert_eq!(gate.consume(&mut account, 0), Err(StakingError::RequireNonZero));
    }
}
