// crates/trodl-staking/src/roles.rs
//
// Reward-consumer role registry.
//
// One admin identity may grant and revoke the reward-consumer capability. The
// ledger only sees the `RewardConsumerAuthority` predicate.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use trodl_core::{ParticipantId, RewardConsumerAuthority, StakingError};

/// Holds the set of identities allowed to consume participants' reward.
#[derive(Debug)]
pub struct RoleRegistry {
    admin: ParticipantId,
    consumers: RwLock<BTreeSet<ParticipantId>>,
}

impl RoleRegistry {
    /// Create a registry administered by `admin`, with no consumers.
    pub fn new(admin: ParticipantId) -> Self {
        Self {
            admin,
            consumers: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn admin(&self) -> &ParticipantId {
        &self.admin
    }

    fn ensure_admin(&self, caller: &ParticipantId) -> Result<(), StakingError> {
        if *caller == self.admin {
            Ok(())
        } else {
            tracing::warn!("Rejected role change by non-admin {}", caller);
            Err(StakingError::Unauthorized(caller.clone()))
        }
    }

    /// Grant the reward-consumer capability. Returns `false` if already held.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` if `caller` is not the admin.
    pub fn grant(
        &self,
        caller: &ParticipantId,
        consumer: &ParticipantId,
    ) -> Result<bool, StakingError> {
        self.ensure_admin(caller)?;
        let added = self
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(consumer.clone());
        if added {
            tracing::info!("Granted reward-consumer role to {}", consumer);
        }
        Ok(added)
    }

    /// Revoke the reward-consumer capability. Returns `false` if not held.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` if `caller` is not the admin.
    pub fn revoke(
        &self,
        caller: &ParticipantId,
        consumer: &ParticipantId,
    ) -> Result<bool, StakingError> {
        self.ensure_admin(caller)?;
        let removed = self
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(consumer);
        if removed {
            tracing::info!("Revoked reward-consumer role from {}", consumer);
        }
        Ok(removed)
    }

    /// All current consumers, sorted.
    pub fn consumers(&self) -> Vec<ParticipantId> {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl RewardConsumerAuthority for RoleRegistry {
    fn has_consumer_capability(&self, caller: &ParticipantId) -> bool {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(caller)
    }
}
