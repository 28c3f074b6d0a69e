// crates/trodl-core/src/traits.rs

use crate::error::TransferError;
use crate::identity::ParticipantId;
use crate::Amount;

/// Trait for moving principal between a participant and pool custody.
///
/// Implemented by trodl-staking's in-memory `TokenVault`; a production
/// deployment wires a real token ledger here. Each call is a single logical
/// step: it either moves the full amount or moves nothing.
pub trait PrincipalTransfer: Send + Sync {
    /// Move `amount` from `from`'s external balance into pool custody.
    fn transfer_in(&self, from: &ParticipantId, amount: Amount) -> Result<(), TransferError>;

    /// Move `amount` from pool custody back to `to`'s external balance.
    fn transfer_out(&self, to: &ParticipantId, amount: Amount) -> Result<(), TransferError>;
}

/// Trait for the reward-consumer capability check.
///
/// Implemented by trodl-staking's `RoleRegistry`. The ledger only asks; it
/// never stores role state itself.
pub trait RewardConsumerAuthority: Send + Sync {
    /// Whether `caller` may consume reward on a participant's behalf.
    fn has_consumer_capability(&self, caller: &ParticipantId) -> bool;
}
