// crates/trodl-core/src/error.rs

use thiserror::Error;

use crate::clock::Timestamp;
use crate::identity::ParticipantId;
use crate::Amount;

/// Ledger-wide error types for the Trodl staking pool.
///
/// Every variant is a rejected operation: the ledger validates before it
/// mutates, so no error leaves partially applied state behind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StakingError {
    /// A value-bearing operation was invoked with zero, or the participant
    /// holds none of the balance the operation needs.
    #[error("Require non-zero value")]
    RequireNonZero,

    /// Requested unstake exceeds the currently staked principal.
    #[error("Not enough staked principal: requested {requested}, available {available}")]
    InsufficientStaked { requested: Amount, available: Amount },

    /// Requested withdrawal exceeds the unstaked (pending) principal.
    #[error("Not enough unstaked principal: requested {requested}, available {available}")]
    InsufficientUnstaked { requested: Amount, available: Amount },

    /// The principal-transfer collaborator declined to move funds.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Withdrawal attempted inside the lock window.
    #[error("Withdraw in lock period: unlocks at {unlocks_at}")]
    WithdrawLocked { unlocks_at: Timestamp },

    /// Caller does not hold the reward-consumer capability.
    #[error("Unauthorized: {0} cannot use rewards")]
    Unauthorized(ParticipantId),

    /// Requested consumption exceeds the unused accrued reward.
    #[error("Insufficient rewards: requested {requested}, available {available}")]
    InsufficientRewards { requested: Amount, available: Amount },

    /// Settlement was asked to run earlier than the stored checkpoint.
    #[error("Clock regression: now {now} is before checkpoint {checkpoint}")]
    ClockRegression { now: Timestamp, checkpoint: Timestamp },

    /// A participant identifier failed validation.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Checked arithmetic on amounts overflowed.
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Invalid pool parameters or configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StakingError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StakingError::RequireNonZero => "RequireNonZero",
            StakingError::InsufficientStaked { .. } => "InsufficientStaked",
            StakingError::InsufficientUnstaked { .. } => "InsufficientUnstaked",
            StakingError::TransferFailed(_) => "TransferFailed",
            StakingError::WithdrawLocked { .. } => "WithdrawLocked",
            StakingError::Unauthorized(_) => "Unauthorized",
            StakingError::InsufficientRewards { .. } => "InsufficientRewards",
            StakingError::ClockRegression { .. } => "ClockRegression",
            StakingError::InvalidIdentifier(_) => "InvalidIdentifier",
            StakingError::Overflow(_) => "Overflow",
            StakingError::Config(_) => "Config",
            StakingError::Serialization(_) => "Serialization",
        }
    }
}

impl From<serde_json::Error> for StakingError {
    fn from(e: serde_json::Error) -> Self {
        StakingError::Serialization(e.to_string())
    }
}

/// Reasons the principal-transfer collaborator can decline a movement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The source does not hold enough units.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    /// The source has not authorized the pool to move this many units.
    #[error("not approved: requested {requested}, allowance {allowance}")]
    NotApproved { requested: Amount, allowance: Amount },

    /// The receiving balance cannot hold `requested` more units.
    #[error("balance overflow: cannot credit {requested}")]
    Overflow { requested: Amount },
}

impl From<TransferError> for StakingError {
    fn from(e: TransferError) -> Self {
        StakingError::TransferFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_maps_to_transfer_failed() {
        let err: StakingError = TransferError::NotApproved {
            requested: 5,
            allowance: 0,
        }
        .into();
        assert_eq!(err.kind(), "TransferFailed");
        assert!(err.to_string().contains("not approved"));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(StakingError::RequireNonZero.to_string(), "Require non-zero value");
        let err = StakingError::WithdrawLocked { unlocks_at: 42 };
        assert_eq!(err.to_string(), "Withdraw in lock period: unlocks at 42");
    }
}
