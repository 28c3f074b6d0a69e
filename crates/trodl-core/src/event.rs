// crates/trodl-core/src/event.rs
//
// Observable ledger events. Every committed operation yields exactly one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::ParticipantId;
use crate::Amount;

/// Event produced by a committed ledger operation.
///
/// `total` is the participant's resulting staked principal for principal
/// movements, and the resulting cumulative reward used for `RewardUsed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Principal moved into the pool and began earning.
    Staked {
        participant: ParticipantId,
        amount: Amount,
        total: Amount,
    },
    /// Principal left the earning pool and entered the lock window.
    Unstaked {
        participant: ParticipantId,
        amount: Amount,
        total: Amount,
    },
    /// Pending unstaked principal returned to the earning pool.
    ReStaked {
        participant: ParticipantId,
        amount: Amount,
        total: Amount,
    },
    /// Unlocked principal returned to the participant.
    Withdrawn {
        participant: ParticipantId,
        amount: Amount,
        total: Amount,
    },
    /// An authorized consumer spent part of the participant's reward.
    RewardUsed {
        participant: ParticipantId,
        consumer: ParticipantId,
        amount: Amount,
        total: Amount,
    },
}

impl LedgerEvent {
    /// The participant whose account the event concerns.
    pub fn participant(&self) -> &ParticipantId {
        match self {
            LedgerEvent::Staked { participant, .. }
            | LedgerEvent::Unstaked { participant, .. }
            | LedgerEvent::ReStaked { participant, .. }
            | LedgerEvent::Withdrawn { participant, .. }
            | LedgerEvent::RewardUsed { participant, .. } => participant,
        }
    }

    /// The delta carried by the event.
    pub fn amount(&self) -> Amount {
        match self {
            LedgerEvent::Staked { amount, .. }
            | LedgerEvent::Unstaked { amount, .. }
            | LedgerEvent::ReStaked { amount, .. }
            | LedgerEvent::Withdrawn { amount, .. }
            | LedgerEvent::RewardUsed { amount, .. } => *amount,
        }
    }

    /// The resulting total carried by the event.
    pub fn total(&self) -> Amount {
        match self {
            LedgerEvent::Staked { total, .. }
            | LedgerEvent::Unstaked { total, .. }
            | LedgerEvent::ReStaked { total, .. }
            | LedgerEvent::Withdrawn { total, .. }
            | LedgerEvent::RewardUsed { total, .. } => *total,
        }
    }

    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Staked { .. } => "Staked",
            LedgerEvent::Unstaked { .. } => "Unstaked",
            LedgerEvent::ReStaked { .. } => "ReStaked",
            LedgerEvent::Withdrawn { .. } => "Withdrawn",
            LedgerEvent::RewardUsed { .. } => "RewardUsed",
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} participant={} amount={} total={}",
            self.name(),
            self.participant(),
            self.amount(),
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ParticipantId {
        ParticipantId::new("alice").unwrap()
    }

    #[test]
    fn test_accessors() {
        let event = LedgerEvent::Unstaked {
            participant: alice(),
            amount: 40,
            total: 10,
        };
        assert_eq!(event.name(), "Unstaked");
        assert_eq!(event.participant(), &alice());
        assert_eq!(event.amount(), 40);
        assert_eq!(event.total(), 10);
    }

    #[test]
    fn test_serialized_tag() {
        let event = LedgerEvent::ReStaked {
            participant: alice(),
            amount: 1,
            total: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "re_staked");
        assert_eq!(json["participant"], "alice");
    }
}
