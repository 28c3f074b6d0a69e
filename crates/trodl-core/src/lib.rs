// crates/trodl-core/src/lib.rs
//
// trodl-core: Core types, error taxonomy, and collaborator traits for the
// Trodl staking ledger.
//
// This is the leaf crate of the workspace. It holds no ledger logic; it only
// defines the identifiers, timestamps, events, and trait seams that the
// staking engine is written against.

pub mod clock;
pub mod error;
pub mod event;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use trodl_core::ParticipantId;`

pub use clock::{Clock, ManualClock, SystemClock, Timestamp, SECONDS_PER_DAY};
pub use error::{StakingError, TransferError};
pub use event::LedgerEvent;
pub use identity::ParticipantId;
pub use traits::{PrincipalTransfer, RewardConsumerAuthority};

/// Amount of principal or reward, in base units (10^18 per whole token).
pub type Amount = u128;
