// crates/trodl-staking/src/lib.rs
//
// trodl-staking: the staking pool ledger.
//
// Participants lock principal (TRO) into a single pool and accrue a
// non-transferable reward credit (xTRO) proportional to amount x time staked.
// Unstaked principal waits out a lock window before it can be withdrawn;
// authorized consumers may spend a participant's accrued reward.
//
// All values are tracked in wei (10^18 per whole token). Reward accrual is
// computed lazily: nothing runs in the background, every operation settles the
// affected account up to "now" before mutating it.

pub mod accrual;
pub mod account;
pub mod gate;
pub mod ledger;
pub mod lock;
pub mod params;
pub mod roles;
pub mod shared;
pub mod token;
pub mod vault;

// Re-export key types for ergonomic access from downstream crates.
pub use accrual::{AccrualEngine, ACCRUAL_DENOMINATOR, RATE_PERCENT_SCALE};
pub use account::{AccountInfo, AccountSnapshot, ParticipantAccount};
pub use gate::RewardConsumptionGate;
pub use ledger::PoolLedger;
pub use lock::LockManager;
pub use params::{PoolParams, DEFAULT_LOCK_DURATION_DAYS, DEFAULT_REWARD_RATE};
pub use roles::RoleRegistry;
pub use shared::SharedPool;
pub use token::{Tro, TRO_DECIMALS, WEI_PER_TRO};
pub use vault::TokenVault;
