// crates/trodl-cli/src/config.rs
//
// Pool configuration for the trodl CLI.
// Loaded from a TOML file or populated with the reference deployment's
// defaults (40% per day, 1-day lock).

use serde::{Deserialize, Serialize};
use std::fs;

use trodl_core::{Clock, ParticipantId, StakingError, Timestamp};
use trodl_staking::{PoolParams, DEFAULT_LOCK_DURATION_DAYS, DEFAULT_REWARD_RATE};

/// Runtime configuration for a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Reward accrued per day, in percent of staked principal.
    #[serde(default = "default_reward_rate")]
    pub reward_rate: u64,

    /// Days between an unstake and the earliest withdrawal.
    #[serde(default = "default_lock_duration_days")]
    pub lock_duration_days: u64,

    /// Identity allowed to grant and revoke the reward-consumer role.
    #[serde(default = "default_admin")]
    pub admin: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Unix time the simulated clock starts at. Defaults to the current time.
    #[serde(default)]
    pub start_time: Option<u64>,
}

fn default_reward_rate() -> u64 {
    DEFAULT_REWARD_RATE
}

fn default_lock_duration_days() -> u64 {
    DEFAULT_LOCK_DURATION_DAYS
}

fn default_admin() -> String {
    "owner".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            reward_rate: default_reward_rate(),
            lock_duration_days: default_lock_duration_days(),
            admin: default_admin(),
            log_level: default_log_level(),
            start_time: None,
        }
    }
}

impl PoolConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: PoolConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Validated pool parameters.
    pub fn params(&self) -> Result<PoolParams, StakingError> {
        PoolParams::new(self.reward_rate, self.lock_duration_days)
    }

    /// Validated admin identity.
    pub fn admin_id(&self) -> Result<ParticipantId, StakingError> {
        ParticipantId::new(self.admin.as_str())
    }

    /// Instant the simulated clock starts at: `start_time` if set, else
    /// `clock`'s current time.
    pub fn resolve_start(&self, clock: &dyn Clock) -> Timestamp {
        self.start_time.unwrap_or_else(|| clock.now())
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
