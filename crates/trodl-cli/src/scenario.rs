// crates/trodl-cli/src/scenario.rs
//
// Scenario replay against an in-memory pool.
//
// A scenario is a JSON document listing steps: funding and approving
// external balances, granting/revoking the reward-consumer role, advancing
// the simulated clock, and every ledger operation. Each step may declare the
// error kind it expects; a step whose outcome differs from its expectation
// is a mismatch and fails the run.

use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use trodl_core::{
    Amount, Clock, LedgerEvent, ManualClock, ParticipantId, StakingError, Timestamp,
    SECONDS_PER_DAY,
};
use trodl_staking::{
    AccountSnapshot, PoolLedger, PoolParams, RoleRegistry, SharedPool, TokenVault, Tro,
};

/// Errors from loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("Failed to read scenario {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Ledger-level failure outside any step (setup, reporting).
    #[error(transparent)]
    Staking(#[from] StakingError),

    /// One or more steps did not match their expectation.
    #[error("{} step(s) did not match expectations", .0.len())]
    Mismatch(Vec<String>),
}

fn de_tro<'de, D>(deserializer: D) -> Result<Tro, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Tro::parse(&raw).map_err(serde::de::Error::custom)
}

/// One scenario operation. Amounts are decimal TRO strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Fund {
        participant: ParticipantId,
        #[serde(deserialize_with = "de_tro")]
        amount: Tro,
    },
    Approve {
        participant: ParticipantId,
        #[serde(deserialize_with = "de_tro")]
        amount: Tro,
    },
    Grant {
        consumer: ParticipantId,
    },
    Revoke {
        consumer: ParticipantId,
    },
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        hours: u64,
        #[serde(default)]
        seconds: u64,
    },
    Stake {
        participant: ParticipantId,
        #[serde(deserialize_with = "de_tro")]
        amount: Tro,
    },
    Unstake {
        participant: ParticipantId,
        #[serde(deserialize_with = "de_tro")]
        amount: Tro,
    },
    UnstakeAll {
        participant: ParticipantId,
    },
    Restake {
        participant: ParticipantId,
    },
    Withdraw {
        participant: ParticipantId,
        #[serde(deserialize_with = "de_tro")]
        amount: Tro,
    },
    WithdrawAll {
        participant: ParticipantId,
    },
    UseReward {
        consumer: ParticipantId,
        participant: ParticipantId,
        #[serde(deserialize_with = "de_tro")]
        amount: Tro,
    },
}

impl Step {
    /// Operation name as written in scenario files.
    pub fn op(&self) -> &'static str {
        match self {
            Step::Fund { .. } => "fund",
            Step::Approve { .. } => "approve",
            Step::Grant { .. } => "grant",
            Step::Revoke { .. } => "revoke",
            Step::Advance { .. } => "advance",
            Step::Stake { .. } => "stake",
            Step::Unstake { .. } => "unstake",
            Step::UnstakeAll { .. } => "unstake_all",
            Step::Restake { .. } => "restake",
            Step::Withdraw { .. } => "withdraw",
            Step::WithdrawAll { .. } => "withdraw_all",
            Step::UseReward { .. } => "use_reward",
        }
    }
}

/// A step plus its expected outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStep {
    #[serde(flatten)]
    pub step: Step,
    /// Expected error kind (e.g. `"WithdrawLocked"`); `None` expects success.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// A scenario document.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from a JSON file.
    pub fn load(path: &str) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse a scenario from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json).map_err(StakingError::from)?)
    }
}

/// What happened at one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub at: Timestamp,
    pub event: Option<LedgerEvent>,
    /// Error kind, if the step failed.
    pub error: Option<&'static str>,
    pub message: String,
    pub matched: bool,
}

/// One participant's final state.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub participant: ParticipantId,
    pub external_balance: Amount,
    #[serde(flatten)]
    pub snapshot: AccountSnapshot,
}

/// Result of a full scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub name: Option<String>,
    pub params: PoolParams,
    pub outcomes: Vec<StepOutcome>,
    pub accounts: Vec<AccountReport>,
    pub total_staked: Amount,
    pub total_reward_balance: Amount,
    pub custody: Amount,
    pub finished_at: Timestamp,
}

impl SimulationReport {
    /// Descriptions of every step that did not match its expectation.
    pub fn mismatches(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.matched)
            .map(|o| format!("step {} ({}): {}", o.index, o.op, o.message))
            .collect()
    }
}

/// An in-memory pool with simulated clock, vault, and roles.
pub struct Simulation {
    params: PoolParams,
    pool: SharedPool,
    vault: Arc<TokenVault>,
    roles: Arc<RoleRegistry>,
    clock: Arc<ManualClock>,
}

impl Simulation {
    /// Build a fresh pool starting at `start`.
    pub fn new(
        params: PoolParams,
        admin: ParticipantId,
        start: Timestamp,
    ) -> Result<Self, StakingError> {
        let vault = Arc::new(TokenVault::new());
        let roles = Arc::new(RoleRegistry::new(admin));
        let clock = Arc::new(ManualClock::new(start));
        let ledger = PoolLedger::new(params, vault.clone(), roles.clone(), clock.clone())?;
        Ok(Self {
            params,
            pool: SharedPool::new(ledger),
            vault,
            roles,
            clock,
        })
    }

    /// Apply one step. Returns the ledger event, if the step produced one.
    pub async fn apply(&self, step: &Step) -> Result<Option<LedgerEvent>, StakingError> {
        let admin = self.roles.admin().clone();
        let event = match step {
            Step::Fund {
                participant,
                amount,
            } => {
                self.vault.fund(participant, amount.wei);
                None
            }
            Step::Approve {
                participant,
                amount,
            } => {
                self.vault.approve(participant, amount.wei);
                None
            }
            Step::Grant { consumer } => {
                self.roles.grant(&admin, consumer)?;
                None
            }
            Step::Revoke { consumer } => {
                self.roles.revoke(&admin, consumer)?;
                None
            }
            Step::Advance {
                days,
                hours,
                seconds,
            } => {
                let delta = days
                    .checked_mul(SECONDS_PER_DAY)
                    .and_then(|d| hours.checked_mul(3_600).and_then(|h| d.checked_add(h)))
                    .and_then(|t| t.checked_add(*seconds))
                    .ok_or(StakingError::Overflow("clock advance"))?;
                self.clock
                    .advance(delta)
                    .ok_or(StakingError::Overflow("clock advance"))?;
                None
            }
            Step::Stake {
                participant,
                amount,
            } => Some(self.pool.stake(participant, amount.wei).await?),
            Step::Unstake {
                participant,
                amount,
            } => Some(self.pool.unstake(participant, amount.wei).await?),
            Step::UnstakeAll { participant } => Some(self.pool.unstake_all(participant).await?),
            Step::Restake { participant } => Some(self.pool.restake(participant).await?),
            Step::Withdraw {
                participant,
                amount,
            } => Some(self.pool.withdraw(participant, amount.wei).await?),
            Step::WithdrawAll { participant } => Some(self.pool.withdraw_all(participant).await?),
            Step::UseReward {
                consumer,
                participant,
                amount,
            } => Some(self.pool.use_reward(consumer, participant, amount.wei).await?),
        };
        Ok(event)
    }

    /// Replay every step and build the final report.
    ///
    /// Step failures are recorded, not propagated; only setup and reporting
    /// errors abort the run.
    pub async fn run(&self, scenario: &Scenario) -> Result<SimulationReport, StakingError> {
        let mut outcomes = Vec::with_capacity(scenario.steps.len());

        for (index, scenario_step) in scenario.steps.iter().enumerate() {
            let step = &scenario_step.step;
            let result = self.apply(step).await;
            let at = self.clock.now();
            let expected = scenario_step.expect_error.as_deref();

            let outcome = match result {
                Ok(event) => {
                    let message = match &event {
                        Some(e) => e.to_string(),
                        None => "ok".to_string(),
                    };
                    let matched = expected.is_none();
                    if let Some(kind) = expected {
                        tracing::warn!("Step {} ({}) succeeded, expected {}", index, step.op(), kind);
                    }
                    StepOutcome {
                        index,
                        op: step.op(),
                        at,
                        event,
                        error: None,
                        message,
                        matched,
                    }
                }
                Err(e) => {
                    let matched = expected == Some(e.kind());
                    if matched {
                        tracing::debug!("Step {} ({}) failed as expected: {}", index, step.op(), e);
                    } else {
                        tracing::warn!("Step {} ({}) failed: {}", index, step.op(), e);
                    }
                    StepOutcome {
                        index,
                        op: step.op(),
                        at,
                        event: None,
                        error: Some(e.kind()),
                        message: e.to_string(),
                        matched,
                    }
                }
            };
            outcomes.push(outcome);
        }

        self.report(scenario.name.clone(), outcomes).await
    }

    async fn report(
        &self,
        name: Option<String>,
        outcomes: Vec<StepOutcome>,
    ) -> Result<SimulationReport, StakingError> {
        let vault = self.vault.clone();
        let (accounts, total_staked, total_reward_balance) = self
            .pool
            .read(|ledger| -> Result<_, StakingError> {
                let mut accounts = Vec::with_capacity(ledger.participant_count());
                for participant in ledger.participants() {
                    if let Some(snapshot) = ledger.account_snapshot(participant)? {
                        accounts.push(AccountReport {
                            participant: participant.clone(),
                            external_balance: vault.balance_of(participant),
                            snapshot,
                        });
                    }
                }
                Ok((accounts, ledger.total_staked(), ledger.total_reward_balance()?))
            })
            .await?;

        Ok(SimulationReport {
            name,
            params: self.params,
            outcomes,
            accounts,
            total_staked,
            total_reward_balance,
            custody: self.vault.custody_balance(),
            finished_at: self.clock.now(),
        })
    }
}
