// crates/trodl-cli/src/commands/simulate.rs
//
// `trodl simulate <scenario.json>`: replay a scenario against an
// in-memory pool and print each step plus the final accounts.

use tabled::Tabled;

use trodl_core::SystemClock;

use crate::config::PoolConfig;
use crate::output::{format_json, format_table, format_time, format_tro, OutputFormat};
use crate::scenario::{Scenario, ScenarioError, Simulation, SimulationReport};

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Op")]
    op: &'static str,
    #[tabled(rename = "At")]
    at: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "OK")]
    matched: &'static str,
}

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "Participant")]
    participant: String,
    #[tabled(rename = "Staked")]
    staked: String,
    #[tabled(rename = "Unstaked")]
    unstaked: String,
    #[tabled(rename = "Withdrawable")]
    withdrawable: String,
    #[tabled(rename = "Reward")]
    reward: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Wallet")]
    wallet: String,
}

fn print_tables(report: &SimulationReport) {
    if let Some(name) = &report.name {
        println!("Scenario: {}", name);
    }
    println!(
        "Pool: {}%/day, {}-day lock",
        report.params.reward_rate, report.params.lock_duration_days
    );
    println!();

    let steps: Vec<StepRow> = report
        .outcomes
        .iter()
        .map(|o| StepRow {
            index: o.index,
            op: o.op,
            at: format_time(o.at),
            result: match o.error {
                Some(kind) => format!("{}: {}", kind, o.message),
                None => o.message.clone(),
            },
            matched: if o.matched { "yes" } else { "NO" },
        })
        .collect();
    println!("{}", format_table(&steps));
    println!();

    let accounts: Vec<AccountRow> = report
        .accounts
        .iter()
        .map(|a| AccountRow {
            participant: a.participant.to_string(),
            staked: format_tro(a.snapshot.staked),
            unstaked: format_tro(a.snapshot.unstaked),
            withdrawable: format_tro(a.snapshot.withdrawable),
            reward: format_tro(a.snapshot.reward_balance),
            used: format_tro(a.snapshot.reward_used),
            wallet: format_tro(a.external_balance),
        })
        .collect();
    if accounts.is_empty() {
        println!("No accounts.");
    } else {
        println!("{}", format_table(&accounts));
    }
    println!();
    println!("Total staked:     {}", format_tro(report.total_staked));
    println!("Total reward:     {}", format_tro(report.total_reward_balance));
    println!("Held in custody:  {}", format_tro(report.custody));
    println!("Finished at:      {}", format_time(report.finished_at));
}

/// Run the simulate command.
pub async fn run(
    config: &PoolConfig,
    path: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::load(path)?;
    let start = config.resolve_start(&SystemClock);

    tracing::info!(
        "Replaying {} step(s) from {}",
        scenario.steps.len(),
        path
    );
    let simulation = Simulation::new(config.params()?, config.admin_id()?, start)?;
    let report = simulation.run(&scenario).await?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => print_tables(&report),
    }

    let mismatches = report.mismatches();
    if !mismatches.is_empty() {
        for m in &mismatches {
            tracing::error!("{}", m);
        }
        return Err(ScenarioError::Mismatch(mismatches).into());
    }

    Ok(())
}
