// crates/trodl-cli/src/commands/params.rs
//
// `trodl params`: show the resolved pool parameters.

use serde::Serialize;
use tabled::Tabled;

use crate::config::PoolConfig;
use crate::output::{format_json, format_table, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct ParamsRow {
    #[tabled(rename = "Reward rate (%/day)")]
    reward_rate: u64,
    #[tabled(rename = "Lock (days)")]
    lock_duration_days: u64,
    #[tabled(rename = "Lock (seconds)")]
    lock_duration_secs: u64,
    #[tabled(rename = "Admin")]
    admin: String,
}

/// Run the params command.
pub async fn run(config: &PoolConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let params = config.params()?;
    let row = ParamsRow {
        reward_rate: params.reward_rate,
        lock_duration_days: params.lock_duration_days,
        lock_duration_secs: params.lock_duration_secs(),
        admin: config.admin_id()?.to_string(),
    };

    match format {
        OutputFormat::Json => println!("{}", format_json(&row)),
        OutputFormat::Table => println!("{}", format_table(&[row])),
    }

    Ok(())
}
