// crates/trodl-cli/src/main.rs
//
// CLI entrypoint for the Trodl staking pool tools.
//
// Loads pool configuration, applies command-line overrides, and dispatches
// to `params` (show resolved parameters) or `simulate` (replay a scenario
// file against an in-memory pool).

mod commands;
mod config;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use config::{expand_tilde, PoolConfig};
use output::OutputFormat;

/// Trodl staking pool CLI.
#[derive(Parser, Debug)]
#[command(
    name = "trodl",
    version = "0.1.0",
    about = "Trodl staking pool: parameters and scenario replay"
)]
struct Cli {
    /// Path to the TOML pool configuration file.
    #[arg(long, global = true, default_value = "~/.trodl/pool.toml")]
    config: String,

    /// Override the reward rate (percent of staked principal per day).
    #[arg(long, global = true)]
    reward_rate: Option<u64>,

    /// Override the withdrawal lock duration in days.
    #[arg(long, global = true)]
    lock_days: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the resolved pool parameters.
    Params {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSON scenario against an in-memory pool.
    Simulate {
        /// Path to the scenario file.
        scenario: String,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = expand_tilde(&cli.config);
    let loaded = PoolConfig::load(&config_path);
    let log_level = match &loaded {
        Ok(config) => config.log_level.clone(),
        Err(_) => PoolConfig::default().log_level,
    };

    // Logs go to stderr so JSON output on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    let mut pool_config = match loaded {
        Ok(config) => {
            tracing::info!("Loaded configuration from {}", config_path);
            config
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            PoolConfig::default()
        }
    };

    // Command-line flags override the config file.
    if let Some(rate) = cli.reward_rate {
        pool_config.reward_rate = rate;
    }
    if let Some(days) = cli.lock_days {
        pool_config.lock_duration_days = days;
    }

    match &cli.command {
        Commands::Params { json } => {
            commands::params::run(&pool_config, OutputFormat::from_json_flag(*json)).await?
        }
        Commands::Simulate { scenario, json } => {
            commands::simulate::run(&pool_config, scenario, OutputFormat::from_json_flag(*json))
                .await?
        }
    }

    Ok(())
}
