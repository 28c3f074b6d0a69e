// crates/trodl-cli/src/output.rs
//
// Output formatting utilities for the trodl CLI.
// Supports table and JSON output modes.

use chrono::DateTime;
use serde::Serialize;
use tabled::{Table, Tabled};

use trodl_core::{Amount, Timestamp};
use trodl_staking::Tro;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render a wei amount as TRO.
pub fn format_tro(amount: Amount) -> String {
    Tro::from_wei(amount).to_string()
}

/// Render a Unix timestamp as RFC 3339 (UTC), falling back to raw seconds.
pub fn format_time(at: Timestamp) -> String {
    i64::try_from(at)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| at.to_string())
}
