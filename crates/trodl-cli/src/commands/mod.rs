// crates/trodl-cli/src/commands/mod.rs
//
// Command module declarations for the trodl CLI.

pub mod params;
pub mod simulate;
