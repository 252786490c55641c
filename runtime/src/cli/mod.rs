//! CLI subcommand implementations for the `kaveri` binary.

pub mod creds_cmd;
pub mod output;
pub mod run_cmd;
