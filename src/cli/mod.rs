//! Command-line interface

pub mod commands;

pub use commands::{cmd_balances, cmd_chain, cmd_validate, format_balances, CliResult};
