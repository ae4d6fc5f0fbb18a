//! Balances CLI Application
//!
//! Reads a set of block files, picks the longest valid chain and prints
//! the balance of every key on it.

use chain_balances::cli;
use chain_balances::core::ConsensusParams;
use chain_balances::crypto::Hash256;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "balances")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Balances of the longest valid chain in a set of block files", long_about = None)]
struct Cli {
    /// Required hash of the genesis block (hex)
    #[arg(long, global = true)]
    genesis_hash: Option<Hash256>,

    /// Proof-of-work target every block hash must be below (hex)
    #[arg(long, global = true)]
    target: Option<Hash256>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BlockFiles {
    /// Block files to read
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the balance of every key on the longest valid chain
    Balances {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        input: BlockFiles,
    },

    /// Display the selected chain and forest statistics
    Chain {
        #[command(flatten)]
        input: BlockFiles,
    },

    /// Show the validation outcome of every block
    Validate {
        #[command(flatten)]
        input: BlockFiles,
    },
}

impl Cli {
    fn params(&self) -> ConsensusParams {
        let defaults = ConsensusParams::default();
        ConsensusParams {
            genesis_hash: self.genesis_hash.unwrap_or(defaults.genesis_hash),
            target: self.target.unwrap_or(defaults.target),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = cli.params();

    match cli.command {
        Commands::Balances { json, input } => cli::cmd_balances(&input.files, params, json)?,
        Commands::Chain { input } => cli::cmd_chain(&input.files, params)?,
        Commands::Validate { input } => cli::cmd_validate(&input.files, params)?,
    }

    Ok(())
}
