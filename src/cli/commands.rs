//! CLI commands for the balances tool
//!
//! Each command loads the block files, runs the pipeline and prints a
//! report to stdout.

use crate::core::{check_node, Blockchain, ConsensusParams, NodeStatus};
use crate::storage::load_blocks;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn load_chain(files: &[PathBuf], params: ConsensusParams) -> CliResult<Blockchain> {
    let blocks = load_blocks(files)?;
    Ok(Blockchain::from_blocks(blocks, params))
}

/// Render balances as `<x coordinate hex> <balance>` lines, sorted by key
pub fn format_balances(blockchain: &Blockchain) -> CliResult<String> {
    let mut out = String::new();
    for (key, balance) in blockchain.balances()?.entries() {
        writeln!(out, "{} {}", key.x_hex(), balance)?;
    }
    Ok(out)
}

/// Print balances of the longest valid chain
pub fn cmd_balances(files: &[PathBuf], params: ConsensusParams, json: bool) -> CliResult<()> {
    let blockchain = load_chain(files, params)?;

    if json {
        let report = blockchain.balances()?.report();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_balances(&blockchain)?);
    }

    Ok(())
}

/// Print the selected chain and forest statistics
pub fn cmd_chain(files: &[PathBuf], params: ConsensusParams) -> CliResult<()> {
    let blockchain = load_chain(files, params)?;

    for node in blockchain.best_chain() {
        println!("{:>6} {}", node.height(), node.hash);
    }

    let stats = blockchain.stats();
    println!();
    println!("Blocks read:      {}", stats.blocks_read);
    println!("Duplicates:       {}", stats.duplicates);
    println!("Orphans:          {}", stats.orphans);
    println!("Rejected genesis: {}", stats.rejected_genesis);
    println!("Valid / invalid:  {} / {}", stats.valid, stats.invalid);
    match (stats.best_height, stats.tip_hash) {
        (Some(height), Some(tip)) => println!("Best chain:       height {} tip {}", height, tip),
        _ => println!("Best chain:       none"),
    }

    Ok(())
}

/// Print every block in the forest with its validation outcome
pub fn cmd_validate(files: &[PathBuf], params: ConsensusParams) -> CliResult<()> {
    let blockchain = load_chain(files, params)?;
    let forest = blockchain.forest();

    for id in forest.ids_by_height() {
        let node = forest.node(id);
        match node.status {
            NodeStatus::Valid => println!("{:>6} {} valid", node.height(), node.hash),
            _ => {
                let reason = check_node(forest, id, blockchain.params())
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                println!("{:>6} {} invalid: {}", node.height(), node.hash, reason);
            }
        }
    }
    for hash in &forest.orphans {
        println!("     - {} orphan", hash);
    }
    for hash in &forest.rejected_genesis {
        println!("     0 {} invalid: not the genesis block", hash);
    }

    Ok(())
}
