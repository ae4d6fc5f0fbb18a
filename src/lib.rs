//! Chain-Balances: longest-valid-chain balance reports from loose block files
//!
//! This crate provides:
//! - SHA-256 block and transaction hashing with a fixed proof-of-work target
//! - ECDSA signatures (secp256k1) over transaction contents
//! - A forest of candidate chains with orphan isolation
//! - Consensus validation (linkage, work, rewards, spends, double-spends)
//! - Deterministic best-chain selection and balance replay
//!
//! # Example
//!
//! ```rust,no_run
//! use chain_balances::core::{Blockchain, ConsensusParams};
//! use chain_balances::storage::load_blocks;
//!
//! let blocks = load_blocks(&["0.blk", "1.blk"]).unwrap();
//! let blockchain = Blockchain::from_blocks(blocks, ConsensusParams::default());
//!
//! for (key, balance) in blockchain.balances().unwrap().entries() {
//!     println!("{} {}", key.x_hex(), balance);
//! }
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use crate::core::{
    BalanceTable, Block, Blockchain, ChainForest, ConsensusParams, NodeStatus, Transaction,
    GENESIS_BLOCK_HASH, TARGET_HASH,
};
pub use crate::crypto::{Hash256, KeyPair, PublicKey, Signature};
pub use crate::storage::{load_blocks, StorageError};
