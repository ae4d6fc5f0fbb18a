//! Core blockchain components
//!
//! This module contains the fundamental building blocks:
//! - Transactions and blocks with their canonical encodings
//! - Chain state (forest of candidate chains, orphans, best-chain selection)
//! - Consensus rules
//! - Balance ledger
//! - Blockchain (the pipeline tying them together)

pub mod block;
pub mod blockchain;
pub mod chain_state;
pub mod consensus;
pub mod ledger;
pub mod transaction;

pub use block::{Block, BlockError, BLOCK_ENCODED_SIZE, BLOCK_HEADER_SIZE};
pub use blockchain::{Blockchain, ChainStats};
pub use chain_state::{ChainForest, ChainNode, NodeId, NodeStatus};
pub use consensus::{
    check_node, validate_forest, ConsensusError, ConsensusParams, GENESIS_BLOCK_HASH, TARGET_HASH,
};
pub use ledger::{BalanceEntry, BalanceTable, LedgerError};
pub use transaction::{Transaction, TX_CONTENTS_SIZE, TX_ENCODED_SIZE};
