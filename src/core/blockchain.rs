//! Blockchain implementation
//!
//! Runs the whole pipeline over a set of loose blocks: link them into a
//! forest, validate every node, select the longest valid chain and replay
//! it into balances.

use crate::core::block::Block;
use crate::core::chain_state::{ChainForest, ChainNode, NodeId, NodeStatus};
use crate::core::consensus::{validate_forest, ConsensusParams};
use crate::core::ledger::{BalanceTable, LedgerError};
use crate::crypto::Hash256;

/// The validated forest and the chain selected from it
#[derive(Debug, Clone)]
pub struct Blockchain {
    forest: ChainForest,
    best_chain: Vec<NodeId>,
    params: ConsensusParams,
    blocks_read: usize,
}

impl Blockchain {
    /// Build, validate and select from the given blocks
    pub fn from_blocks(blocks: Vec<Block>, params: ConsensusParams) -> Self {
        let blocks_read = blocks.len();
        let mut forest = ChainForest::build(blocks, &params.genesis_hash);
        validate_forest(&mut forest, &params);
        let best_chain = forest.select_best_chain();

        match best_chain.last() {
            Some(tip) => log::info!(
                "Selected chain of height {} ending at {}",
                forest.node(*tip).height(),
                forest.node(*tip).hash
            ),
            None => log::warn!("No valid chain: genesis block missing or invalid"),
        }

        Self {
            forest,
            best_chain,
            params,
            blocks_read,
        }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn forest(&self) -> &ChainForest {
        &self.forest
    }

    /// Nodes of the selected chain, genesis first
    pub fn best_chain(&self) -> impl Iterator<Item = &ChainNode> + '_ {
        self.best_chain.iter().map(|id| self.forest.node(*id))
    }

    /// Height of the selected tip, `None` when there is no valid chain
    pub fn best_height(&self) -> Option<u32> {
        self.best_chain
            .last()
            .map(|id| self.forest.node(*id).height())
    }

    /// Balances after replaying the selected chain
    pub fn balances(&self) -> Result<BalanceTable, LedgerError> {
        BalanceTable::replay(self.best_chain().map(|node| &node.block))
    }

    /// Get chain statistics
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            blocks_read: self.blocks_read,
            duplicates: self.forest.duplicates,
            orphans: self.forest.orphans.len(),
            rejected_genesis: self.forest.rejected_genesis.len(),
            valid: self.forest.count_with_status(NodeStatus::Valid),
            invalid: self.forest.count_with_status(NodeStatus::Invalid),
            best_height: self.best_height(),
            tip_hash: self.best_chain.last().map(|id| self.forest.node(*id).hash),
        }
    }
}

/// Chain statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    pub blocks_read: usize,
    pub duplicates: usize,
    pub orphans: usize,
    pub rejected_genesis: usize,
    pub valid: usize,
    pub invalid: usize,
    pub best_height: Option<u32>,
    pub tip_hash: Option<Hash256>,
}
