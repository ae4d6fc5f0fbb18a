//! Consensus rules
//!
//! Flags every node of a `ChainForest` valid or invalid. Nodes are visited
//! in non-decreasing height order, so a node's parent has always been
//! decided before the node itself. A failed rule is never surfaced as an
//! error to the caller: it is logged and recorded as `NodeStatus::Invalid`.

use crate::core::chain_state::{ChainForest, NodeId, NodeStatus};
use crate::core::transaction::Transaction;
use crate::crypto::{meets_target, Hash256};
use thiserror::Error;

/// Hash every genesis block must have
pub const GENESIS_BLOCK_HASH: Hash256 = Hash256([
    0x00, 0x00, 0x00, 0x0e, 0x5a, 0xc9, 0x8c, 0x78, 0x98, 0x00, 0x70, 0x2a, 0xd2, 0xa6, 0xf3, 0xca,
    0x51, 0x0d, 0x40, 0x9d, 0x6c, 0xca, 0x89, 0x2e, 0xd1, 0xc7, 0x51, 0x98, 0xe0, 0x4b, 0xde, 0xec,
]);

/// Every block hash must be strictly below this value
pub const TARGET_HASH: Hash256 = Hash256([
    0x00, 0x00, 0x00, 0x1f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
]);

/// The two protocol constants a chain is validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusParams {
    pub genesis_hash: Hash256,
    pub target: Hash256,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            genesis_hash: GENESIS_BLOCK_HASH,
            target: TARGET_HASH,
        }
    }
}

/// The rule a block broke
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Height-0 block is not the genesis block")]
    NotGenesis,
    #[error("Block has no parent")]
    MissingParent,
    #[error("Parent block is not valid")]
    InvalidParent,
    #[error("Height {height} does not follow parent height {parent_height}")]
    HeightMismatch { height: u32, parent_height: u32 },
    #[error("Block hash {0} does not meet the target")]
    InsufficientWork(Hash256),
    #[error("{kind} transaction height {tx_height} differs from block height {height}")]
    TransactionHeight {
        kind: &'static str,
        tx_height: u32,
        height: u32,
    },
    #[error("Reward transaction references an input")]
    RewardHasInput,
    #[error("Reward transaction is unsigned")]
    RewardUnsigned,
    #[error("Reward transaction signature does not verify")]
    RewardSignature,
    #[error("Input {0} is not an output of this chain")]
    UnknownInput(Hash256),
    #[error("Input {0} matches more than one transaction")]
    AmbiguousInput(Hash256),
    #[error("Spend signature does not verify against the previous recipient")]
    SpendSignature,
    #[error("Input {0} was already spent by an ancestor")]
    DoubleSpend(Hash256),
}

/// Validate every node of the forest in place
pub fn validate_forest(forest: &mut ChainForest, params: &ConsensusParams) {
    for id in forest.ids_by_height() {
        let status = match check_node(forest, id, params) {
            Ok(()) => NodeStatus::Valid,
            Err(e) => {
                let node = forest.node(id);
                log::debug!("Block {} at height {} is invalid: {}", node.hash, node.height(), e);
                NodeStatus::Invalid
            }
        };
        forest.set_status(id, status);
    }

    log::info!(
        "Validated {} blocks: {} valid, {} invalid",
        forest.len(),
        forest.count_with_status(NodeStatus::Valid),
        forest.count_with_status(NodeStatus::Invalid)
    );
}

/// Check one node against every consensus rule.
///
/// The parent must already carry its final status.
pub fn check_node(
    forest: &ChainForest,
    id: NodeId,
    params: &ConsensusParams,
) -> Result<(), ConsensusError> {
    let node = forest.node(id);
    let block = &node.block;

    // Linkage
    if block.height == 0 {
        if node.hash != params.genesis_hash || !block.prev_block_hash.is_zero() {
            return Err(ConsensusError::NotGenesis);
        }
    } else {
        let parent = forest.parent(id).ok_or(ConsensusError::MissingParent)?;
        if Some(block.height) != parent.height().checked_add(1) {
            return Err(ConsensusError::HeightMismatch {
                height: block.height,
                parent_height: parent.height(),
            });
        }
        if !parent.is_valid() {
            return Err(ConsensusError::InvalidParent);
        }
    }

    // Proof of work
    if !meets_target(&node.hash, &params.target) {
        return Err(ConsensusError::InsufficientWork(node.hash));
    }

    // Transaction heights
    for (kind, tx) in [("Reward", &block.reward_tx), ("Normal", &block.normal_tx)] {
        if tx.height != block.height {
            return Err(ConsensusError::TransactionHeight {
                kind,
                tx_height: tx.height,
                height: block.height,
            });
        }
    }

    // Reward
    let reward = &block.reward_tx;
    if reward.has_input() {
        return Err(ConsensusError::RewardHasInput);
    }
    if reward.src_signature.is_zero() {
        return Err(ConsensusError::RewardUnsigned);
    }
    if !reward.verify(None) {
        return Err(ConsensusError::RewardSignature);
    }

    // Spend
    let spend = &block.normal_tx;
    if spend.has_input() {
        let input = spend.prev_transaction_hash;
        let prev = find_output(forest, id, &input)?;
        if !spend.verify(Some(&prev)) {
            return Err(ConsensusError::SpendSignature);
        }
        if is_spent_by_ancestor(forest, id, &input) {
            return Err(ConsensusError::DoubleSpend(input));
        }
    }

    Ok(())
}

/// Find the single output hashing to `input` in the chain ending at `id`,
/// the block at `id` included.
///
/// Every reward is an output; a normal transaction is one only when it
/// moved a coin itself.
fn find_output(
    forest: &ChainForest,
    id: NodeId,
    input: &Hash256,
) -> Result<Transaction, ConsensusError> {
    let mut found: Option<Transaction> = None;
    for ancestor in forest.ancestors(id) {
        let block = &forest.node(ancestor).block;
        let candidates = [
            Some(&block.reward_tx),
            Some(&block.normal_tx).filter(|tx| tx.has_input()),
        ];
        for tx in candidates.into_iter().flatten() {
            if tx.hash() == *input {
                if found.is_some() {
                    return Err(ConsensusError::AmbiguousInput(*input));
                }
                found = Some(*tx);
            }
        }
    }
    found.ok_or(ConsensusError::UnknownInput(*input))
}

/// True when a block strictly above `id` already spends `input`
fn is_spent_by_ancestor(forest: &ChainForest, id: NodeId, input: &Hash256) -> bool {
    forest
        .ancestors(id)
        .skip(1)
        .any(|ancestor| forest.node(ancestor).block.normal_tx.prev_transaction_hash == *input)
}
