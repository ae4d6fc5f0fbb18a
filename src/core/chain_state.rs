//! Chain State Management
//!
//! Links loose blocks into a forest by previous-block hash, isolates
//! orphans, and selects the best chain once validation has run.
//!
//! Nodes live in an arena and refer to their parent by `NodeId`, so a
//! parent link can never dangle.

use crate::core::block::Block;
use crate::crypto::Hash256;
use std::collections::{HashMap, HashSet, VecDeque};

/// Index of a node inside a `ChainForest`
pub type NodeId = usize;

/// Validation state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    /// Not yet validated
    #[default]
    Unknown,
    /// Passed every consensus rule
    Valid,
    /// Failed a consensus rule, or descends from a node that did
    Invalid,
}

/// A block together with its place in the forest
#[derive(Debug, Clone)]
pub struct ChainNode {
    pub block: Block,
    /// Computed hash of `block`
    pub hash: Hash256,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub status: NodeStatus,
}

impl ChainNode {
    fn new(block: Block, hash: Hash256) -> Self {
        Self {
            block,
            hash,
            parent: None,
            children: Vec::new(),
            status: NodeStatus::Unknown,
        }
    }

    pub fn height(&self) -> u32 {
        self.block.height
    }

    pub fn is_valid(&self) -> bool {
        self.status == NodeStatus::Valid
    }
}

/// The tree of candidate chains rooted at the genesis block.
///
/// Only blocks reachable from genesis are kept; everything else is
/// recorded by hash and never validated.
#[derive(Debug, Clone, Default)]
pub struct ChainForest {
    nodes: Vec<ChainNode>,
    by_hash: HashMap<Hash256, NodeId>,
    /// Blocks whose ancestry does not reach genesis
    pub orphans: Vec<Hash256>,
    /// Height-0 blocks that are not the genesis block
    pub rejected_genesis: Vec<Hash256>,
    /// Number of input blocks dropped as exact duplicates
    pub duplicates: usize,
}

impl ChainForest {
    /// Link a set of blocks into a forest rooted at the block hashing to
    /// `genesis_hash`.
    ///
    /// Input order does not matter: the hash index is complete before any
    /// parent is resolved, so every ancestry is found in one pass.
    pub fn build(blocks: Vec<Block>, genesis_hash: &Hash256) -> Self {
        let mut forest = ChainForest::default();

        // Deduplicate by hash, then order by hash so the arena layout does
        // not depend on input order.
        let mut unique: HashMap<Hash256, Block> = HashMap::with_capacity(blocks.len());
        for block in blocks {
            let hash = block.hash();
            if unique.insert(hash, block).is_some() {
                forest.duplicates += 1;
            }
        }
        let mut unique: Vec<(Hash256, Block)> = unique.into_iter().collect();
        unique.sort_by_key(|entry| entry.0);

        // parent hash -> child hashes
        let mut children_of: HashMap<Hash256, Vec<Hash256>> = HashMap::new();
        let mut genesis: Option<(Hash256, Block)> = None;
        let mut pending: HashMap<Hash256, Block> = HashMap::new();

        for (hash, block) in unique {
            if block.height == 0 {
                if block.prev_block_hash.is_zero() && hash == *genesis_hash {
                    genesis = Some((hash, block));
                } else {
                    log::debug!("Rejecting height-0 block {}: not the genesis block", hash);
                    forest.rejected_genesis.push(hash);
                }
                continue;
            }
            children_of
                .entry(block.prev_block_hash)
                .or_default()
                .push(hash);
            pending.insert(hash, block);
        }

        if let Some((hash, block)) = genesis {
            forest.push(ChainNode::new(block, hash));

            // Breadth-first from genesis; the visited set keeps a
            // self-referencing block out.
            let mut queue = VecDeque::from([0usize]);
            let mut visited: HashSet<Hash256> = HashSet::from([hash]);
            while let Some(parent_id) = queue.pop_front() {
                let parent_hash = forest.nodes[parent_id].hash;
                let Some(child_hashes) = children_of.get(&parent_hash) else {
                    continue;
                };
                for child_hash in child_hashes {
                    if !visited.insert(*child_hash) {
                        continue;
                    }
                    let Some(block) = pending.remove(child_hash) else {
                        continue;
                    };
                    let mut node = ChainNode::new(block, *child_hash);
                    node.parent = Some(parent_id);
                    let id = forest.push(node);
                    forest.nodes[parent_id].children.push(id);
                    queue.push_back(id);
                }
            }
        } else {
            log::warn!("No genesis block found among the input blocks");
        }

        forest.orphans = pending.into_keys().collect();
        forest.orphans.sort();
        for orphan in &forest.orphans {
            log::debug!("Dropping orphan block {}", orphan);
        }

        forest
    }

    fn push(&mut self, node: ChainNode) -> NodeId {
        let id = self.nodes.len();
        self.by_hash.insert(node.hash, id);
        self.nodes.push(node);
        id
    }

    /// The genesis node, if one was found
    pub fn genesis(&self) -> Option<&ChainNode> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ChainNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    pub fn get_by_hash(&self, hash: &Hash256) -> Option<NodeId> {
        self.by_hash.get(hash).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<&ChainNode> {
        self.nodes[id].parent.map(|p| &self.nodes[p])
    }

    pub(crate) fn set_status(&mut self, id: NodeId, status: NodeStatus) {
        self.nodes[id].status = status;
    }

    /// Node ids from `id` up to genesis, starting with `id` itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            forest: self,
            next: Some(id),
        }
    }

    /// Node ids in non-decreasing height order, ties by hash
    pub fn ids_by_height(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (0..self.nodes.len()).collect();
        ids.sort_by_key(|id| (self.nodes[*id].height(), self.nodes[*id].hash));
        ids
    }

    pub fn count_with_status(&self, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|n| n.status == status).count()
    }

    /// Pick the tip of the best chain: the valid node with the greatest
    /// height, ties going to the lowest block hash.
    pub fn best_tip(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_valid())
            .min_by(|(_, a), (_, b)| b.height().cmp(&a.height()).then(a.hash.cmp(&b.hash)))
            .map(|(id, _)| id)
    }

    /// The best chain from genesis to its tip, ascending by height.
    ///
    /// Empty when not even the genesis node is valid.
    pub fn select_best_chain(&self) -> Vec<NodeId> {
        let Some(tip) = self.best_tip() else {
            return Vec::new();
        };
        let mut chain: Vec<NodeId> = self.ancestors(tip).collect();
        chain.reverse();
        chain
    }
}

/// Iterator walking parent links up to genesis
pub struct Ancestors<'a> {
    forest: &'a ChainForest,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.forest.nodes[id].parent;
        Some(id)
    }
}
