//! Helpers for building small chains in tests.
//!
//! Blocks are mined against an easy target and the genesis hash is
//! whatever the generated genesis block hashes to.

use crate::core::{Block, ConsensusParams, Transaction};
use crate::crypto::{meets_target, Hash256, KeyPair, PublicKey};
use std::cell::Cell;

/// Roughly one nonce in sixteen meets this target
pub const TEST_TARGET: Hash256 = Hash256([
    0x0f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
]);

/// Nonce search for each new block starts this far past the previous one,
/// so two otherwise identical siblings still get different nonces.
const NONCE_STRIDE: u32 = 1 << 16;

pub struct TestChain {
    pub params: ConsensusParams,
    pub genesis_key: KeyPair,
    genesis: Block,
    next_nonce: Cell<u32>,
}

impl TestChain {
    pub fn new() -> Self {
        let genesis_key = KeyPair::generate();
        let mut genesis = Block::new(0, Hash256::ZERO, signed_reward(0, &genesis_key));
        mine_block(&mut genesis, 0, &TEST_TARGET);

        Self {
            params: ConsensusParams {
                genesis_hash: genesis.hash(),
                target: TEST_TARGET,
            },
            genesis_key,
            genesis,
            next_nonce: Cell::new(NONCE_STRIDE),
        }
    }

    pub fn genesis(&self) -> Block {
        self.genesis.clone()
    }

    /// Find a nonce that meets the test target
    pub fn mine(&self, block: &mut Block) {
        let start = self.next_nonce.get();
        self.next_nonce.set(start.wrapping_add(NONCE_STRIDE));
        mine_block(block, start, &self.params.target);
    }

    /// A valid child of `parent` rewarding a fresh key
    pub fn extend(&self, parent: &Block) -> Block {
        self.block_at(parent, parent.height + 1, &KeyPair::generate(), None)
    }

    /// A mined child of `parent` at any height
    pub fn block_at(
        &self,
        parent: &Block,
        height: u32,
        reward_key: &KeyPair,
        normal_tx: Option<Transaction>,
    ) -> Block {
        self.block_at_hash(&parent.hash(), height, reward_key, normal_tx)
    }

    /// A mined block claiming `prev_block_hash` as its parent
    pub fn block_at_hash(
        &self,
        prev_block_hash: &Hash256,
        height: u32,
        reward_key: &KeyPair,
        normal_tx: Option<Transaction>,
    ) -> Block {
        let mut block = Block::new(height, *prev_block_hash, signed_reward(height, reward_key));
        if let Some(tx) = normal_tx {
            block.normal_tx = tx;
        }
        self.mine(&mut block);
        block
    }

    /// A spend of `prev` signed by `signer`
    pub fn spend_tx(
        &self,
        height: u32,
        prev: &Transaction,
        signer: &KeyPair,
        dest: PublicKey,
    ) -> Transaction {
        let mut tx = Transaction::spend(height, prev.hash(), dest);
        tx.sign(signer);
        tx
    }

    /// A well-formed height-0 block that is not the genesis block
    pub fn mine_genesis_like(&self) -> Block {
        self.block_at_hash(&Hash256::ZERO, 0, &KeyPair::generate(), None)
    }
}

fn signed_reward(height: u32, key: &KeyPair) -> Transaction {
    let mut reward = Transaction::reward(height, key.public_key());
    reward.sign(key);
    reward
}

fn mine_block(block: &mut Block, start: u32, target: &Hash256) {
    block.nonce = start;
    while !meets_target(&block.hash(), target) {
        block.nonce = block.nonce.wrapping_add(1);
    }
}
