//! Block implementation for the blockchain
//!
//! A block links to its parent by hash and carries one reward transaction
//! and one (possibly empty) normal transaction. Its own hash is always
//! computed from the encoding, never stored.

use crate::core::transaction::{Transaction, TX_ENCODED_SIZE};
use crate::crypto::{sha256, Hash256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Block Constants
// =============================================================================

/// Size of the header part: height, previous hash, nonce
pub const BLOCK_HEADER_SIZE: usize = 4 + 32 + 4;

/// Size of an encoded block
pub const BLOCK_ENCODED_SIZE: usize = BLOCK_HEADER_SIZE + 2 * TX_ENCODED_SIZE;

// =============================================================================
// Block Errors
// =============================================================================

/// Block decoding errors
#[derive(Error, Debug, PartialEq)]
pub enum BlockError {
    #[error("Invalid block size: {0} bytes (expected: {1})")]
    InvalidSize(usize, usize),
}

/// A block record as read from a block file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height, 0 for genesis
    pub height: u32,
    /// Hash of the parent block, zero for genesis
    pub prev_block_hash: Hash256,
    /// Nonce used for proof of work
    pub nonce: u32,
    /// Coin-minting transaction
    pub reward_tx: Transaction,
    /// Coin-moving transaction, empty when the block spends nothing
    pub normal_tx: Transaction,
}

impl Block {
    /// Create a block without a spend
    pub fn new(height: u32, prev_block_hash: Hash256, reward_tx: Transaction) -> Self {
        Self {
            height,
            prev_block_hash,
            nonce: 0,
            reward_tx,
            normal_tx: Transaction::empty(height),
        }
    }

    /// Canonical byte encoding
    pub fn encode(&self) -> [u8; BLOCK_ENCODED_SIZE] {
        let mut buf = [0u8; BLOCK_ENCODED_SIZE];
        buf[..4].copy_from_slice(&self.height.to_be_bytes());
        buf[4..36].copy_from_slice(self.prev_block_hash.as_bytes());
        buf[36..40].copy_from_slice(&self.nonce.to_be_bytes());

        let reward_end = BLOCK_HEADER_SIZE + TX_ENCODED_SIZE;
        buf[BLOCK_HEADER_SIZE..reward_end].copy_from_slice(&self.reward_tx.encode());
        buf[reward_end..].copy_from_slice(&self.normal_tx.encode());
        buf
    }

    /// Decode a block, rejecting anything that is not exactly one block long
    pub fn decode(bytes: &[u8]) -> Result<Self, BlockError> {
        let bytes: &[u8; BLOCK_ENCODED_SIZE] = bytes
            .try_into()
            .map_err(|_| BlockError::InvalidSize(bytes.len(), BLOCK_ENCODED_SIZE))?;

        let mut height = [0u8; 4];
        height.copy_from_slice(&bytes[..4]);
        let mut prev = [0u8; 32];
        prev.copy_from_slice(&bytes[4..36]);
        let mut nonce = [0u8; 4];
        nonce.copy_from_slice(&bytes[36..40]);

        let reward_end = BLOCK_HEADER_SIZE + TX_ENCODED_SIZE;
        let mut reward = [0u8; TX_ENCODED_SIZE];
        reward.copy_from_slice(&bytes[BLOCK_HEADER_SIZE..reward_end]);
        let mut normal = [0u8; TX_ENCODED_SIZE];
        normal.copy_from_slice(&bytes[reward_end..]);

        Ok(Self {
            height: u32::from_be_bytes(height),
            prev_block_hash: Hash256(prev),
            nonce: u32::from_be_bytes(nonce),
            reward_tx: Transaction::decode(&reward),
            normal_tx: Transaction::decode(&normal),
        })
    }

    /// Calculate the hash of the block
    pub fn hash(&self) -> Hash256 {
        sha256(&self.encode())
    }

    /// True when the normal transaction moves an existing coin
    pub fn has_spend(&self) -> bool {
        self.normal_tx.has_input()
    }

    /// Both transactions, reward first
    pub fn transactions(&self) -> [&Transaction; 2] {
        [&self.reward_tx, &self.normal_tx]
    }
}
