//! Transaction handling for the blockchain
//!
//! Every block carries exactly two transactions:
//! - a reward transaction that mints one coin to its destination key
//! - a normal transaction that moves the coin of an earlier transaction,
//!   or carries a zero input reference when the block spends nothing

use crate::crypto::{sha256, verify_signature, Hash256, KeyPair, PublicKey, Signature};
use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Size of the signed part of an encoded transaction
pub const TX_CONTENTS_SIZE: usize = 4 + 32 + 64;

/// Size of a fully encoded transaction (contents + signature)
pub const TX_ENCODED_SIZE: usize = TX_CONTENTS_SIZE + 64;

// =============================================================================
// Transaction
// =============================================================================

/// A single transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Height of the block that contains this transaction
    pub height: u32,
    /// Hash of the transaction whose coin is spent, zero for none
    pub prev_transaction_hash: Hash256,
    /// Key that receives the coin
    pub dest_pubkey: PublicKey,
    /// Signature by the spender (or by the creator, for a reward)
    pub src_signature: Signature,
}

impl Transaction {
    /// Create an unsigned reward transaction
    pub fn reward(height: u32, dest_pubkey: PublicKey) -> Self {
        Self {
            height,
            dest_pubkey,
            ..Default::default()
        }
    }

    /// Create an unsigned transaction spending `prev_transaction_hash`
    pub fn spend(height: u32, prev_transaction_hash: Hash256, dest_pubkey: PublicKey) -> Self {
        Self {
            height,
            prev_transaction_hash,
            dest_pubkey,
            src_signature: Signature::default(),
        }
    }

    /// The placeholder normal transaction of a block that spends nothing
    pub fn empty(height: u32) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }

    /// True when this transaction references an earlier one
    pub fn has_input(&self) -> bool {
        !self.prev_transaction_hash.is_zero()
    }

    /// Bytes covered by the signature (everything except the signature)
    pub fn contents(&self) -> [u8; TX_CONTENTS_SIZE] {
        let mut buf = [0u8; TX_CONTENTS_SIZE];
        buf[..4].copy_from_slice(&self.height.to_be_bytes());
        buf[4..36].copy_from_slice(self.prev_transaction_hash.as_bytes());
        buf[36..68].copy_from_slice(&self.dest_pubkey.x);
        buf[68..100].copy_from_slice(&self.dest_pubkey.y);
        buf
    }

    /// Canonical encoding of the whole transaction
    pub fn encode(&self) -> [u8; TX_ENCODED_SIZE] {
        let mut buf = [0u8; TX_ENCODED_SIZE];
        buf[..TX_CONTENTS_SIZE].copy_from_slice(&self.contents());
        buf[100..132].copy_from_slice(&self.src_signature.r);
        buf[132..164].copy_from_slice(&self.src_signature.s);
        buf
    }

    /// Decode a transaction from exactly `TX_ENCODED_SIZE` bytes
    pub fn decode(bytes: &[u8; TX_ENCODED_SIZE]) -> Self {
        let mut height = [0u8; 4];
        height.copy_from_slice(&bytes[..4]);

        let mut prev = [0u8; 32];
        prev.copy_from_slice(&bytes[4..36]);

        let mut dest_pubkey = PublicKey::default();
        dest_pubkey.x.copy_from_slice(&bytes[36..68]);
        dest_pubkey.y.copy_from_slice(&bytes[68..100]);

        let mut src_signature = Signature::default();
        src_signature.r.copy_from_slice(&bytes[100..132]);
        src_signature.s.copy_from_slice(&bytes[132..164]);

        Self {
            height: u32::from_be_bytes(height),
            prev_transaction_hash: Hash256(prev),
            dest_pubkey,
            src_signature,
        }
    }

    /// Hash identifying this transaction
    pub fn hash(&self) -> Hash256 {
        sha256(&self.encode())
    }

    /// Digest that gets signed
    pub fn signing_digest(&self) -> Hash256 {
        sha256(&self.contents())
    }

    /// Sign the transaction with the given key pair
    pub fn sign(&mut self, key_pair: &KeyPair) {
        self.src_signature = key_pair.sign(&self.signing_digest());
    }

    /// Verify the signature.
    ///
    /// A spend must be signed by the destination of the transaction it
    /// spends; without a previous transaction the signer is the
    /// transaction's own destination.
    pub fn verify(&self, prev: Option<&Transaction>) -> bool {
        let signer = prev.map_or(&self.dest_pubkey, |p| &p.dest_pubkey);
        verify_signature(signer, &self.signing_digest(), &self.src_signature)
    }
}
