//! Cryptographic utilities for the blockchain
//!
//! This module provides:
//! - SHA-256 hashing and the proof-of-work comparison
//! - ECDSA signing and verification (secp256k1)

pub mod hash;
pub mod keys;

pub use hash::{meets_target, sha256, Hash256, HashParseError, HASH_SIZE};
pub use keys::{verify_signature, KeyError, KeyPair, PublicKey, Signature};
