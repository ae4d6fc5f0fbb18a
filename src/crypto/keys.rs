//! ECDSA key management for the blockchain
//!
//! Provides the fixed-size public key and signature records carried in
//! transactions, plus signing and verification on the secp256k1 curve.

use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature as EcdsaSignature;
use secp256k1::{Message, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::hash::Hash256;

/// Tag byte of an uncompressed SEC1 point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// An elliptic curve point stored as its two 32-byte affine coordinates.
///
/// Equality and ordering are over the raw bytes, x first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct PublicKey {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl PublicKey {
    /// Hex of the x coordinate, which is how keys are shown in reports
    pub fn x_hex(&self) -> String {
        hex::encode(self.x)
    }

    pub fn y_hex(&self) -> String {
        hex::encode(self.y)
    }

    fn to_secp(self) -> Result<secp256k1::PublicKey, KeyError> {
        let mut bytes = [0u8; 65];
        bytes[0] = UNCOMPRESSED_TAG;
        bytes[1..33].copy_from_slice(&self.x);
        bytes[33..].copy_from_slice(&self.y);
        Ok(secp256k1::PublicKey::from_slice(&bytes)?)
    }

    fn from_secp(key: &secp256k1::PublicKey) -> Self {
        let bytes = key.serialize_uncompressed();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[1..33]);
        y.copy_from_slice(&bytes[33..]);
        Self { x, y }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.x_hex())
    }
}

/// An ECDSA signature as its (r, s) pair of 32-byte big-endian integers
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    /// A signature with both components zero means "unsigned"
    pub fn is_zero(&self) -> bool {
        self.r.iter().chain(self.s.iter()).all(|b| *b == 0)
    }

    fn to_compact(self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        bytes
    }

    fn from_compact(bytes: &[u8; 64]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self { r, s }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(r={}, s={})", hex::encode(self.r), hex::encode(self.s))
    }
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, _) = secp.generate_keypair(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key: PublicKey::from_secp(&public_key),
        }
    }

    /// Create a key pair from raw secret key bytes
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Sign a 32-byte digest
    pub fn sign(&self, digest: &Hash256) -> Signature {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(*digest.as_bytes());
        let signature = secp.sign_ecdsa(&message, &self.secret_key);
        Signature::from_compact(&signature.serialize_compact())
    }
}

/// Verify a signature over a 32-byte digest.
///
/// Keys that are not on the curve and malformed signatures verify as
/// `false`. High-S signatures are normalised first, since other ECDSA
/// implementations do not enforce low-S.
pub fn verify_signature(public_key: &PublicKey, digest: &Hash256, signature: &Signature) -> bool {
    let key = match public_key.to_secp() {
        Ok(key) => key,
        Err(e) => {
            log::trace!("Rejecting public key {}: {}", public_key.x_hex(), e);
            return false;
        }
    };

    let mut sig = match EcdsaSignature::from_compact(&signature.to_compact()) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    sig.normalize_s();

    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*digest.as_bytes());
    secp.verify_ecdsa(&message, &sig, &key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::generate();
        let digest = sha256(b"Hello, blockchain!");

        let signature = kp.sign(&digest);
        assert!(!signature.is_zero());
        assert!(verify_signature(&kp.public_key(), &digest, &signature));
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        let digest = sha256(b"payload");

        let signature = kp1.sign(&digest);
        assert!(!verify_signature(&kp2.public_key(), &digest, &signature));
    }

    #[test]
    fn test_verify_rejects_other_message() {
        let kp = KeyPair::generate();
        let signature = kp.sign(&sha256(b"one"));
        assert!(!verify_signature(&kp.public_key(), &sha256(b"two"), &signature));
    }

    #[test]
    fn test_off_curve_key_and_zero_signature_do_not_verify() {
        let digest = sha256(b"payload");
        let kp = KeyPair::generate();
        let signature = kp.sign(&digest);

        assert!(!verify_signature(&PublicKey::default(), &digest, &signature));
        assert!(!verify_signature(
            &kp.public_key(),
            &digest,
            &Signature::default()
        ));
    }

    #[test]
    fn test_key_pair_from_secret_bytes() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::from_secret_bytes(&kp1.secret_key.secret_bytes()).unwrap();
        assert_eq!(kp1.public_key(), kp2.public_key());

        assert!(KeyPair::from_secret_bytes(&[0u8; 32]).is_err());
    }
}
