//! Hashing capability for contract execution.
//!
//! Code hashes, CREATE address derivation, and table identities all depend
//! on one hash function. The function is chosen once per executor through
//! [`HashAlgorithm`] and handed to every host as a [`Hasher`] value; nothing
//! in the execution path reaches for a process-wide hash instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::Hash;

/// A 32-byte hash function.
pub trait Hasher: Send + Sync {
    /// Hash `data` into a 32-byte digest.
    fn hash(&self, data: &[u8]) -> Hash;

    /// The algorithm implemented by this hasher.
    fn algorithm(&self) -> HashAlgorithm;
}

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Keccak256,
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    /// Create a shareable hasher for this algorithm.
    pub fn hasher(self) -> Arc<dyn Hasher> {
        match self {
            Self::Keccak256 => Arc::new(Keccak256Hasher),
            Self::Sha256 => Arc::new(Sha256Hasher),
            Self::Blake3 => Arc::new(Blake3Hasher),
        }
    }
}

/// Keccak-256 (pre-standard SHA-3 padding), the EVM code hash function.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        hash_keccak256(data)
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Keccak256
    }
}

/// SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        hash_sha256(data)
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

/// BLAKE3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        hash_blake3(data)
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake3
    }
}

/// Compute the Keccak-256 hash of the input data.
pub fn hash_keccak256(data: &[u8]) -> Hash {
    use sha3::Digest;
    let result = sha3::Keccak256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute the SHA-256 hash of the input data.
pub fn hash_sha256(data: &[u8]) -> Hash {
    use sha2::Digest;
    let result = sha2::Sha256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute the BLAKE3 hash of the input data.
pub fn hash_blake3(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}
