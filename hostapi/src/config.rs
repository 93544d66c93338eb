//! Host configuration.
//!
//! `HostConfig` bundles the settings shared by every host in a call tree.
//! Missing fields in a JSON document fall back to the defaults.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_primitives::{HashAlgorithm, Hasher, Revision};

/// Default block gas limit.
pub const DEFAULT_BLOCK_GAS_LIMIT: i64 = 30_000 * 10_000;

/// Exclusive upper bound of the precompiled address range.
pub const DEFAULT_MAX_PRECOMPILED_ADDRESS: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Instruction-set revision handed to the interpreter.
    pub revision: Revision,
    /// Hash function for code hashes and CREATE addresses.
    pub hash_algorithm: HashAlgorithm,
    /// Addresses in `1..max_precompiled_address` are checked against the
    /// precompiled registry before normal dispatch.
    pub max_precompiled_address: u64,
    /// Upper bound on the gas of a single transaction.
    pub block_gas_limit: i64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            revision: Revision::default(),
            hash_algorithm: HashAlgorithm::default(),
            max_precompiled_address: DEFAULT_MAX_PRECOMPILED_ADDRESS,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
        }
    }
}

impl HostConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// A hasher for the configured algorithm.
    pub fn hasher(&self) -> Arc<dyn Hasher> {
        self.hash_algorithm.hasher()
    }
}
