//! Block header and transaction types.
//!
//! The host only needs the header fields exposed to contracts (number,
//! version, timestamp). Transactions are the input of the top-level
//! executor, which turns each one into a [`Message`](crate::Message).

use crate::types::{Address, BlockNumber, Bytes32, Hash, ZERO_WORD};

/// Header of the block being executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block number. Also feeds CREATE address derivation.
    pub number: BlockNumber,
    /// Protocol version of the block.
    pub version: u32,
    /// Block timestamp from consensus.
    pub timestamp: i64,
    /// Hash of the parent block.
    pub parent_hash: Hash,
}

impl BlockHeader {
    /// A header with the given number and zeroed remaining fields.
    pub fn with_number(number: BlockNumber) -> Self {
        Self {
            number,
            version: 0,
            timestamp: 0,
            parent_hash: [0u8; 32],
        }
    }
}

/// A top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Originating account.
    pub sender: Address,
    /// Target contract, or `None` for a contract creation.
    pub to: Option<Address>,
    /// Call data, or init code for creations.
    pub input: Vec<u8>,
    /// Transferred value.
    pub value: Bytes32,
    /// Gas limit of the transaction.
    pub gas: i64,
    /// ABI metadata attached to a creation.
    pub abi: Option<String>,
}

impl Transaction {
    /// A call transaction.
    pub fn call(sender: Address, to: Address, input: Vec<u8>, gas: i64) -> Self {
        Self {
            sender,
            to: Some(to),
            input,
            value: ZERO_WORD,
            gas,
            abi: None,
        }
    }

    /// A creation transaction.
    pub fn create(sender: Address, init_code: Vec<u8>, gas: i64) -> Self {
        Self {
            sender,
            to: None,
            input: init_code,
            value: ZERO_WORD,
            gas,
            abi: None,
        }
    }

    /// Attach ABI metadata.
    pub fn with_abi(mut self, abi: impl Into<String>) -> Self {
        self.abi = Some(abi.into());
        self
    }

    /// Returns true if this transaction creates a contract.
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}
