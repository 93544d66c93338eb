//! `tessera-primitives`: foundational types for Tessera contract execution.
//!
//! This crate provides the addresses, messages, status codes, execution
//! results, receipts, block types, and the hashing capability shared by the
//! storage layer, the host API, and the execution engine.

pub mod types;
pub mod error;
pub mod crypto;
pub mod message;
pub mod execution;
pub mod block;
pub mod codec;

// Re-export commonly used types at the crate root for convenience.
pub use types::{Address, BlockNumber, Bytes32, Hash, ZERO_ADDRESS, ZERO_HASH, ZERO_WORD};
pub use error::{CodecError, StatusCode};
pub use crypto::{Blake3Hasher, HashAlgorithm, Hasher, Keccak256Hasher, Sha256Hasher};
pub use message::{CallKind, Message, Revision};
pub use execution::{ExecutionResult, LogEntry, Receipt};
pub use block::{BlockHeader, Transaction};
