//! Host-side error types.
//!
//! `HostError` covers the fatal conditions of contract execution: anything
//! that cannot be expressed as an interpreter status code. A `HostError`
//! aborts the whole transaction; recoverable failures travel as a
//! non-success [`StatusCode`] inside an `ExecutionResult` instead.

use tessera_primitives::{types::to_hex_prefixed, Address, StatusCode};
use tessera_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A call targeted an address with no code.
    #[error("code not found for contract {}", to_hex_prefixed(.0))]
    NotFoundCode(Address),

    /// A feature that is deliberately not implemented (CREATE2, block hashes).
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// The transaction was rejected before execution started.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// The interpreter failed outside of its status-code protocol.
    #[error(transparent)]
    Interpreter(#[from] anyhow::Error),
}

impl HostError {
    /// Status recorded on a receipt for a transaction aborted by this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTransaction(_) => StatusCode::Rejected,
            Self::NotFoundCode(_)
            | Self::Unsupported(_)
            | Self::Storage(_)
            | Self::Interpreter(_) => StatusCode::InternalError,
        }
    }

    /// Returns true for storage I/O failures.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
