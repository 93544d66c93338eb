//! Execution outcome types: interpreter results, logs, and receipts.

use crate::error::StatusCode;
use crate::types::{Address, BlockNumber, Hash};

/// Result of one interpreter (or precompiled) execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Interpreter-reported status.
    pub status: StatusCode,
    /// Gas remaining after execution.
    pub gas_left: i64,
    /// Gas refund accumulated during execution.
    pub gas_refund: i64,
    /// Return data, revert reason, or deployed code for creations.
    pub output: Vec<u8>,
    /// Address of the new contract after a successful creation.
    pub create_address: Option<Address>,
}

impl ExecutionResult {
    /// A successful result.
    pub fn success(gas_left: i64, output: Vec<u8>) -> Self {
        Self {
            status: StatusCode::Success,
            gas_left,
            gas_refund: 0,
            output,
            create_address: None,
        }
    }

    /// A `Revert` result carrying a revert reason.
    pub fn revert(gas_left: i64, reason: Vec<u8>) -> Self {
        Self {
            status: StatusCode::Revert,
            gas_left,
            gas_refund: 0,
            output: reason,
            create_address: None,
        }
    }

    /// A failure with the given status, no output, and no gas left.
    pub fn failure(status: StatusCode) -> Self {
        Self {
            status,
            gas_left: 0,
            gas_refund: 0,
            output: Vec::new(),
            create_address: None,
        }
    }

    /// Returns true if the status is `Success`.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A log record emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Contract that emitted the log.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<Hash>,
    /// Unindexed payload.
    pub data: Vec<u8>,
}

/// Outcome of one top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Final status of the top-level execution.
    pub status: StatusCode,
    /// Gas consumed by the transaction.
    pub gas_used: i64,
    /// Return data or revert reason.
    pub output: Vec<u8>,
    /// Created contract, for successful creations.
    pub contract_address: Option<Address>,
    /// Logs of the whole call tree. Empty unless `status` is `Success`.
    pub logs: Vec<LogEntry>,
    /// Number of the block the transaction executed in.
    pub block_number: BlockNumber,
}

impl Receipt {
    /// Returns true if the transaction succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_constructors() {
        let ok = ExecutionResult::success(10, vec![1]);
        assert!(ok.is_success());
        assert_eq!(ok.gas_left, 10);

        let reverted = ExecutionResult::revert(5, b"reason".to_vec());
        assert_eq!(reverted.status, StatusCode::Revert);
        assert_eq!(reverted.output, b"reason");

        let failed = ExecutionResult::failure(StatusCode::OutOfGas);
        assert!(!failed.is_success());
        assert_eq!(failed.gas_left, 0);
        assert!(failed.create_address.is_none());
    }
}
