//! Host API trait: the interface an interpreter calls back into.
//!
//! An interpreter executing bytecode reaches state, block data and nested
//! calls only through this trait. Storage-backed methods are asynchronous;
//! each is a suspension point and runs in program order.

use async_trait::async_trait;
use tessera_primitives::{Address, BlockNumber, Bytes32, ExecutionResult, Hash, Message};

use crate::error::HostError;

#[async_trait]
pub trait HostApi: Send + Sync {
    // ── Contract storage ──

    /// Read a storage slot of the executing contract.
    ///
    /// An absent slot reads as the all-zero word.
    async fn get(&self, key: &Bytes32) -> Result<Bytes32, HostError>;

    /// Write a storage slot of the executing contract.
    async fn set(&mut self, key: &Bytes32, value: &Bytes32) -> Result<(), HostError>;

    // ── Accounts ──

    /// Code of the contract at `address`; empty if it has none.
    async fn code_at(&self, address: &Address) -> Result<Vec<u8>, HostError>;

    /// Code size at `address`; zero if it has no code.
    async fn code_size_at(&self, address: &Address) -> Result<usize, HostError>;

    /// Code hash at `address`; the zero hash if it has no code.
    async fn code_hash_at(&self, address: &Address) -> Result<Hash, HostError>;

    /// Whether `address` names a known account.
    async fn exists(&self, address: &Address) -> Result<bool, HostError>;

    // ── Block context ──

    /// Hash of a recent block. Not supported: always fails.
    fn block_hash(&self, number: BlockNumber) -> Result<Hash, HostError>;

    fn block_number(&self) -> BlockNumber;

    fn timestamp(&self) -> i64;

    /// Sender of the top-level transaction.
    fn origin(&self) -> Address;

    fn block_gas_limit(&self) -> i64;

    // ── Logs and calls ──

    /// Append a log attributed to the executing contract.
    fn emit_log(&mut self, topics: Vec<Hash>, data: Vec<u8>);

    /// Dispatch a nested message (call, create or precompiled).
    ///
    /// A failing callee is reported through the result's status; `Err` is
    /// reserved for fatal conditions that abort the transaction.
    async fn external_call(&mut self, message: &Message) -> Result<ExecutionResult, HostError>;
}
