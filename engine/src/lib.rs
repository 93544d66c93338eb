//! `tessera-engine`: contract execution host and transaction executor.
//!
//! This crate drives contract execution over a transactional storage:
//! one message at a time, with nested calls dispatched recursively and
//! every failed call rolled back to its savepoint.
//!
//! ## Architecture
//!
//! - [`host::HostContext`]: executes one message; implements `HostApi`
//! - [`executor::TransactionExecutor`]: transactions and blocks to receipts
//! - [`validation`]: transaction checks before execution
//! - [`mock`]: a scripted interpreter for tests

pub mod host;
pub mod validation;
pub mod executor;
pub mod mock;

// Re-export key types for convenience
pub use executor::TransactionExecutor;
pub use host::{derive_create_address, HostContext, HostEnv, HostState};
pub use mock::{Script, ScriptVm, ScriptVmFactory};
