//! `tessera-storage`: transactional state storage for contract execution.
//!
//! This crate defines the storage contract the execution host relies on:
//!
//! - the flat key codec (`table ++ ':' ++ key`)
//! - table-name interning
//! - asynchronous point reads and writes ([`StateStorage`])
//! - savepoints and rollback ([`TransactionalStorage`])
//!
//! plus in-memory, flat, rollbackable and multi-layer implementations.

pub mod codec;
pub mod entry;
pub mod error;
pub mod flat;
pub mod key;
pub mod memory;
pub mod multi_layer;
pub mod rollbackable;
pub mod table;
pub mod traits;

pub use codec::{decode_key, decode_value, encode_key, encode_value, FlatKey, TABLE_KEY_SPLIT};
pub use entry::Entry;
pub use error::StorageError;
pub use flat::FlatStorage;
pub use key::{ContractKey, StateKey};
pub use memory::{Lookup, MemoryStorage};
pub use multi_layer::MultiLayerStorage;
pub use rollbackable::Rollbackable;
pub use table::{
    TableName, TableNamePool, ACCOUNT_CODE_HASH, SYS_CODE_BINARY, SYS_CONTRACT_ABI,
    USER_APPS_PREFIX,
};
pub use traits::{Savepoint, StateStorage, TransactionalStorage};
