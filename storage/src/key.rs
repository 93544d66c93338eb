//! Logical state keys.

use smallvec::SmallVec;

use crate::table::TableName;

/// Inline capacity of a contract key. Storage slots are 32-byte words.
pub const KEY_INLINE_CAPACITY: usize = 32;

/// Raw key bytes inside a table.
pub type ContractKey = SmallVec<[u8; KEY_INLINE_CAPACITY]>;

/// A `(table, key)` pair addressing one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub table: TableName,
    pub key: ContractKey,
}

impl StateKey {
    pub fn new(table: TableName, key: &[u8]) -> Self {
        Self {
            table,
            key: SmallVec::from_slice(key),
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}
