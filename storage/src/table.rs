//! Table names and the table-name interning pool.
//!
//! Every logical table is identified by a [`TableName`] handle obtained from
//! a [`TableNamePool`]. The pool guarantees that equal names share one
//! allocation, so handles from the same pool compare by pointer.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_primitives::{types::to_hex, Address};

/// Prefix of every contract table.
pub const USER_APPS_PREFIX: &str = "/apps/";

/// System table mapping code hash to code bytes.
pub const SYS_CODE_BINARY: &str = "s_code_binary";

/// System table mapping code hash to ABI metadata.
pub const SYS_CONTRACT_ABI: &str = "s_contract_abi";

/// Key inside a contract table holding the contract's code hash.
pub const ACCOUNT_CODE_HASH: &[u8] = b"codeHash";

/// Interned table name.
#[derive(Clone)]
pub struct TableName(Arc<[u8]>);

impl TableName {
    /// The raw name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true if both handles point at the same interned name.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for TableName {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for TableName {}

impl Hash for TableName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for TableName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TableName {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableName({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Process-wide table-name interning pool.
///
/// Shared by reference across a call tree and safe to share across
/// concurrently executing transactions.
#[derive(Default)]
pub struct TableNamePool {
    names: Mutex<HashSet<Arc<[u8]>>>,
}

impl TableNamePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the pool's handle for it.
    pub fn intern(&self, name: &[u8]) -> TableName {
        let mut names = self.names.lock();
        if let Some(existing) = names.get(name) {
            return TableName(Arc::clone(existing));
        }
        let interned: Arc<[u8]> = Arc::from(name);
        names.insert(Arc::clone(&interned));
        TableName(interned)
    }

    /// Intern the table of the contract at `address`.
    pub fn contract_table(&self, address: &Address) -> TableName {
        self.intern(contract_table_name(address).as_bytes())
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    /// Returns true if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.names.lock().is_empty()
    }
}

/// Table name of the contract at `address`: the apps prefix followed by the
/// lowercase hex address.
pub fn contract_table_name(address: &Address) -> String {
    let mut name = String::with_capacity(USER_APPS_PREFIX.len() + address.len() * 2);
    name.push_str(USER_APPS_PREFIX);
    name.push_str(&to_hex(address));
    name
}
