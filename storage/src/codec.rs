//! Flat key and value encoding.
//!
//! A state key is persisted as a single flat key:
//!
//! ```text
//! table-bytes ++ b':' ++ key-bytes
//! ```
//!
//! The separator may never occur inside a table name. Decoding splits at the
//! first separator, so key bytes are free to contain it. This layout must stay
//! stable: existing data written by earlier versions depends on it.
//!
//! A value is its raw payload; decoding a value never fails.

use smallvec::SmallVec;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::key::{StateKey, KEY_INLINE_CAPACITY};
use crate::table::TableNamePool;

/// Separator between the table and the key in a flat key.
pub const TABLE_KEY_SPLIT: u8 = b':';

/// Inline capacity reserved for the table part of a flat key.
pub const TABLE_INLINE_CAPACITY: usize = 48;

/// A flat storage key. Fits inline for contract tables with word-sized keys.
pub type FlatKey = SmallVec<[u8; TABLE_INLINE_CAPACITY + KEY_INLINE_CAPACITY + 1]>;

/// Encode `(table, key)` as a flat key.
///
/// `table` must not contain [`TABLE_KEY_SPLIT`]; this is not re-checked in
/// release builds.
pub fn encode_key(table: &[u8], key: &[u8]) -> FlatKey {
    debug_assert!(
        !table.contains(&TABLE_KEY_SPLIT),
        "table name contains the key separator"
    );
    let mut flat = FlatKey::with_capacity(table.len() + 1 + key.len());
    flat.extend_from_slice(table);
    flat.push(TABLE_KEY_SPLIT);
    flat.extend_from_slice(key);
    flat
}

/// Encode a [`StateKey`] as a flat key.
pub fn encode_state_key(state_key: &StateKey) -> FlatKey {
    encode_key(state_key.table.as_bytes(), &state_key.key)
}

/// Split a flat key into its table and key segments.
///
/// Fails with [`StorageError::InvalidStateKey`] when the separator is absent
/// or either segment is empty.
pub fn decode_key(flat: &[u8]) -> Result<(&[u8], &[u8]), StorageError> {
    let pos = flat
        .iter()
        .position(|b| *b == TABLE_KEY_SPLIT)
        .ok_or_else(|| invalid(flat, "missing separator"))?;
    let (table, key) = (&flat[..pos], &flat[pos + 1..]);
    if table.is_empty() {
        return Err(invalid(flat, "empty table"));
    }
    if key.is_empty() {
        return Err(invalid(flat, "empty key"));
    }
    Ok((table, key))
}

/// Decode a flat key, interning its table in `pool`.
pub fn decode_state_key(pool: &TableNamePool, flat: &[u8]) -> Result<StateKey, StorageError> {
    let (table, key) = decode_key(flat)?;
    Ok(StateKey::new(pool.intern(table), key))
}

pub fn encode_value(entry: &Entry) -> &[u8] {
    entry.get()
}

pub fn decode_value(bytes: &[u8]) -> Entry {
    Entry::from(bytes)
}

fn invalid(flat: &[u8], reason: &str) -> StorageError {
    StorageError::InvalidStateKey(format!("{reason}: {:?}", String::from_utf8_lossy(flat)))
}
