//! In-memory storage with tombstones.
//!
//! `MemoryStorage` doubles as a plain test store and as one layer of a
//! [`MultiLayerStorage`](crate::MultiLayerStorage). Removals are recorded as
//! tombstones so a layer can shadow values held by the layers below it.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::key::StateKey;
use crate::traits::StateStorage;

/// Result of looking up a key in a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The layer holds a value for the key.
    Found(&'a Entry),
    /// The key was removed in this layer.
    Deleted,
    /// The layer knows nothing about the key; consult the next one.
    Missing,
}

/// Ordered in-memory storage.
///
/// `BTreeMap` keeps iteration order deterministic, which matters when a layer
/// is replayed into a backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<StateKey, Option<Entry>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &StateKey) -> Lookup<'_> {
        match self.entries.get(key) {
            Some(Some(entry)) => Lookup::Found(entry),
            Some(None) => Lookup::Deleted,
            None => Lookup::Missing,
        }
    }

    pub fn insert(&mut self, key: StateKey, entry: Entry) {
        self.entries.insert(key, Some(entry));
    }

    /// Record a tombstone for `key`.
    pub fn delete(&mut self, key: StateKey) {
        self.entries.insert(key, None);
    }

    /// Iterate all keys in order; `None` marks a tombstone.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, Option<&Entry>)> {
        self.entries.iter().map(|(k, v)| (k, v.as_ref()))
    }

    /// Number of keys, tombstones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn read(&self, keys: &[StateKey]) -> Result<Vec<Option<Entry>>, StorageError> {
        Ok(keys
            .iter()
            .map(|key| match self.lookup(key) {
                Lookup::Found(entry) => Some(entry.clone()),
                Lookup::Deleted | Lookup::Missing => None,
            })
            .collect())
    }

    async fn write(&mut self, entries: Vec<(StateKey, Entry)>) -> Result<(), StorageError> {
        for (key, entry) in entries {
            self.insert(key, entry);
        }
        Ok(())
    }

    async fn remove(&mut self, keys: &[StateKey]) -> Result<(), StorageError> {
        for key in keys {
            self.delete(key.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableNamePool;

    fn key(pool: &TableNamePool, k: &[u8]) -> StateKey {
        StateKey::new(pool.intern(b"t"), k)
    }

    #[test]
    fn test_lookup_states() {
        let pool = TableNamePool::new();
        let mut storage = MemoryStorage::new();
        storage.insert(key(&pool, b"a"), Entry::from(&b"1"[..]));
        storage.delete(key(&pool, b"b"));

        assert_eq!(storage.lookup(&key(&pool, b"a")), Lookup::Found(&Entry::from(&b"1"[..])));
        assert_eq!(storage.lookup(&key(&pool, b"b")), Lookup::Deleted);
        assert_eq!(storage.lookup(&key(&pool, b"c")), Lookup::Missing);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_set_after_delete() {
        let pool = TableNamePool::new();
        let mut storage = MemoryStorage::new();
        storage.delete(key(&pool, b"a"));
        storage.insert(key(&pool, b"a"), Entry::from(&b"2"[..]));
        assert!(matches!(storage.lookup(&key(&pool, b"a")), Lookup::Found(_)));
    }

    #[tokio::test]
    async fn test_read_preserves_request_order() {
        let pool = TableNamePool::new();
        let mut storage = MemoryStorage::new();
        storage
            .write(vec![
                (key(&pool, b"x"), Entry::from(&b"X"[..])),
                (key(&pool, b"y"), Entry::from(&b"Y"[..])),
            ])
            .await
            .unwrap();

        let values = storage
            .read(&[key(&pool, b"y"), key(&pool, b"missing"), key(&pool, b"x")])
            .await
            .unwrap();
        assert_eq!(
            values,
            vec![Some(Entry::from(&b"Y"[..])), None, Some(Entry::from(&b"X"[..]))]
        );
    }

    #[tokio::test]
    async fn test_removed_key_reads_absent() {
        let pool = TableNamePool::new();
        let mut storage = MemoryStorage::new();
        storage.write_one(key(&pool, b"a"), Entry::from(&b"1"[..])).await.unwrap();
        storage.remove_one(&key(&pool, b"a")).await.unwrap();
        assert!(!storage.exists_one(&key(&pool, b"a")).await.unwrap());
        assert_eq!(storage.read_one(&key(&pool, b"a")).await.unwrap(), None);
    }
}
