//! Shared helpers for storage integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tessera_storage::{
    Entry, MemoryStorage, StateKey, StateStorage, StorageError, TableNamePool,
};

/// A pool plus short constructors for keys and entries.
pub struct Fixture {
    pub pool: Arc<TableNamePool>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(TableNamePool::new()),
        }
    }

    /// Key `k` in table `t`.
    pub fn key(&self, t: &str, k: &str) -> StateKey {
        StateKey::new(self.pool.intern(t.as_bytes()), k.as_bytes())
    }
}

pub fn entry(v: &str) -> Entry {
    Entry::from(v.as_bytes())
}

/// An in-memory storage whose next writes or removes fail.
#[derive(Debug, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub failing_writes: usize,
    pub failing_removes: usize,
}

impl FlakyStorage {
    pub fn failing_removes(n: usize) -> Self {
        Self {
            failing_removes: n,
            ..Self::default()
        }
    }

    pub fn failing_writes(n: usize) -> Self {
        Self {
            failing_writes: n,
            ..Self::default()
        }
    }
}

fn transient(remaining: &mut usize) -> Result<(), StorageError> {
    if *remaining > 0 {
        *remaining -= 1;
        return Err(StorageError::Backend("transient".into()));
    }
    Ok(())
}

#[async_trait]
impl StateStorage for FlakyStorage {
    async fn read(&self, keys: &[StateKey]) -> Result<Vec<Option<Entry>>, StorageError> {
        self.inner.read(keys).await
    }

    async fn write(&mut self, entries: Vec<(StateKey, Entry)>) -> Result<(), StorageError> {
        transient(&mut self.failing_writes)?;
        self.inner.write(entries).await
    }

    async fn remove(&mut self, keys: &[StateKey]) -> Result<(), StorageError> {
        transient(&mut self.failing_removes)?;
        self.inner.remove(keys).await
    }
}
