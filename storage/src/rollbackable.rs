//! Savepoint support for any [`StateStorage`].
//!
//! `Rollbackable` records the prior value of every key before it is written
//! or removed. A savepoint is the length of that undo log; rolling back
//! replays the log backwards down to that length.

use async_trait::async_trait;
use log::trace;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::key::StateKey;
use crate::traits::{Savepoint, StateStorage, TransactionalStorage};

#[derive(Debug, Clone)]
struct UndoRecord {
    key: StateKey,
    previous: Option<Entry>,
}

/// Wraps a storage with an undo log.
#[derive(Debug, Default)]
pub struct Rollbackable<S> {
    storage: S,
    history: Vec<UndoRecord>,
}

impl<S: StateStorage> Rollbackable<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            history: Vec::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of undo records held.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Unwrap the storage, dropping the undo log. Writes are kept.
    pub fn into_inner(self) -> S {
        self.storage
    }

    async fn record(&mut self, keys: Vec<StateKey>) -> Result<(), StorageError> {
        let previous = self.storage.read(&keys).await?;
        self.history.extend(
            keys.into_iter()
                .zip(previous)
                .map(|(key, previous)| UndoRecord { key, previous }),
        );
        Ok(())
    }
}

#[async_trait]
impl<S: StateStorage> StateStorage for Rollbackable<S> {
    async fn read(&self, keys: &[StateKey]) -> Result<Vec<Option<Entry>>, StorageError> {
        self.storage.read(keys).await
    }

    async fn write(&mut self, entries: Vec<(StateKey, Entry)>) -> Result<(), StorageError> {
        self.record(entries.iter().map(|(key, _)| key.clone()).collect())
            .await?;
        self.storage.write(entries).await
    }

    async fn remove(&mut self, keys: &[StateKey]) -> Result<(), StorageError> {
        self.record(keys.to_vec()).await?;
        self.storage.remove(keys).await
    }
}

#[async_trait]
impl<S: StateStorage> TransactionalStorage for Rollbackable<S> {
    fn current(&self) -> Savepoint {
        Savepoint(self.history.len())
    }

    async fn rollback(&mut self, savepoint: Savepoint) -> Result<(), StorageError> {
        if savepoint.0 > self.history.len() {
            return Err(StorageError::InvalidSavepoint {
                savepoint: savepoint.0,
                current: self.history.len(),
            });
        }
        trace!(
            "rolling back {} writes to savepoint {}",
            self.history.len() - savepoint.0,
            savepoint.0
        );
        // a record leaves the log only once its replay succeeded
        while self.history.len() > savepoint.0 {
            let Some(record) = self.history.last() else {
                break;
            };
            match &record.previous {
                Some(entry) => {
                    self.storage
                        .write_one(record.key.clone(), entry.clone())
                        .await?
                }
                None => self.storage.remove_one(&record.key).await?,
            }
            self.history.pop();
        }
        Ok(())
    }
}
