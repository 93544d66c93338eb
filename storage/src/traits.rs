//! Storage contracts required by the execution host.

use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::key::StateKey;

/// A marker into a transactional storage's write history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Savepoint(pub(crate) usize);

impl Savepoint {
    /// Number of history records preceding this savepoint.
    pub fn position(&self) -> usize {
        self.0
    }
}

/// Asynchronous point-access key-value storage.
///
/// Every method is a suspension point. A key that is merely absent is
/// reported as `None`, never as an error.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Read `keys`, returning one result per key in request order.
    async fn read(&self, keys: &[StateKey]) -> Result<Vec<Option<Entry>>, StorageError>;

    /// Write every pair, overwriting prior values. Visible to subsequent reads
    /// immediately.
    async fn write(&mut self, entries: Vec<(StateKey, Entry)>) -> Result<(), StorageError>;

    /// Remove `keys`. Removing an absent key is a no-op.
    async fn remove(&mut self, keys: &[StateKey]) -> Result<(), StorageError>;

    async fn read_one(&self, key: &StateKey) -> Result<Option<Entry>, StorageError> {
        let mut values = self.read(std::slice::from_ref(key)).await?;
        Ok(values.pop().flatten())
    }

    async fn write_one(&mut self, key: StateKey, entry: Entry) -> Result<(), StorageError> {
        self.write(vec![(key, entry)]).await
    }

    async fn remove_one(&mut self, key: &StateKey) -> Result<(), StorageError> {
        self.remove(std::slice::from_ref(key)).await
    }

    async fn exists_one(&self, key: &StateKey) -> Result<bool, StorageError> {
        Ok(self.read_one(key).await?.is_some())
    }
}

/// Storage with savepoint and rollback support.
///
/// Savepoints nest with stack discipline: a savepoint taken later must be
/// rolled back before one taken earlier.
#[async_trait]
pub trait TransactionalStorage: StateStorage {
    /// Capture the current point in the write history. O(1).
    fn current(&self) -> Savepoint;

    /// Discard every write performed after `savepoint`, restoring prior
    /// values, including absence.
    async fn rollback(&mut self, savepoint: Savepoint) -> Result<(), StorageError>;
}
