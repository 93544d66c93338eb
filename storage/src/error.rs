//! Storage error types.

/// Errors raised by the storage layer.
///
/// A missing key is never an error: reads report it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// A flat key could not be split into a table and a key. Indicates
    /// corrupted or foreign data, never a normal condition.
    #[error("invalid state key: {0}")]
    InvalidStateKey(String),

    /// Rollback to a savepoint that lies beyond the recorded history.
    #[error("savepoint {savepoint} is beyond the write history (length {current})")]
    InvalidSavepoint { savepoint: usize, current: usize },

    /// Write or remove on a layered storage without a mutable layer.
    #[error("no mutable storage layer")]
    NotExistsMutableStorage,

    /// A second mutable layer was requested while one exists.
    #[error("a mutable storage layer already exists")]
    DuplicateMutableStorage,

    /// An immutable-layer operation on an empty layer stack.
    #[error("no immutable storage layer")]
    NotExistsImmutableStorage,

    /// I/O failure reported by a storage engine.
    #[error("storage backend error: {0}")]
    Backend(String),
}
