//! Layered storage for pipelined block execution.
//!
//! A `MultiLayerStorage` is a stack of in-memory layers over a shared
//! backend:
//!
//! ```text
//! mutable (optional) -> immutable[0] -> immutable[1] -> ... -> backend
//! ```
//!
//! A block executes against a fresh mutable layer. Once it finishes, the
//! layer is frozen and pushed to the front of the immutable deque, where later
//! blocks can read it before it is merged. The oldest immutable layer is
//! eventually replayed into the backend.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::Mutex;
use log::debug;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::key::StateKey;
use crate::memory::{Lookup, MemoryStorage};
use crate::traits::StateStorage;

pub struct MultiLayerStorage<B> {
    mutable: Option<MemoryStorage>,
    immutables: VecDeque<Arc<MemoryStorage>>,
    backend: Arc<Mutex<B>>,
}

impl<B: StateStorage> MultiLayerStorage<B> {
    /// Create a view over `backend` with no layers.
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(Mutex::new(backend)))
    }

    pub fn with_shared_backend(backend: Arc<Mutex<B>>) -> Self {
        Self {
            mutable: None,
            immutables: VecDeque::new(),
            backend,
        }
    }

    /// Start a new mutable layer.
    pub fn new_mutable(&mut self) -> Result<(), StorageError> {
        if self.mutable.is_some() {
            return Err(StorageError::DuplicateMutableStorage);
        }
        self.mutable = Some(MemoryStorage::new());
        Ok(())
    }

    /// Discard the mutable layer, returning it if one existed.
    pub fn drop_mutable(&mut self) -> Option<MemoryStorage> {
        self.mutable.take()
    }

    /// Freeze the mutable layer as the newest immutable layer.
    pub fn push_mutable_to_immutable_front(&mut self) -> Result<(), StorageError> {
        let layer = self
            .mutable
            .take()
            .ok_or(StorageError::NotExistsMutableStorage)?;
        self.immutables.push_front(Arc::new(layer));
        Ok(())
    }

    /// Remove the newest immutable layer without merging it.
    pub fn pop_immutable_front(&mut self) -> Result<Arc<MemoryStorage>, StorageError> {
        self.immutables
            .pop_front()
            .ok_or(StorageError::NotExistsImmutableStorage)
    }

    /// Replay the oldest immutable layer into the backend and drop it.
    ///
    /// Values are written, tombstones removed.
    pub async fn merge_and_pop_immutable_back(&mut self) -> Result<(), StorageError> {
        let layer = self
            .immutables
            .back()
            .cloned()
            .ok_or(StorageError::NotExistsImmutableStorage)?;

        let mut writes = Vec::new();
        let mut removes = Vec::new();
        for (key, entry) in layer.iter() {
            match entry {
                Some(entry) => writes.push((key.clone(), entry.clone())),
                None => removes.push(key.clone()),
            }
        }
        debug!(
            "merging immutable layer into backend: {} writes, {} removes, {} layers left",
            writes.len(),
            removes.len(),
            self.immutables.len() - 1
        );

        let mut backend = self.backend.lock().await;
        backend.write(writes).await?;
        backend.remove(&removes).await?;
        drop(backend);

        // the layer stays readable until the backend holds its contents
        self.immutables.pop_back();
        Ok(())
    }

    /// A new view sharing the backend and the current immutable layers,
    /// without a mutable layer.
    pub fn fork(&self) -> Self {
        Self {
            mutable: None,
            immutables: self.immutables.clone(),
            backend: Arc::clone(&self.backend),
        }
    }

    pub fn mutable_storage(&self) -> Option<&MemoryStorage> {
        self.mutable.as_ref()
    }

    pub fn immutable_count(&self) -> usize {
        self.immutables.len()
    }

    pub fn backend(&self) -> &Arc<Mutex<B>> {
        &self.backend
    }

    fn lookup_layers(&self, key: &StateKey) -> Lookup<'_> {
        let layers = self
            .mutable
            .iter()
            .chain(self.immutables.iter().map(|layer| layer.as_ref()));
        for layer in layers {
            match layer.lookup(key) {
                Lookup::Missing => continue,
                hit => return hit,
            }
        }
        Lookup::Missing
    }

    fn mutable_mut(&mut self) -> Result<&mut MemoryStorage, StorageError> {
        self.mutable
            .as_mut()
            .ok_or(StorageError::NotExistsMutableStorage)
    }
}

#[async_trait]
impl<B: StateStorage> StateStorage for MultiLayerStorage<B> {
    async fn read(&self, keys: &[StateKey]) -> Result<Vec<Option<Entry>>, StorageError> {
        let mut values = vec![None; keys.len()];
        let mut pending = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            match self.lookup_layers(key) {
                Lookup::Found(entry) => values[i] = Some(entry.clone()),
                Lookup::Deleted => {}
                Lookup::Missing => pending.push(i),
            }
        }

        if !pending.is_empty() {
            let missing: Vec<StateKey> = pending.iter().map(|&i| keys[i].clone()).collect();
            let backend = self.backend.lock().await;
            let fetched = backend.read(&missing).await?;
            for (i, value) in pending.into_iter().zip(fetched) {
                values[i] = value;
            }
        }
        Ok(values)
    }

    async fn write(&mut self, entries: Vec<(StateKey, Entry)>) -> Result<(), StorageError> {
        let layer = self.mutable_mut()?;
        for (key, entry) in entries {
            layer.insert(key, entry);
        }
        Ok(())
    }

    async fn remove(&mut self, keys: &[StateKey]) -> Result<(), StorageError> {
        let layer = self.mutable_mut()?;
        for key in keys {
            layer.delete(key.clone());
        }
        Ok(())
    }
}
