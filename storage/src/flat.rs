//! A key-value engine addressed by flat keys.
//!
//! `FlatStorage` stores entries under their persisted key layout, the way an
//! embedded key-value engine would. It is the reference backend for
//! [`MultiLayerStorage`](crate::MultiLayerStorage) and the place where
//! malformed persisted keys surface.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::codec::{decode_state_key, decode_value, encode_state_key, encode_value};
use crate::entry::Entry;
use crate::error::StorageError;
use crate::key::StateKey;
use crate::table::TableNamePool;
use crate::traits::StateStorage;

pub struct FlatStorage {
    pool: Arc<TableNamePool>,
    data: BTreeMap<Vec<u8>, Bytes>,
}

impl FlatStorage {
    /// Create an empty engine. Decoded keys are interned in `pool`.
    pub fn new(pool: Arc<TableNamePool>) -> Self {
        Self {
            pool,
            data: BTreeMap::new(),
        }
    }

    /// Store raw bytes under a raw flat key, bypassing the codec.
    pub fn insert_raw(&mut self, flat_key: Vec<u8>, value: impl Into<Bytes>) {
        self.data.insert(flat_key, value.into());
    }

    pub fn get_raw(&self, flat_key: &[u8]) -> Option<&[u8]> {
        self.data.get(flat_key).map(|v| v.as_ref())
    }

    /// Decode every stored pair in key order.
    ///
    /// Fails with [`StorageError::InvalidStateKey`] on the first malformed key.
    pub fn entries(&self) -> Result<Vec<(StateKey, Entry)>, StorageError> {
        self.data
            .iter()
            .map(|(flat, value)| {
                let key = decode_state_key(&self.pool, flat)?;
                Ok((key, decode_value(value)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for FlatStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatStorage")
            .field("entries", &self.data.len())
            .finish()
    }
}

#[async_trait]
impl StateStorage for FlatStorage {
    async fn read(&self, keys: &[StateKey]) -> Result<Vec<Option<Entry>>, StorageError> {
        Ok(keys
            .iter()
            .map(|key| {
                self.data
                    .get(encode_state_key(key).as_slice())
                    .map(|value| Entry::new(value.clone()))
            })
            .collect())
    }

    async fn write(&mut self, entries: Vec<(StateKey, Entry)>) -> Result<(), StorageError> {
        for (key, entry) in entries {
            let value = Bytes::copy_from_slice(encode_value(&entry));
            self.data.insert(encode_state_key(&key).to_vec(), value);
        }
        Ok(())
    }

    async fn remove(&mut self, keys: &[StateKey]) -> Result<(), StorageError> {
        for key in keys {
            self.data.remove(encode_state_key(key).as_slice());
        }
        Ok(())
    }
}
