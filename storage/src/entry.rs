//! Stored values.

use bytes::Bytes;

/// An opaque stored value.
///
/// Entries are always written and read whole. Cloning is cheap: the payload
/// is reference-counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Entry {
    value: Bytes,
}

impl Entry {
    /// Create an entry holding `value`.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw payload.
    pub fn get(&self) -> &[u8] {
        &self.value
    }

    /// Replace the payload.
    pub fn set(&mut self, value: impl Into<Bytes>) {
        self.value = value.into();
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Consume the entry and return its payload.
    pub fn into_bytes(self) -> Bytes {
        self.value
    }
}

impl From<Vec<u8>> for Entry {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for Entry {
    fn from(value: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(value))
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
