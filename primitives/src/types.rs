//! Core type aliases and constants for Tessera contract execution.
//!
//! These types are shared by the storage layer, the host API, and the
//! execution engine.

/// 32-byte hash used for code hashes, topics, and block hashes.
pub type Hash = [u8; 32];

/// 20-byte account / contract address.
pub type Address = [u8; 20];

/// 32-byte word used for contract storage slots and call values.
pub type Bytes32 = [u8; 32];

/// Block number as carried by the block header.
pub type BlockNumber = i64;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A zero-valued hash (32 zero bytes).
pub const ZERO_HASH: Hash = [0u8; 32];

/// A zero-valued address. Used as the "unset" sender sentinel.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// A zero-valued storage word.
pub const ZERO_WORD: Bytes32 = [0u8; 32];

/// Lowercase hex without prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Lowercase hex with a `0x` prefix, for display purposes.
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 + bytes.len() * 2);
    s.push_str("0x");
    s.push_str(&hex::encode(bytes));
    s
}

/// Interpret an address as a big-endian integer if it fits in a `u64`.
///
/// Returns `None` when any of the upper 12 bytes is non-zero.
pub fn address_to_u64(address: &Address) -> Option<u64> {
    let (high, low) = address.split_at(ADDRESS_LEN - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    Some(u64::from_be_bytes(buf))
}

/// Build an address from a small integer, big-endian in the low bytes.
pub fn address_from_u64(value: u64) -> Address {
    let mut address = ZERO_ADDRESS;
    address[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
    address
}

/// Copy `bytes` into a 32-byte word, zero-padding on the right and
/// truncating anything beyond 32 bytes.
pub fn to_word(bytes: &[u8]) -> Bytes32 {
    let mut word = ZERO_WORD;
    let n = bytes.len().min(word.len());
    word[..n].copy_from_slice(&bytes[..n]);
    word
}
