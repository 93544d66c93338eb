//! Deterministic binary encoding for receipts and logs.
//!
//! Encoding format:
//! - Fixed-size fields (hashes, addresses, integers) are written directly,
//!   integers little-endian
//! - Variable-length fields are length-prefixed (u32 LE)
//! - Repeated fields are count-prefixed (u32 LE) then concatenated
//! - Optional address: 1-byte flag (0 = None, 1 = Some) followed by 20 bytes

use crate::error::{CodecError, StatusCode};
use crate::execution::{LogEntry, Receipt};
use crate::types::{Address, Hash};

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEnd { offset: self.pos });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_bytes(4)?);
        Ok(i32::from_le_bytes(buf))
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_bytes(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    fn read_hash(&mut self) -> Result<Hash, CodecError> {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(self.read_bytes(32)?);
        Ok(hash)
    }

    fn read_address(&mut self) -> Result<Address, CodecError> {
        let mut address = [0u8; 20];
        address.copy_from_slice(self.read_bytes(20)?);
        Ok(address)
    }

    fn read_optional_address(&mut self) -> Result<Option<Address>, CodecError> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.read_address()?)),
            flag => Err(CodecError::InvalidFlag(flag)),
        }
    }

    fn read_var_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

// ── Encoding helpers ──

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_optional_address(buf: &mut Vec<u8>, address: &Option<Address>) {
    match address {
        None => buf.push(0),
        Some(address) => {
            buf.push(1);
            buf.extend_from_slice(address);
        }
    }
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_u32(buf, data.len() as u32);
    buf.extend_from_slice(data);
}

// ── Log encoding ──

fn encode_log(buf: &mut Vec<u8>, log: &LogEntry) {
    buf.extend_from_slice(&log.address);
    write_u32(buf, log.topics.len() as u32);
    for topic in &log.topics {
        buf.extend_from_slice(topic);
    }
    write_var_bytes(buf, &log.data);
}

fn decode_log(r: &mut Reader<'_>) -> Result<LogEntry, CodecError> {
    let address = r.read_address()?;
    let topic_count = r.read_u32()? as usize;
    let mut topics = Vec::with_capacity(topic_count.min(r.remaining() / 32));
    for _ in 0..topic_count {
        topics.push(r.read_hash()?);
    }
    let data = r.read_var_bytes()?;
    Ok(LogEntry {
        address,
        topics,
        data,
    })
}

// ── Receipt encoding ──

/// Encode a `Receipt` to deterministic bytes.
pub fn encode_receipt(receipt: &Receipt) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + receipt.output.len());
    write_i32(&mut buf, receipt.status.as_i32());
    write_i64(&mut buf, receipt.gas_used);
    write_var_bytes(&mut buf, &receipt.output);
    write_optional_address(&mut buf, &receipt.contract_address);
    write_u32(&mut buf, receipt.logs.len() as u32);
    for log in &receipt.logs {
        encode_log(&mut buf, log);
    }
    write_i64(&mut buf, receipt.block_number);
    buf
}

/// Decode a `Receipt` from bytes produced by [`encode_receipt`].
pub fn decode_receipt(data: &[u8]) -> Result<Receipt, CodecError> {
    let mut r = Reader::new(data);

    let raw_status = r.read_i32()?;
    let status = StatusCode::from_i32(raw_status).ok_or(CodecError::UnknownStatus(raw_status))?;
    let gas_used = r.read_i64()?;
    let output = r.read_var_bytes()?;
    let contract_address = r.read_optional_address()?;

    let log_count = r.read_u32()? as usize;
    let mut logs = Vec::with_capacity(log_count.min(r.remaining()));
    for _ in 0..log_count {
        logs.push(decode_log(&mut r)?);
    }
    let block_number = r.read_i64()?;

    if r.remaining() != 0 {
        return Err(CodecError::TrailingBytes(r.remaining()));
    }

    Ok(Receipt {
        status,
        gas_used,
        output,
        contract_address,
        logs,
        block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_receipt() -> Receipt {
        Receipt {
            status: StatusCode::Success,
            gas_used: 21_000,
            output: vec![1, 2, 3],
            contract_address: Some([0xAB; 20]),
            logs: vec![
                LogEntry {
                    address: [0x11; 20],
                    topics: vec![[0xCC; 32], [0xDD; 32]],
                    data: b"transfer".to_vec(),
                },
                LogEntry {
                    address: [0x22; 20],
                    topics: vec![],
                    data: vec![],
                },
            ],
            block_number: 10,
        }
    }

    #[test]
    fn test_receipt_roundtrip() {
        let receipt = sample_receipt();
        let encoded = encode_receipt(&receipt);
        assert_eq!(decode_receipt(&encoded).unwrap(), receipt);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode_receipt(&sample_receipt()), encode_receipt(&sample_receipt()));
    }

    #[test]
    fn test_failed_receipt_without_address() {
        let receipt = Receipt {
            status: StatusCode::Revert,
            gas_used: 5,
            output: b"no".to_vec(),
            contract_address: None,
            logs: vec![],
            block_number: 1,
        };
        let decoded = decode_receipt(&encode_receipt(&receipt)).unwrap();
        assert_eq!(decoded.status, StatusCode::Revert);
        assert_eq!(decoded.contract_address, None);
    }

    #[test]
    fn test_truncated_input() {
        let encoded = encode_receipt(&sample_receipt());
        let err = decode_receipt(&encoded[..encoded.len() - 3]).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut encoded = encode_receipt(&sample_receipt());
        encoded[..4].copy_from_slice(&99i32.to_le_bytes());
        assert_eq!(decode_receipt(&encoded).unwrap_err(), CodecError::UnknownStatus(99));
    }

    #[test]
    fn test_invalid_optional_flag() {
        let mut encoded = encode_receipt(&sample_receipt());
        // status (4) + gas (8) + output len (4) + output (3)
        encoded[19] = 7;
        assert_eq!(decode_receipt(&encoded).unwrap_err(), CodecError::InvalidFlag(7));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut encoded = encode_receipt(&sample_receipt());
        encoded.push(0);
        assert_eq!(decode_receipt(&encoded).unwrap_err(), CodecError::TrailingBytes(1));
    }
}
