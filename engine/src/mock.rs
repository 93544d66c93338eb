//! A scripted interpreter for tests.
//!
//! `ScriptVm` executes a tiny byte-coded script against a [`HostApi`]. It is
//! not a real bytecode interpreter; it exists to drive the host through
//! storage writes, logs, nested calls and creations deterministically.
//!
//! Script format: a sequence of instructions, each an opcode byte followed
//! by its operands. Byte-string operands are length-prefixed (u8). Addresses
//! are 20 raw bytes.
//!
//! | op     | name                   | operands     |
//! |--------|------------------------|--------------|
//! | `0x01` | SET                    | key, value   |
//! | `0x02` | COPY                   | src, dst     |
//! | `0x03` | LOG                    | data         |
//! | `0x04` | CALL                   | addr, input  |
//! | `0x05` | CREATE                 | code         |
//! | `0x06` | RETURN                 | data         |
//! | `0x07` | REVERT                 | data         |
//! | `0x08` | REVERT_IF_CALL_FAILED  |              |
//! | `0x09` | STORE_CALLER           | key          |
//! | `0x0A` | STORE_CREATED          | key          |
//! | `0x0B` | ABORT                  | reason       |
//!
//! Keys and values are zero-padded to 32-byte words. Every instruction costs
//! [`OP_GAS`]. A malformed script fails with `InvalidInstruction` before any
//! instruction runs. A creation that finishes without RETURN deploys its own
//! script as the contract code.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tessera_hostapi::{HostApi, HostError, VmFactory, VmInstance};
use tessera_primitives::{
    types::{to_word, ADDRESS_LEN},
    Address, ExecutionResult, Hash, Message, Revision, StatusCode, ZERO_ADDRESS,
};

/// Gas charged per instruction.
pub const OP_GAS: i64 = 10;

const OP_SET: u8 = 0x01;
const OP_COPY: u8 = 0x02;
const OP_LOG: u8 = 0x03;
const OP_CALL: u8 = 0x04;
const OP_CREATE: u8 = 0x05;
const OP_RETURN: u8 = 0x06;
const OP_REVERT: u8 = 0x07;
const OP_REVERT_IF_CALL_FAILED: u8 = 0x08;
const OP_STORE_CALLER: u8 = 0x09;
const OP_STORE_CREATED: u8 = 0x0A;
const OP_ABORT: u8 = 0x0B;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Set(Vec<u8>, Vec<u8>),
    Copy(Vec<u8>, Vec<u8>),
    Log(Vec<u8>),
    Call(Address, Vec<u8>),
    Create(Vec<u8>),
    Return(Vec<u8>),
    Revert(Vec<u8>),
    RevertIfCallFailed,
    StoreCaller(Vec<u8>),
    StoreCreated(Vec<u8>),
    Abort(Vec<u8>),
}

/// Builder for scripts understood by [`ScriptVm`].
#[derive(Debug, Clone, Default)]
pub struct Script {
    code: Vec<u8>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` to slot `key`.
    pub fn set(self, key: &[u8], value: &[u8]) -> Self {
        self.op(OP_SET).bytes(key).bytes(value)
    }

    /// Copy slot `src` into slot `dst`.
    pub fn copy(self, src: &[u8], dst: &[u8]) -> Self {
        self.op(OP_COPY).bytes(src).bytes(dst)
    }

    /// Emit a log with no topics.
    pub fn log(self, data: &[u8]) -> Self {
        self.op(OP_LOG).bytes(data)
    }

    /// Call `address` with `input`.
    pub fn call(self, address: &Address, input: &[u8]) -> Self {
        let mut script = self.op(OP_CALL);
        script.code.extend_from_slice(address);
        script.bytes(input)
    }

    /// Create a contract running `code`, with the sender left unset.
    pub fn create(self, code: &[u8]) -> Self {
        self.op(OP_CREATE).bytes(code)
    }

    /// Stop successfully with `data` as output.
    pub fn ret(self, data: &[u8]) -> Self {
        self.op(OP_RETURN).bytes(data)
    }

    pub fn revert(self, data: &[u8]) -> Self {
        self.op(OP_REVERT).bytes(data)
    }

    /// Revert if the most recent CALL or CREATE failed.
    pub fn revert_if_call_failed(self) -> Self {
        self.op(OP_REVERT_IF_CALL_FAILED)
    }

    /// Store the message sender in slot `key`.
    pub fn store_caller(self, key: &[u8]) -> Self {
        self.op(OP_STORE_CALLER).bytes(key)
    }

    /// Store the address of the most recent successful creation in slot `key`.
    pub fn store_created(self, key: &[u8]) -> Self {
        self.op(OP_STORE_CREATED).bytes(key)
    }

    /// Fail outside the status-code protocol.
    pub fn abort(self, reason: &[u8]) -> Self {
        self.op(OP_ABORT).bytes(reason)
    }

    pub fn build(self) -> Vec<u8> {
        self.code
    }

    fn op(mut self, op: u8) -> Self {
        self.code.push(op);
        self
    }

    fn bytes(mut self, data: &[u8]) -> Self {
        debug_assert!(data.len() <= u8::MAX as usize, "script operand too long");
        self.code.push(data.len() as u8);
        self.code.extend_from_slice(data);
        self
    }
}

struct Cursor<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.code.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(slice)
    }

    fn byte(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn bytes(&mut self) -> Option<Vec<u8>> {
        let len = self.byte()? as usize;
        self.take(len).map(<[u8]>::to_vec)
    }

    fn address(&mut self) -> Option<Address> {
        let mut address = ZERO_ADDRESS;
        address.copy_from_slice(self.take(ADDRESS_LEN)?);
        Some(address)
    }
}

fn parse(code: &[u8]) -> Option<Vec<Op>> {
    let mut cursor = Cursor { code, pos: 0 };
    let mut ops = Vec::new();
    while let Some(op) = cursor.byte() {
        ops.push(match op {
            OP_SET => Op::Set(cursor.bytes()?, cursor.bytes()?),
            OP_COPY => Op::Copy(cursor.bytes()?, cursor.bytes()?),
            OP_LOG => Op::Log(cursor.bytes()?),
            OP_CALL => Op::Call(cursor.address()?, cursor.bytes()?),
            OP_CREATE => Op::Create(cursor.bytes()?),
            OP_RETURN => Op::Return(cursor.bytes()?),
            OP_REVERT => Op::Revert(cursor.bytes()?),
            OP_REVERT_IF_CALL_FAILED => Op::RevertIfCallFailed,
            OP_STORE_CALLER => Op::StoreCaller(cursor.bytes()?),
            OP_STORE_CREATED => Op::StoreCreated(cursor.bytes()?),
            OP_ABORT => Op::Abort(cursor.bytes()?),
            _ => return None,
        });
    }
    Some(ops)
}

/// Factory for [`ScriptVm`] instances. Counts the instances it creates.
#[derive(Debug, Default)]
pub struct ScriptVmFactory {
    created: AtomicUsize,
}

impl ScriptVmFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interpreter instances created so far.
    pub fn instances(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl VmFactory for ScriptVmFactory {
    fn create(
        &self,
        _code_hash: &Hash,
        _code: &[u8],
        _revision: Revision,
    ) -> Result<Box<dyn VmInstance>, HostError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptVm))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptVm;

#[async_trait]
impl VmInstance for ScriptVm {
    async fn execute(
        &self,
        host: &mut dyn HostApi,
        _revision: Revision,
        message: &Message,
        code: &[u8],
    ) -> Result<ExecutionResult, HostError> {
        let Some(ops) = parse(code) else {
            return Ok(ExecutionResult::failure(StatusCode::InvalidInstruction));
        };

        let mut gas_left = message.gas;
        let mut last_call_ok = true;
        let mut last_created = ZERO_ADDRESS;

        for op in ops {
            if gas_left < OP_GAS {
                return Ok(ExecutionResult::failure(StatusCode::OutOfGas));
            }
            gas_left -= OP_GAS;

            match op {
                Op::Set(key, value) => host.set(&to_word(&key), &to_word(&value)).await?,
                Op::Copy(src, dst) => {
                    let value = host.get(&to_word(&src)).await?;
                    host.set(&to_word(&dst), &value).await?;
                }
                Op::Log(data) => host.emit_log(Vec::new(), data),
                Op::Call(address, input) => {
                    let nested = Message::call(message.recipient, address, input, gas_left)
                        .nested(message.depth + 1);
                    let result = host.external_call(&nested).await?;
                    last_call_ok = result.is_success();
                    gas_left = gas_left.min(result.gas_left.max(0));
                }
                Op::Create(init_code) => {
                    let nested =
                        Message::create(ZERO_ADDRESS, init_code, gas_left).nested(message.depth + 1);
                    let result = host.external_call(&nested).await?;
                    last_call_ok = result.is_success();
                    if let Some(address) = result.create_address {
                        last_created = address;
                    }
                    gas_left = gas_left.min(result.gas_left.max(0));
                }
                Op::Return(data) => return Ok(ExecutionResult::success(gas_left, data)),
                Op::Revert(data) => return Ok(ExecutionResult::revert(gas_left, data)),
                Op::RevertIfCallFailed => {
                    if !last_call_ok {
                        return Ok(ExecutionResult::revert(gas_left, b"call failed".to_vec()));
                    }
                }
                Op::StoreCaller(key) => host.set(&to_word(&key), &to_word(&message.sender)).await?,
                Op::StoreCreated(key) => host.set(&to_word(&key), &to_word(&last_created)).await?,
                Op::Abort(reason) => {
                    let reason = String::from_utf8_lossy(&reason).into_owned();
                    return Err(anyhow::anyhow!("interpreter aborted: {reason}").into());
                }
            }
        }

        let output = if message.kind.is_create() { code.to_vec() } else { Vec::new() };
        Ok(ExecutionResult::success(gas_left, output))
    }
}
