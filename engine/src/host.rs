//! Execution host: runs one message and dispatches its nested messages.
//!
//! A `HostContext` owns the execution of a single message:
//!
//! 1. Resolve the target table (constructor; CREATE derives a fresh address)
//! 2. Load or store code
//! 3. Take a savepoint and drive the interpreter
//! 4. Roll back to the savepoint if the interpreter reports failure
//!
//! Nested messages arrive through [`HostApi::external_call`]. Each one either
//! short-circuits to a precompiled contract or builds a child host that
//! borrows the same storage and call-sequence counter for the duration of
//! the call.
//!
//! Errors returned as `Err(HostError)` are fatal and abort the transaction.
//! Interpreter failures are ordinary results with a non-success status.

use std::borrow::Cow;

use async_trait::async_trait;
use log::{debug, trace};
use tessera_hostapi::{
    precompiled_address, HostApi, HostConfig, HostError, PrecompiledRegistry, VmFactory,
};
use tessera_primitives::{
    types::{to_hex, to_word, ADDRESS_LEN},
    Address, BlockHeader, BlockNumber, Bytes32, CallKind, ExecutionResult, Hash, Hasher,
    LogEntry, Message, ZERO_ADDRESS, ZERO_HASH, ZERO_WORD,
};
use tessera_storage::{
    Entry, StateKey, TableName, TableNamePool, TransactionalStorage, ACCOUNT_CODE_HASH,
    SYS_CODE_BINARY, SYS_CONTRACT_ABI,
};

/// Call-tree-wide collaborators, copied into every child host.
#[derive(Clone, Copy)]
pub struct HostEnv<'a> {
    pub vm_factory: &'a dyn VmFactory,
    pub precompiled: &'a dyn PrecompiledRegistry,
    pub table_pool: &'a TableNamePool,
    pub hasher: &'a dyn Hasher,
    pub config: &'a HostConfig,
    pub block_header: &'a BlockHeader,
    /// Sender of the top-level transaction.
    pub origin: Address,
    /// Index of the transaction within its block.
    pub context_id: i64,
}

/// Lifecycle of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Created,
    Executing,
    Committed,
    RolledBack,
}

/// Derive the address of a contract created at `(number, context_id, seq)`.
///
/// The address is the first 20 bytes of the hash of the decimal string
/// `"{number}_{context_id}_{seq}"`.
pub fn derive_create_address(
    hasher: &dyn Hasher,
    number: BlockNumber,
    context_id: i64,
    seq: i64,
) -> Address {
    let digest = hasher.hash(format!("{number}_{context_id}_{seq}").as_bytes());
    let mut address = ZERO_ADDRESS;
    address.copy_from_slice(&digest[..ADDRESS_LEN]);
    address
}

pub struct HostContext<'a, S> {
    env: HostEnv<'a>,
    storage: &'a mut S,
    seq: &'a mut i64,
    message: &'a Message,
    contract_address: Address,
    my_table: TableName,
    code_table: TableName,
    abi_table: TableName,
    abi: Option<&'a str>,
    logs: Vec<LogEntry>,
    state: HostState,
}

impl<'a, S: TransactionalStorage> HostContext<'a, S> {
    /// Create a host for `message`.
    ///
    /// CREATE messages get a fresh address derived from the block number,
    /// the context id and the current call sequence. CREATE2 is not
    /// supported and fails here.
    pub fn new(
        env: HostEnv<'a>,
        storage: &'a mut S,
        seq: &'a mut i64,
        message: &'a Message,
    ) -> Result<Self, HostError> {
        let contract_address = match message.kind {
            CallKind::Create => {
                derive_create_address(env.hasher, env.block_header.number, env.context_id, *seq)
            }
            CallKind::Create2 => return Err(HostError::Unsupported("CREATE2")),
            CallKind::Call | CallKind::DelegateCall | CallKind::CallCode => message.recipient,
        };

        Ok(Self {
            my_table: env.table_pool.contract_table(&contract_address),
            code_table: env.table_pool.intern(SYS_CODE_BINARY.as_bytes()),
            abi_table: env.table_pool.intern(SYS_CONTRACT_ABI.as_bytes()),
            env,
            storage,
            seq,
            message,
            contract_address,
            abi: None,
            logs: Vec::new(),
            state: HostState::Created,
        })
    }

    /// Attach ABI metadata stored alongside the code of a successful creation.
    pub fn with_abi(mut self, abi: Option<&'a str>) -> Self {
        self.abi = abi;
        self
    }

    /// Execute the message. A host executes at most once.
    pub async fn execute(&mut self) -> Result<ExecutionResult, HostError> {
        if self.state != HostState::Created {
            let address = to_hex(&self.contract_address);
            return Err(anyhow::anyhow!("host for {address} executed twice").into());
        }
        self.state = HostState::Executing;
        debug!(
            "executing {:?} at {} (depth {}, seq {})",
            self.message.kind,
            to_hex(&self.contract_address),
            self.message.depth,
            *self.seq
        );

        let result = if self.message.kind.is_create() {
            self.create().await
        } else {
            self.call().await
        };

        match &result {
            Ok(result) if result.is_success() => self.state = HostState::Committed,
            Ok(result) => {
                debug!(
                    "{} finished with {}, discarding {} logs",
                    to_hex(&self.contract_address),
                    result.status,
                    self.logs.len()
                );
                self.state = HostState::RolledBack;
                self.logs.clear();
            }
            Err(_) => {
                self.state = HostState::RolledBack;
                self.logs.clear();
            }
        }
        result
    }

    async fn create(&mut self) -> Result<ExecutionResult, HostError> {
        let message = self.message;
        let revision = self.env.config.revision;
        let code_hash = self.env.hasher.hash(&message.input);
        let vm = self
            .env
            .vm_factory
            .create(&code_hash, &message.input, revision)?;

        let savepoint = self.storage.current();
        let mut result = vm.execute(&mut *self, revision, message, &message.input).await?;
        if !result.is_success() {
            self.storage.rollback(savepoint).await?;
            return Ok(result);
        }

        let code = result.output.clone();
        match self.abi {
            Some(abi) => self.set_code_and_abi(code, abi).await?,
            None => self.set_code(code).await?,
        };
        result.create_address = Some(self.contract_address);
        Ok(result)
    }

    async fn call(&mut self) -> Result<ExecutionResult, HostError> {
        let message = self.message;
        let revision = self.env.config.revision;
        let (code_hash, code) = match self.load_code(&message.code_address).await? {
            Some((hash, code)) if !code.is_empty() => (hash, code),
            _ => return Err(HostError::NotFoundCode(message.code_address)),
        };
        let vm = self.env.vm_factory.create(&code_hash, &code, revision)?;

        let savepoint = self.storage.current();
        let result = vm.execute(&mut *self, revision, message, &code).await?;
        if !result.is_success() {
            self.storage.rollback(savepoint).await?;
        }
        Ok(result)
    }

    // ── Code storage ──

    /// Store `code` as this contract's code.
    ///
    /// The code table is keyed by code hash and written only once per hash;
    /// the contract's own code-hash field is always overwritten.
    pub async fn set_code(&mut self, code: Vec<u8>) -> Result<Hash, HostError> {
        let code_hash = self.env.hasher.hash(&code);
        let code_key = StateKey::new(self.code_table.clone(), &code_hash);
        if !self.storage.exists_one(&code_key).await? {
            trace!("storing {} bytes of code under {}", code.len(), to_hex(&code_hash));
            self.storage.write_one(code_key, Entry::from(code)).await?;
        }
        let hash_key = StateKey::new(self.my_table.clone(), ACCOUNT_CODE_HASH);
        self.storage
            .write_one(hash_key, Entry::from(code_hash.to_vec()))
            .await?;
        Ok(code_hash)
    }

    /// Store `code` and attach `abi` to its hash unless ABI is already
    /// attached.
    pub async fn set_code_and_abi(&mut self, code: Vec<u8>, abi: &str) -> Result<Hash, HostError> {
        let code_hash = self.set_code(code).await?;
        let abi_key = StateKey::new(self.abi_table.clone(), &code_hash);
        if !self.storage.exists_one(&abi_key).await? {
            self.storage
                .write_one(abi_key, Entry::from(abi.to_owned()))
                .await?;
        }
        Ok(code_hash)
    }

    async fn load_code_hash(&self, address: &Address) -> Result<Option<Hash>, HostError> {
        let table = self.env.table_pool.contract_table(address);
        let entry = self
            .storage
            .read_one(&StateKey::new(table, ACCOUNT_CODE_HASH))
            .await?;
        Ok(entry.map(|entry| to_word(entry.get())))
    }

    async fn load_code(&self, address: &Address) -> Result<Option<(Hash, Vec<u8>)>, HostError> {
        let Some(code_hash) = self.load_code_hash(address).await? else {
            return Ok(None);
        };
        let entry = self
            .storage
            .read_one(&StateKey::new(self.code_table.clone(), &code_hash))
            .await?;
        Ok(entry.map(|entry| (code_hash, entry.get().to_vec())))
    }

    // ── Accessors ──

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn block_version(&self) -> u32 {
        self.env.block_header.version
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn into_logs(self) -> Vec<LogEntry> {
        self.logs
    }
}

#[async_trait]
impl<'a, S: TransactionalStorage> HostApi for HostContext<'a, S> {
    async fn get(&self, key: &Bytes32) -> Result<Bytes32, HostError> {
        let entry = self
            .storage
            .read_one(&StateKey::new(self.my_table.clone(), key))
            .await?;
        Ok(entry.map_or(ZERO_WORD, |entry| to_word(entry.get())))
    }

    async fn set(&mut self, key: &Bytes32, value: &Bytes32) -> Result<(), HostError> {
        let key = StateKey::new(self.my_table.clone(), key);
        self.storage.write_one(key, Entry::from(value.to_vec())).await?;
        Ok(())
    }

    async fn code_at(&self, address: &Address) -> Result<Vec<u8>, HostError> {
        Ok(self
            .load_code(address)
            .await?
            .map(|(_, code)| code)
            .unwrap_or_default())
    }

    async fn code_size_at(&self, address: &Address) -> Result<usize, HostError> {
        Ok(self.code_at(address).await?.len())
    }

    async fn code_hash_at(&self, address: &Address) -> Result<Hash, HostError> {
        Ok(self.load_code_hash(address).await?.unwrap_or(ZERO_HASH))
    }

    /// An account exists if a precompiled contract is registered at its
    /// address or it has code.
    async fn exists(&self, address: &Address) -> Result<bool, HostError> {
        let precompiled = precompiled_address(address, self.env.config.max_precompiled_address)
            .and_then(|n| self.env.precompiled.get(n))
            .is_some();
        if precompiled {
            return Ok(true);
        }
        Ok(self.load_code_hash(address).await?.is_some())
    }

    fn block_hash(&self, _number: BlockNumber) -> Result<Hash, HostError> {
        Err(HostError::Unsupported("blockHash"))
    }

    fn block_number(&self) -> BlockNumber {
        self.env.block_header.number
    }

    fn timestamp(&self) -> i64 {
        self.env.block_header.timestamp
    }

    fn origin(&self) -> Address {
        self.env.origin
    }

    fn block_gas_limit(&self) -> i64 {
        self.env.config.block_gas_limit
    }

    fn emit_log(&mut self, topics: Vec<Hash>, data: Vec<u8>) {
        self.logs.push(LogEntry {
            address: self.contract_address,
            topics,
            data,
        });
    }

    async fn external_call(&mut self, message: &Message) -> Result<ExecutionResult, HostError> {
        let max = self.env.config.max_precompiled_address;
        if let Some(n) = precompiled_address(&message.code_address, max) {
            if let Some(handler) = self.env.precompiled.get(n) {
                trace!("precompiled call to {n}");
                return Ok(handler.call(message));
            }
        }

        *self.seq += 1;
        trace!(
            "nested {:?} from {} to {} (seq {})",
            message.kind,
            to_hex(&message.sender),
            to_hex(&message.code_address),
            *self.seq
        );

        let message = if message.kind == CallKind::Create && message.sender == ZERO_ADDRESS {
            let mut message = message.clone();
            message.sender = self.contract_address;
            Cow::Owned(message)
        } else {
            Cow::Borrowed(message)
        };

        let mut child = HostContext::new(self.env, &mut *self.storage, &mut *self.seq, &message)?;
        let result = child.execute().await?;
        if result.is_success() {
            self.logs.extend(child.into_logs());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_primitives::Keccak256Hasher;

    #[test]
    fn test_create_address_is_hash_prefix() {
        let hasher = Keccak256Hasher;
        let address = derive_create_address(&hasher, 10, 1, 0);
        assert_eq!(&address[..], &hasher.hash(b"10_1_0")[..20]);
    }

    #[test]
    fn test_create_address_depends_on_every_input() {
        let hasher = Keccak256Hasher;
        let base = derive_create_address(&hasher, 10, 1, 0);
        assert_eq!(base, derive_create_address(&hasher, 10, 1, 0));
        assert_ne!(base, derive_create_address(&hasher, 11, 1, 0));
        assert_ne!(base, derive_create_address(&hasher, 10, 2, 0));
        assert_ne!(base, derive_create_address(&hasher, 10, 1, 1));
    }

    #[test]
    fn test_create_address_negative_block_number() {
        let hasher = Keccak256Hasher;
        let address = derive_create_address(&hasher, -1, 0, 0);
        assert_eq!(&address[..], &hasher.hash(b"-1_0_0")[..20]);
    }
}
