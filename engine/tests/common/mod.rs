//! Shared test helpers for engine integration tests.
//!
//! Provides a harness bundling the scripted interpreter, a precompiled
//! registry, an executor and an in-memory rollbackable storage, plus helpers
//! to inspect contract tables and the code table directly.

#![allow(dead_code)]

use std::sync::Arc;

use tessera_engine::{HostEnv, ScriptVmFactory, TransactionExecutor};
use tessera_hostapi::{HostConfig, PrecompiledMap};
use tessera_primitives::{
    types::to_word, Address, BlockHeader, Bytes32, Hash, Hasher, Transaction,
};
use tessera_storage::{
    MemoryStorage, Rollbackable, StateKey, StateStorage, TableNamePool, ACCOUNT_CODE_HASH,
    SYS_CODE_BINARY, SYS_CONTRACT_ABI,
};

pub type TestStorage = Rollbackable<MemoryStorage>;

/// Gas given to every test transaction.
pub const GAS: i64 = 1_000_000;

// ── Accounts ──

pub const ALICE: Address = [0xA1; 20];
pub const PARENT: Address = [0xB0; 20];
pub const CHILD: Address = [0xC0; 20];
pub const OTHER: Address = [0xD0; 20];

pub fn header(number: i64) -> BlockHeader {
    BlockHeader {
        number,
        version: 3,
        timestamp: 1_700_000_000,
        parent_hash: [0x11; 32],
    }
}

pub fn call_tx(to: Address, input: &[u8]) -> Transaction {
    Transaction::call(ALICE, to, input.to_vec(), GAS)
}

pub fn create_tx(code: Vec<u8>) -> Transaction {
    Transaction::create(ALICE, code, GAS)
}

/// Everything needed to run transactions in a test.
pub struct Harness {
    pub factory: Arc<ScriptVmFactory>,
    pub precompiled: Arc<PrecompiledMap>,
    pub config: HostConfig,
    pub hasher: Arc<dyn Hasher>,
    pub pool: Arc<TableNamePool>,
    pub executor: TransactionExecutor,
    pub storage: TestStorage,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(PrecompiledMap::new(), HostConfig::default())
    }

    pub fn with_precompiled(precompiled: PrecompiledMap) -> Self {
        Self::with(precompiled, HostConfig::default())
    }

    pub fn with(precompiled: PrecompiledMap, config: HostConfig) -> Self {
        let factory = Arc::new(ScriptVmFactory::new());
        let precompiled = Arc::new(precompiled);
        let pool = Arc::new(TableNamePool::new());
        let executor =
            TransactionExecutor::new(factory.clone(), precompiled.clone(), config.clone())
                .with_table_pool(pool.clone());
        Self {
            factory,
            precompiled,
            hasher: config.hasher(),
            config,
            pool,
            executor,
            storage: Rollbackable::new(MemoryStorage::new()),
        }
    }

    /// A host environment over this harness's collaborators.
    pub fn env<'a>(&'a self, header: &'a BlockHeader, context_id: i64) -> HostEnv<'a> {
        HostEnv {
            vm_factory: self.factory.as_ref(),
            precompiled: self.precompiled.as_ref(),
            table_pool: &self.pool,
            hasher: self.hasher.as_ref(),
            config: &self.config,
            block_header: header,
            origin: ALICE,
            context_id,
        }
    }

    /// Move the storage out, e.g. to drive a `HostContext` directly while
    /// borrowing the harness for its environment.
    pub fn take_storage(&mut self) -> TestStorage {
        std::mem::take(&mut self.storage)
    }

    /// Install `code` at `address` without running it.
    pub async fn deploy(&mut self, address: Address, code: Vec<u8>) -> Hash {
        self.executor
            .deploy_code(&mut self.storage, address, code, None)
            .await
            .unwrap()
    }

    /// Raw value of slot `key` in the table of `address`.
    pub async fn slot(&self, address: &Address, key: &[u8]) -> Option<Bytes32> {
        let state_key = StateKey::new(self.pool.contract_table(address), &to_word(key));
        self.storage
            .read_one(&state_key)
            .await
            .unwrap()
            .map(|entry| to_word(entry.get()))
    }

    /// The code-hash field of `address`.
    pub async fn code_hash_field(&self, address: &Address) -> Option<Hash> {
        let state_key = StateKey::new(self.pool.contract_table(address), ACCOUNT_CODE_HASH);
        self.storage
            .read_one(&state_key)
            .await
            .unwrap()
            .map(|entry| to_word(entry.get()))
    }

    /// Code stored under `code_hash` in the code table.
    pub async fn code(&self, code_hash: &Hash) -> Option<Vec<u8>> {
        let state_key = StateKey::new(self.pool.intern(SYS_CODE_BINARY.as_bytes()), code_hash);
        self.storage
            .read_one(&state_key)
            .await
            .unwrap()
            .map(|entry| entry.get().to_vec())
    }

    /// ABI stored under `code_hash`.
    pub async fn abi(&self, code_hash: &Hash) -> Option<String> {
        let state_key = StateKey::new(self.pool.intern(SYS_CONTRACT_ABI.as_bytes()), code_hash);
        self.storage
            .read_one(&state_key)
            .await
            .unwrap()
            .map(|entry| String::from_utf8_lossy(entry.get()).into_owned())
    }

    /// Number of live entries in the code table.
    pub fn code_table_len(&self) -> usize {
        self.storage
            .storage()
            .iter()
            .filter(|(key, value)| {
                key.table.as_bytes() == SYS_CODE_BINARY.as_bytes() && value.is_some()
            })
            .count()
    }

    /// Number of live entries across all tables.
    pub fn live_entries(&self) -> usize {
        self.storage
            .storage()
            .iter()
            .filter(|(_, value)| value.is_some())
            .count()
    }
}

/// A 32-byte word from a short byte string, as the scripted interpreter
/// stores it.
pub fn word(bytes: &[u8]) -> Bytes32 {
    to_word(bytes)
}
