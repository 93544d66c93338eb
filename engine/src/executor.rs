//! Transaction executor: turns transactions into receipts.
//!
//! `TransactionExecutor::execute_block` runs a block's transactions in
//! order:
//!
//! 1. Validate the transaction and build its top-level message
//! 2. Take a savepoint
//! 3. Run a fresh host tree with its own call-sequence counter
//! 4. Produce a receipt
//!
//! A fatal error in one transaction rolls that transaction back to its
//! savepoint and yields a failed receipt. It does NOT abort the block.

use std::sync::Arc;

use log::{debug, warn};
use tessera_hostapi::{HostConfig, HostError, PrecompiledRegistry, VmFactory};
use tessera_primitives::{
    Address, BlockHeader, Hash, Hasher, Message, Receipt, Transaction, ZERO_ADDRESS,
};
use tessera_storage::{TableNamePool, TransactionalStorage};

use crate::host::{HostContext, HostEnv};
use crate::validation::validate_transaction;

/// Executes transactions against a transactional storage.
///
/// Holds no per-transaction state: every call builds a fresh host tree and
/// call-sequence counter.
pub struct TransactionExecutor {
    vm_factory: Arc<dyn VmFactory>,
    precompiled: Arc<dyn PrecompiledRegistry>,
    config: HostConfig,
    hasher: Arc<dyn Hasher>,
    table_pool: Arc<TableNamePool>,
}

impl TransactionExecutor {
    /// Create an executor with its own table-name pool. The hasher follows
    /// `config.hash_algorithm`.
    pub fn new(
        vm_factory: Arc<dyn VmFactory>,
        precompiled: Arc<dyn PrecompiledRegistry>,
        config: HostConfig,
    ) -> Self {
        Self {
            vm_factory,
            precompiled,
            hasher: config.hasher(),
            config,
            table_pool: Arc::new(TableNamePool::new()),
        }
    }

    /// Share an existing table-name pool.
    pub fn with_table_pool(mut self, table_pool: Arc<TableNamePool>) -> Self {
        self.table_pool = table_pool;
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn hasher(&self) -> &dyn Hasher {
        self.hasher.as_ref()
    }

    pub fn table_pool(&self) -> &Arc<TableNamePool> {
        &self.table_pool
    }

    fn env<'a>(&'a self, header: &'a BlockHeader, origin: Address, context_id: i64) -> HostEnv<'a> {
        HostEnv {
            vm_factory: self.vm_factory.as_ref(),
            precompiled: self.precompiled.as_ref(),
            table_pool: &self.table_pool,
            hasher: self.hasher.as_ref(),
            config: &self.config,
            block_header: header,
            origin,
            context_id,
        }
    }

    /// Execute one transaction.
    ///
    /// Interpreter failures produce a receipt with a non-success status and
    /// leave storage unchanged. Fatal errors are returned as `Err` after the
    /// transaction's writes have been rolled back.
    pub async fn execute_transaction<S: TransactionalStorage>(
        &self,
        storage: &mut S,
        header: &BlockHeader,
        tx: &Transaction,
        context_id: i64,
    ) -> Result<Receipt, HostError> {
        validate_transaction(tx, &self.config)?;

        let savepoint = storage.current();
        match self.run_transaction(&mut *storage, header, tx, context_id).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                storage.rollback(savepoint).await?;
                Err(err)
            }
        }
    }

    async fn run_transaction<S: TransactionalStorage>(
        &self,
        storage: &mut S,
        header: &BlockHeader,
        tx: &Transaction,
        context_id: i64,
    ) -> Result<Receipt, HostError> {
        let mut message = match tx.to {
            Some(to) => Message::call(tx.sender, to, tx.input.clone(), tx.gas),
            None => Message::create(tx.sender, tx.input.clone(), tx.gas),
        };
        message.value = tx.value;

        let mut seq = 0;
        let env = self.env(header, tx.sender, context_id);
        let mut host =
            HostContext::new(env, storage, &mut seq, &message)?.with_abi(tx.abi.as_deref());
        let result = host.execute().await?;
        let logs = host.into_logs();

        debug!(
            "transaction {context_id} in block {} finished with {} ({} nested dispatches)",
            header.number, result.status, seq
        );

        let success = result.is_success();
        Ok(Receipt {
            status: result.status,
            gas_used: tx.gas - result.gas_left,
            output: result.output,
            contract_address: result.create_address.filter(|_| success),
            logs: if success { logs } else { Vec::new() },
            block_number: header.number,
        })
    }

    /// Execute a block's transactions in order, one receipt per transaction.
    ///
    /// Each transaction runs with `context_id` set to its index. A fatal
    /// transaction leaves no writes and yields a failed receipt; only a
    /// storage failure aborts the block.
    pub async fn execute_block<S: TransactionalStorage>(
        &self,
        storage: &mut S,
        header: &BlockHeader,
        transactions: &[Transaction],
    ) -> Result<Vec<Receipt>, HostError> {
        let mut receipts = Vec::with_capacity(transactions.len());
        for (index, tx) in transactions.iter().enumerate() {
            let receipt = match self
                .execute_transaction(&mut *storage, header, tx, index as i64)
                .await
            {
                Ok(receipt) => receipt,
                Err(err) if err.is_storage() => return Err(err),
                Err(err) => {
                    warn!("transaction {index} in block {} aborted: {err}", header.number);
                    Receipt {
                        status: err.status_code(),
                        gas_used: 0,
                        output: err.to_string().into_bytes(),
                        contract_address: None,
                        logs: Vec::new(),
                        block_number: header.number,
                    }
                }
            };
            receipts.push(receipt);
        }
        Ok(receipts)
    }

    /// Install `code` (and optional `abi`) as the code of `address` without
    /// running it. Returns the code hash.
    pub async fn deploy_code<S: TransactionalStorage>(
        &self,
        storage: &mut S,
        address: Address,
        code: Vec<u8>,
        abi: Option<&str>,
    ) -> Result<Hash, HostError> {
        let header = BlockHeader::with_number(0);
        let message = Message::call(ZERO_ADDRESS, address, Vec::new(), 0);
        let mut seq = 0;
        let env = self.env(&header, ZERO_ADDRESS, 0);
        let mut host = HostContext::new(env, storage, &mut seq, &message)?;
        match abi {
            Some(abi) => host.set_code_and_abi(code, abi).await,
            None => host.set_code(code).await,
        }
    }
}
