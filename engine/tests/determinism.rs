//! Determinism tests: identical inputs always produce identical receipts and
//! identical state, whatever storage stack they run on.

mod common;

use std::sync::Arc;

use tessera_engine::{derive_create_address, Script, ScriptVmFactory, TransactionExecutor};
use tessera_hostapi::{HostConfig, PrecompiledMap};
use tessera_primitives::{codec::encode_receipt, HashAlgorithm, Hasher, Transaction};
use tessera_storage::{
    encode_key, table::contract_table_name, FlatStorage, MultiLayerStorage, Rollbackable,
    StateStorage, TableNamePool, ACCOUNT_CODE_HASH,
};

use common::*;

fn sample_block(h: &Harness) -> Vec<Transaction> {
    let runtime = Script::new().copy(b"in", b"out").log(b"ran").build();
    let init = Script::new()
        .set(b"in", b"seed")
        .create(&Script::new().store_caller(b"creator").build())
        .ret(&runtime)
        .build();
    let created = derive_create_address(h.hasher.as_ref(), 6, 0, 0);
    vec![
        create_tx(init).with_abi("[]"),
        call_tx(created, b""),
        call_tx([0xEE; 20], b""),
        call_tx(created, b""),
    ]
}

// ── Repeated runs ──

#[tokio::test]
async fn test_five_runs_identical_output() {
    let mut runs = Vec::new();
    for _ in 0..5 {
        let mut h = Harness::new();
        let txs = sample_block(&h);
        let receipts = h
            .executor
            .execute_block(&mut h.storage, &header(6), &txs)
            .await
            .unwrap();
        let state: Vec<_> = h
            .storage
            .storage()
            .iter()
            .map(|(key, value)| (key.clone(), value.cloned()))
            .collect();
        runs.push((receipts, state));
    }

    let (first_receipts, first_state) = &runs[0];
    assert!(first_receipts[0].is_success());
    assert!(first_receipts[1].is_success());
    for (i, (receipts, state)) in runs.iter().enumerate().skip(1) {
        assert_eq!(first_receipts, receipts, "run {i} receipts mismatch");
        for (j, (r1, r2)) in first_receipts.iter().zip(receipts).enumerate() {
            assert_eq!(encode_receipt(r1), encode_receipt(r2), "run {i} receipt {j} bytes");
        }
        assert_eq!(first_state, state, "run {i} state mismatch");
    }
}

#[tokio::test]
async fn test_context_id_separates_addresses() {
    let mut h = Harness::new();
    let code = Script::new().build();
    let a = h
        .executor
        .execute_transaction(&mut h.storage, &header(6), &create_tx(code.clone()), 0)
        .await
        .unwrap();
    let b = h
        .executor
        .execute_transaction(&mut h.storage, &header(6), &create_tx(code), 1)
        .await
        .unwrap();
    assert_ne!(a.contract_address, b.contract_address);
}

#[tokio::test]
async fn test_configured_hash_algorithm_drives_addresses() {
    let config = HostConfig {
        hash_algorithm: HashAlgorithm::Blake3,
        ..HostConfig::default()
    };
    let mut h = Harness::with(PrecompiledMap::new(), config);
    let code = Script::new().build();

    let receipt = h
        .executor
        .execute_transaction(&mut h.storage, &header(10), &create_tx(code.clone()), 1)
        .await
        .unwrap();

    let digest = blake3::hash(b"10_1_0");
    assert_eq!(&receipt.contract_address.unwrap()[..], &digest.as_bytes()[..20]);
    assert_eq!(
        h.code_hash_field(&receipt.contract_address.unwrap()).await,
        Some(*blake3::hash(&code).as_bytes())
    );
}

// ── Layered storage ──

#[tokio::test]
async fn test_blocks_over_layered_flat_storage() {
    let pool = Arc::new(TableNamePool::new());
    let executor = TransactionExecutor::new(
        Arc::new(ScriptVmFactory::new()),
        Arc::new(PrecompiledMap::new()),
        HostConfig::default(),
    )
    .with_table_pool(pool.clone());

    let mut layers = MultiLayerStorage::new(FlatStorage::new(pool.clone()));
    layers.new_mutable().unwrap();
    let mut storage = Rollbackable::new(layers);

    let code = Script::new().set(b"k", b"v").build();
    let receipts = executor
        .execute_block(&mut storage, &header(1), &[create_tx(code.clone())])
        .await
        .unwrap();
    let address = receipts[0].contract_address.unwrap();

    // block 2 reads the contract through the frozen layer of block 1
    let mut layers = storage.into_inner();
    layers.push_mutable_to_immutable_front().unwrap();
    layers.new_mutable().unwrap();
    let mut storage = Rollbackable::new(layers);
    let receipts = executor
        .execute_block(&mut storage, &header(2), &[call_tx(address, b"")])
        .await
        .unwrap();
    assert!(receipts[0].is_success());

    let mut layers = storage.into_inner();
    layers.push_mutable_to_immutable_front().unwrap();
    layers.merge_and_pop_immutable_back().await.unwrap();
    layers.merge_and_pop_immutable_back().await.unwrap();
    assert_eq!(layers.immutable_count(), 0);

    let backend = layers.backend().lock().await;
    let table = contract_table_name(&address);
    let flat = encode_key(table.as_bytes(), ACCOUNT_CODE_HASH);
    assert_eq!(
        backend.get_raw(&flat),
        Some(&executor.hasher().hash(&code)[..])
    );
    assert_eq!(
        backend.get_raw(&encode_key(table.as_bytes(), &word(b"k"))),
        Some(&word(b"v")[..])
    );
    assert!(backend.entries().is_ok());
}

#[tokio::test]
async fn test_layered_and_memory_storage_agree() {
    let mut h = Harness::new();
    let txs = sample_block(&h);
    let expected = h
        .executor
        .execute_block(&mut h.storage, &header(6), &txs)
        .await
        .unwrap();

    let mut layers = MultiLayerStorage::new(FlatStorage::new(h.pool.clone()));
    layers.new_mutable().unwrap();
    let mut storage = Rollbackable::new(layers);
    let receipts = h
        .executor
        .execute_block(&mut storage, &header(6), &txs)
        .await
        .unwrap();
    assert_eq!(expected, receipts);

    let created = derive_create_address(h.hasher.as_ref(), 6, 0, 0);
    let key = tessera_storage::StateKey::new(h.pool.contract_table(&created), &word(b"out"));
    assert_eq!(
        storage.read_one(&key).await.unwrap(),
        h.storage.read_one(&key).await.unwrap()
    );
}
