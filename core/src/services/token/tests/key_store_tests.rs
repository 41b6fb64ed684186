//! Tests for the in-memory key store

use std::sync::Arc;

use super::TEST_KEY_PAIR;
use crate::services::token::{InMemoryKeyStore, KeyStore};

#[tokio::test]
async fn test_getters_return_same_pair() {
    let store = InMemoryKeyStore::new();

    let verification = store.verification_key().await.unwrap();
    let _signing = store.signing_key().await.unwrap();
    let again = store.verification_key().await.unwrap();

    assert_eq!(verification.public_key_pem(), again.public_key_pem());
    assert_eq!(store.generation_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_generates_once() {
    let store = Arc::new(InMemoryKeyStore::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.key_pair().await.unwrap() })
        })
        .collect();

    let mut pems = Vec::new();
    for handle in handles {
        pems.push(handle.await.unwrap().public_key_pem().to_string());
    }

    assert_eq!(store.generation_count(), 1);
    assert!(pems.iter().all(|pem| pem == &pems[0]));
}

#[tokio::test]
async fn test_preloaded_store_never_generates() {
    let store = InMemoryKeyStore::with_key_pair(TEST_KEY_PAIR.clone());

    let verification = store.verification_key().await.unwrap();

    assert_eq!(verification.public_key_pem(), TEST_KEY_PAIR.public_key_pem());
    assert_eq!(store.generation_count(), 0);
}

#[tokio::test]
async fn test_create_key_pair_leaves_active_pair() {
    let store = InMemoryKeyStore::with_key_pair(TEST_KEY_PAIR.clone());

    let fresh = store.create_key_pair().await.unwrap();
    let active = store.key_pair().await.unwrap();

    assert_ne!(fresh.public_key_pem(), active.public_key_pem());
    assert_eq!(active.public_key_pem(), TEST_KEY_PAIR.public_key_pem());
    assert_eq!(store.generation_count(), 1);
}

#[test]
fn test_shared_instance_is_process_wide() {
    assert!(Arc::ptr_eq(&InMemoryKeyStore::shared(), &InMemoryKeyStore::shared()));
}
