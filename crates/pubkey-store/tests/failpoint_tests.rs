#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection in the lookup path.
//!
//! These tests require both `failpoints` and `testutil` features:
//! ```bash
//! cargo test -p pubkey-store --features failpoints,testutil --test failpoint_tests
//! ```

use std::sync::Arc;

use pubkey_store::{
    FetchError, KeyId, KeyStoreError, MemoryKeyFetcher, PublicKeyLookup, PublicKeyStore,
    testutil::legacy_rsa_record,
};

fn setup_store() -> (PublicKeyStore, Arc<MemoryKeyFetcher>) {
    let fetcher = Arc::new(MemoryKeyFetcher::with_records([legacy_rsa_record("fp-key")]));
    (PublicKeyStore::new(fetcher.clone()), fetcher)
}

#[tokio::test]
async fn store_fetch_failpoint_returns_fetch_error() {
    let scenario = fail::FailScenario::setup();
    let (store, fetcher) = setup_store();

    fail::cfg("store-before-fetch", "return").expect("failed to configure fail point");

    let err = store.lookup_public_key(&KeyId::from("fp-key")).await.expect_err("should fail");
    assert!(matches!(err, KeyStoreError::Fetch(FetchError::Internal { .. })));
    // The fetcher is never reached.
    assert_eq!(fetcher.fetch_count(), 0);

    scenario.teardown();
}

#[tokio::test]
async fn store_fetch_without_failpoint_succeeds() {
    let scenario = fail::FailScenario::setup();
    let (store, fetcher) = setup_store();

    let key = store.lookup_public_key(&KeyId::from("fp-key")).await;
    assert!(key.is_ok(), "lookup should succeed without fail point");
    assert_eq!(fetcher.fetch_count(), 1);

    scenario.teardown();
}
