//! # pubkey-store
//!
//! Public key lookup over heterogeneous backing stores.
//!
//! This crate provides:
//! - **Fetcher capability**: [`KeyFetcher`], the single async seam to a backing store
//! - **Normalization**: current JWK-style and legacy PEM-era records become one canonical
//!   [`KeyDescriptor`] shape, with `use` defaulted and `alg` inferred where safe
//! - **Resolution**: [`PublicKeyLookup`] finds a descriptor by `kid`, failing with
//!   [`KeyStoreError::PublicKeyNotFound`] when absent
//!
//! ## Guarantees
//!
//! - Every returned descriptor has `kid`, `kty`, `use` and `alg`
//! - A malformed record is dropped without affecting the others
//! - A non-array payload yields no keys rather than an error
//! - Fetcher errors reach the caller unchanged
//! - Nothing is cached; each lookup fetches again
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pubkey_store::{KeyId, KeyStoreError, MemoryKeyFetcher, PublicKeyLookup, PublicKeyStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let fetcher = MemoryKeyFetcher::with_records([
//!     r#"{"kid":"a","kty":"EC","crv":"P-256","x":"x","y":"y"}"#,
//!     r#"{"kid":"b","n":"n","e":"AQAB","pem":"..."}"#,
//! ]);
//! let store = PublicKeyStore::new(Arc::new(fetcher));
//!
//! let keys = store.lookup_public_keys().await.unwrap();
//! assert_eq!(keys[0].alg, "ES256");
//! assert_eq!(keys[1].alg, "RS256");
//!
//! let err = store.lookup_public_key(&KeyId::from("c")).await.unwrap_err();
//! assert!(matches!(err, KeyStoreError::PublicKeyNotFound { .. }));
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Algorithm inference.
pub mod algorithm;
/// Canonical descriptor types.
pub mod descriptor;
/// Error types.
pub mod error;
/// Backing-store capability.
pub mod fetcher;
/// In-memory fetcher.
pub mod memory;
/// Record normalization.
pub mod normalize;
/// Key resolution.
pub mod store;
/// Test helpers.
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

// Re-export key types for convenience
pub use descriptor::{KeyDescriptor, KeyId, KeyParams, KeyType};
pub use error::{BoxError, FetchError, FetchResult, KeyStoreError, Result};
pub use fetcher::{KeyFetcher, RawKeyRecords, raw_key_records};
pub use memory::MemoryKeyFetcher;
pub use normalize::{NormalizeReport, RejectReason, RejectedRecord, normalize, normalize_with_report};
pub use store::{PublicKeyLookup, PublicKeyStore, find_key};
