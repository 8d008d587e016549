//! Key resolution on top of a [`KeyFetcher`].
//!
//! [`PublicKeyLookup`] is the interface exposed to callers such as a token
//! verification layer. [`PublicKeyStore`] implements it by fetching raw
//! records through an injected [`KeyFetcher`] and normalizing them on every
//! call.
//!
//! # Flow
//!
//! ```text
//! lookup_public_key(kid)
//!   └─► lookup_public_keys()
//!         └─► KeyFetcher::fetch_raw_key_records()   (only suspension point)
//!         └─► normalize()                           (sync, no I/O)
//!   └─► first descriptor with descriptor.kid == kid
//! ```
//!
//! Nothing is cached: two lookups perform two fetches.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pubkey_store::{KeyId, MemoryKeyFetcher, PublicKeyLookup, PublicKeyStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let fetcher = MemoryKeyFetcher::with_records([
//!     r#"{"kid":"key-1","n":"some-n","e":"AQAB","pem":"..."}"#,
//! ]);
//! let store = PublicKeyStore::new(Arc::new(fetcher));
//!
//! let key = store.lookup_public_key(&KeyId::from("key-1")).await.unwrap();
//! assert_eq!(key.alg, "RS256");
//! # });
//! ```

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use fail::fail_point;

use crate::{
    descriptor::{KeyDescriptor, KeyId},
    error::{FetchError, KeyStoreError, Result},
    fetcher::KeyFetcher,
    normalize::{NormalizeReport, normalize_with_report},
};

/// Public key lookup interface.
///
/// Implementors provide [`lookup_public_keys`](Self::lookup_public_keys);
/// [`lookup_public_key`](Self::lookup_public_key) is derived from it.
#[async_trait]
pub trait PublicKeyLookup: Send + Sync {
    /// Returns every normalized public key currently held by the backing store.
    ///
    /// Records that fail to normalize are dropped; this never fails because
    /// of record contents. An empty list means either "no keys" or "no usable
    /// keys".
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Fetch`] when the backing store fails.
    async fn lookup_public_keys(&self) -> Result<Vec<KeyDescriptor>>;

    /// Returns the public key whose `kid` equals `kid`.
    ///
    /// Comparison is strict: a string `"456"` does not match a numeric `456`.
    /// If several descriptors share the `kid`, the first one wins.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::PublicKeyNotFound`] carrying `kid` if no key matches
    /// - [`KeyStoreError::Fetch`] if the backing store fails; this is never reported as not-found
    #[tracing::instrument(skip(self, kid), fields(kid = %kid))]
    async fn lookup_public_key(&self, kid: &KeyId) -> Result<KeyDescriptor> {
        let keys = self.lookup_public_keys().await?;
        match find_key(&keys, kid) {
            Some(key) => Ok(key.clone()),
            None => {
                tracing::debug!(available = keys.len(), "public key not found");
                Err(KeyStoreError::public_key_not_found(kid.clone()))
            },
        }
    }
}

/// Returns the first descriptor whose `kid` equals `kid`.
#[must_use]
pub fn find_key<'a>(keys: &'a [KeyDescriptor], kid: &KeyId) -> Option<&'a KeyDescriptor> {
    keys.iter().find(|key| key.kid == *kid)
}

/// [`PublicKeyLookup`] backed by an injected [`KeyFetcher`].
///
/// Holds no mutable state, so a single instance can be shared across tasks
/// behind an `Arc` and queried concurrently.
#[derive(Clone)]
pub struct PublicKeyStore {
    fetcher: Arc<dyn KeyFetcher>,
}

impl PublicKeyStore {
    /// Creates a store that reads raw key records from `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self { fetcher }
    }

    /// Returns the underlying fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &Arc<dyn KeyFetcher> {
        &self.fetcher
    }

    /// Fetches and normalizes, returning the full report including dropped records.
    ///
    /// Useful for diagnostics: [`lookup_public_keys`](PublicKeyLookup::lookup_public_keys)
    /// cannot tell "no keys" from "all keys malformed", the report can.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Fetch`] when the backing store fails.
    pub async fn lookup_report(&self) -> Result<NormalizeReport> {
        fail_point!("store-before-fetch", |_| {
            Err(KeyStoreError::Fetch(FetchError::internal("injected failure before fetch")))
        });

        let records = self.fetcher.fetch_raw_key_records().await.map_err(|err| {
            tracing::debug!(error = %err, "key fetch failed");
            KeyStoreError::from(err)
        })?;

        Ok(normalize_with_report(&records))
    }
}

impl fmt::Debug for PublicKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeyStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl PublicKeyLookup for PublicKeyStore {
    #[tracing::instrument(skip(self))]
    async fn lookup_public_keys(&self) -> Result<Vec<KeyDescriptor>> {
        Ok(self.lookup_report().await?.descriptors)
    }
}
