//! In-memory [`KeyFetcher`] for tests and development.
//!
//! [`MemoryKeyFetcher`] serves a payload held in memory. The payload can be
//! replaced at any time, and a [`FetchError`] can be primed to simulate a
//! failing backing store.
//!
//! # Examples
//!
//! ```
//! use pubkey_store::{FetchError, KeyFetcher, MemoryKeyFetcher};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let fetcher = MemoryKeyFetcher::with_records([r#"{"kid":"k1","n":"abc","e":"AQAB"}"#]);
//! assert!(fetcher.fetch_raw_key_records().await.is_ok());
//!
//! fetcher.fail_with(FetchError::timeout());
//! assert!(fetcher.fetch_raw_key_records().await.is_err());
//! # });
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::{FetchError, FetchResult},
    fetcher::{KeyFetcher, RawKeyRecords, raw_key_records},
};

#[derive(Debug)]
struct MemoryState {
    payload: RawKeyRecords,
    failure: Option<FetchError>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self { payload: raw_key_records(Vec::<String>::new()), failure: None }
    }
}

/// In-memory implementation of [`KeyFetcher`].
///
/// Clones share the same state, so a test can keep a handle while the store
/// owns another.
///
/// # Thread Safety
///
/// Uses [`parking_lot::RwLock`] for the payload; fetches only take the read lock.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyFetcher {
    state: Arc<RwLock<MemoryState>>,
    fetch_count: Arc<AtomicU64>,
}

impl MemoryKeyFetcher {
    /// Creates a fetcher serving an empty record list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher serving the given serialized records.
    #[must_use]
    pub fn with_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_payload(raw_key_records(records))
    }

    /// Creates a fetcher serving an arbitrary payload, including non-array shapes.
    #[must_use]
    pub fn with_payload(payload: RawKeyRecords) -> Self {
        let fetcher = Self::default();
        fetcher.set_payload(payload);
        fetcher
    }

    /// Replaces the served records.
    pub fn set_records<I, S>(&self, records: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_payload(raw_key_records(records));
    }

    /// Replaces the served payload.
    pub fn set_payload(&self, payload: RawKeyRecords) {
        self.state.write().payload = payload;
    }

    /// Makes every subsequent fetch fail with `error` until [`clear_failure`](Self::clear_failure).
    pub fn fail_with(&self, error: FetchError) {
        self.state.write().failure = Some(error);
    }

    /// Removes a failure set by [`fail_with`](Self::fail_with).
    pub fn clear_failure(&self) {
        self.state.write().failure = None;
    }

    /// Returns how many fetches have been attempted, including failed ones.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl KeyFetcher for MemoryKeyFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch_raw_key_records(&self) -> FetchResult<RawKeyRecords> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read();
        match &state.failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.payload.clone()),
        }
    }
}
