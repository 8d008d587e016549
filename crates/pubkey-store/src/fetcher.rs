//! The backing-store capability consumed by the lookup layer.
//!
//! A [`KeyFetcher`] is the only place I/O happens. It returns the raw payload
//! of the backing store: normally a JSON array whose elements are serialized
//! key records. Fetchers do not normalize; anything they return is handed to
//! [`normalize`](crate::normalize::normalize) as-is.
//!
//! # Usage
//!
//! ```no_run
//! use async_trait::async_trait;
//! use pubkey_store::{FetchResult, KeyFetcher, RawKeyRecords, raw_key_records};
//!
//! struct StaticFetcher;
//!
//! #[async_trait]
//! impl KeyFetcher for StaticFetcher {
//!     async fn fetch_raw_key_records(&self) -> FetchResult<RawKeyRecords> {
//!         Ok(raw_key_records([r#"{"kid":"k1","n":"abc","e":"AQAB"}"#]))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::FetchResult;

/// Raw payload returned by a backing store.
///
/// The expected shape is an array of strings, each a serialized key record.
/// Any other shape is tolerated and normalizes to an empty key list.
pub type RawKeyRecords = serde_json::Value;

/// Source of raw public key records.
///
/// Implementations wrap a concrete backing store (file, JWKS endpoint,
/// database) and map its failures to [`FetchError`](crate::FetchError).
/// Timeouts, retries and caching belong to the implementation, not to the
/// lookup layer.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    /// Fetches all raw key records from the backing store.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`](crate::FetchError) when the backing store
    /// cannot deliver a payload. The error reaches lookup callers unchanged.
    async fn fetch_raw_key_records(&self) -> FetchResult<RawKeyRecords>;
}

/// Builds a [`RawKeyRecords`] array from serialized records.
#[must_use]
pub fn raw_key_records<I, S>(records: I) -> RawKeyRecords
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    serde_json::Value::Array(
        records.into_iter().map(|record| serde_json::Value::String(record.into())).collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_raw_key_records_builds_string_array() {
        let records = raw_key_records(["{\"kid\":1}", "not json"]);
        assert_eq!(records, json!(["{\"kid\":1}", "not json"]));
    }

    #[test]
    fn test_raw_key_records_empty() {
        assert_eq!(raw_key_records(Vec::<String>::new()), json!([]));
    }
}
