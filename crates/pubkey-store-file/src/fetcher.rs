//! File-backed [`KeyFetcher`].
//!
//! Reads a JSON key document from disk on every fetch. Accepted layouts:
//!
//! ```text
//! [ "<serialized record>", {inline record}, ... ]
//! { "keys": [ "<serialized record>", {inline record}, ... ] }
//! ```
//!
//! Inline objects are re-serialized so the normalizer always receives
//! strings. Any other document shape is passed through untouched and
//! normalizes to an empty key list.

use std::io::ErrorKind;

use async_trait::async_trait;
use pubkey_store::{FetchError, FetchResult, KeyFetcher, RawKeyRecords};
use serde_json::Value;

use crate::{config::FileFetcherConfig, error::ConfigError};

/// [`KeyFetcher`] reading a JSON document from the local file system.
#[derive(Debug, Clone)]
pub struct FileKeyFetcher {
    config: FileFetcherConfig,
}

impl FileKeyFetcher {
    /// Creates a fetcher from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn new(config: FileFetcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the fetcher configuration.
    #[must_use]
    pub fn config(&self) -> &FileFetcherConfig {
        &self.config
    }

    async fn read_document(&self) -> FetchResult<Vec<u8>> {
        let path = self.config.path();

        let metadata = tokio::fs::metadata(path).await.map_err(map_io_error)?;
        let limit = self.config.max_file_size();
        if metadata.len() > limit {
            return Err(FetchError::payload_too_large(metadata.len(), limit));
        }

        let bytes = tokio::fs::read(path).await.map_err(map_io_error)?;
        // The file may have grown between the metadata call and the read.
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size > limit {
            return Err(FetchError::payload_too_large(size, limit));
        }

        Ok(bytes)
    }
}

fn map_io_error(err: std::io::Error) -> FetchError {
    match err.kind() {
        ErrorKind::NotFound => FetchError::unavailable_with_source("key file not found", err),
        ErrorKind::PermissionDenied => {
            FetchError::unavailable_with_source("key file not readable", err)
        },
        _ => FetchError::io_with_source("failed to read key file", err),
    }
}

/// Unwraps a `{"keys": [...]}` envelope and re-serializes inline objects.
fn into_raw_records(document: Value) -> RawKeyRecords {
    let items = match document {
        Value::Object(mut envelope) if envelope.contains_key("keys") => {
            envelope.remove("keys").unwrap_or(Value::Null)
        },
        other => other,
    };

    match items {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    inline @ Value::Object(_) => Value::String(inline.to_string()),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

#[async_trait]
impl KeyFetcher for FileKeyFetcher {
    #[tracing::instrument(skip(self), fields(path = %self.config.path().display()))]
    async fn fetch_raw_key_records(&self) -> FetchResult<RawKeyRecords> {
        let bytes = tokio::time::timeout(self.config.read_timeout(), self.read_document())
            .await
            .map_err(|_| FetchError::timeout())??;

        let document: Value = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::decode_with_source("key file is not valid JSON", err))?;

        tracing::debug!(bytes = bytes.len(), "read key file");
        Ok(into_raw_records(document))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_array_of_strings_passes_through() {
        let document = json!(["{\"kid\":1}", "garbage"]);
        assert_eq!(into_raw_records(document.clone()), document);
    }

    #[test]
    fn test_inline_objects_are_serialized() {
        let records = into_raw_records(json!([{ "kid": "a", "n": "n", "e": "e" }, 7]));
        let items = records.as_array().unwrap();

        let inline: Value = serde_json::from_str(items[0].as_str().unwrap()).unwrap();
        assert_eq!(inline, json!({ "kid": "a", "n": "n", "e": "e" }));
        // Non-object, non-string elements are left for the normalizer to drop.
        assert_eq!(items[1], json!(7));
    }

    #[test]
    fn test_keys_envelope_unwrapped() {
        let records = into_raw_records(json!({ "keys": ["x"] }));
        assert_eq!(records, json!(["x"]));
    }

    #[test]
    fn test_other_shapes_untouched() {
        assert_eq!(into_raw_records(json!("foo")), json!("foo"));
        assert_eq!(into_raw_records(json!({ "other": [] })), json!({ "other": [] }));
        assert_eq!(into_raw_records(json!({ "keys": "nope" })), json!("nope"));
    }

    #[test]
    fn test_io_error_mapping() {
        let err = map_io_error(std::io::Error::from(ErrorKind::NotFound));
        assert!(matches!(err, FetchError::Unavailable { .. }));

        let err = map_io_error(std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(err, FetchError::Unavailable { .. }));

        let err = map_io_error(std::io::Error::from(ErrorKind::UnexpectedEof));
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
