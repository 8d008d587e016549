//! Error types for key fetching and key resolution.
//!
//! Two layers of errors exist:
//!
//! - [`FetchError`] - produced by [`KeyFetcher`](crate::KeyFetcher) implementations when the
//!   backing store cannot deliver raw key records.
//! - [`KeyStoreError`] - returned by [`PublicKeyLookup`](crate::PublicKeyLookup) operations. It
//!   either wraps a [`FetchError`] unchanged or reports that no key matched the requested `kid`.
//!
//! Per-record normalization failures are not errors of the lookup API; they
//! are described by [`RejectReason`](crate::normalize::RejectReason) and only
//! surface through [`NormalizeReport`](crate::normalize::NormalizeReport).
//!
//! # Example
//!
//! ```
//! use pubkey_store::{FetchError, KeyId, KeyStoreError};
//!
//! let err = KeyStoreError::public_key_not_found(KeyId::from(456));
//! assert_eq!(err.kid(), Some(&KeyId::from(456)));
//!
//! let err: KeyStoreError = FetchError::timeout().into();
//! assert!(err.kid().is_none());
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::KeyId;

/// A shared error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for fetcher operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for key lookup operations.
pub type Result<T> = std::result::Result<T, KeyStoreError>;

/// Errors raised by a backing store while fetching raw key records.
///
/// Fetcher implementations map their native failures to these variants. The
/// lookup layer never inspects or rewrites them: a `FetchError` returned by
/// the fetcher reaches the caller inside [`KeyStoreError::Fetch`] as-is.
///
/// # Non-exhaustive
///
/// New variants may be added in minor releases. Downstream match expressions
/// must include a wildcard arm (`_ =>`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The backing store could not be reached or the resource is missing.
    #[error("Key source unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Reading from the backing store failed.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The backing store returned a payload that could not be decoded.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The payload exceeded the configured size limit.
    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Actual payload size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The fetch did not complete in time.
    #[error("Fetch timeout")]
    Timeout,

    /// Backend-specific failure that fits no other category.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },
}

impl FetchError {
    /// Creates an `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into(), source: None }
    }

    /// Creates an `Unavailable` error with a source error.
    #[must_use]
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates an `Io` error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io { message: message.into(), source: None }
    }

    /// Creates an `Io` error with a source error.
    #[must_use]
    pub fn io_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into(), source: None }
    }

    /// Creates a `Decode` error with a source error.
    #[must_use]
    pub fn decode_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a `PayloadTooLarge` error.
    #[must_use]
    pub fn payload_too_large(size: u64, limit: u64) -> Self {
        Self::PayloadTooLarge { size, limit }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates an `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates an `Internal` error with a source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    ///
    /// This crate never retries on its own; the classification exists for
    /// callers that wrap lookups in their own retry policy.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Io { .. } | Self::Timeout)
    }
}

/// Errors returned by [`PublicKeyLookup`](crate::PublicKeyLookup) operations.
///
/// # Non-exhaustive
///
/// New variants may be added in minor releases. Downstream match expressions
/// must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyStoreError {
    /// No descriptor with the requested `kid` was returned by the store.
    #[error("Public key not found: {kid}")]
    PublicKeyNotFound {
        /// The key ID that was requested.
        kid: KeyId,
    },

    /// The backing store failed to deliver key records.
    #[error("Key fetch failed: {0}")]
    Fetch(
        /// The fetcher's error, unchanged.
        #[source]
        FetchError,
    ),
}

impl KeyStoreError {
    /// Creates a `PublicKeyNotFound` error for the requested key ID.
    #[must_use]
    pub fn public_key_not_found(kid: impl Into<KeyId>) -> Self {
        Self::PublicKeyNotFound { kid: kid.into() }
    }

    /// Returns the requested key ID when this is a not-found error.
    #[must_use]
    pub fn kid(&self) -> Option<&KeyId> {
        match self {
            Self::PublicKeyNotFound { kid } => Some(kid),
            Self::Fetch(_) => None,
        }
    }

    /// Returns the underlying fetcher error, if this error came from the backing store.
    #[must_use]
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::PublicKeyNotFound { .. } => None,
        }
    }
}

impl From<FetchError> for KeyStoreError {
    fn from(err: FetchError) -> Self {
        KeyStoreError::Fetch(err)
    }
}
