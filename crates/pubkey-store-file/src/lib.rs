//! # pubkey-store-file
//!
//! File-backed [`KeyFetcher`](pubkey_store::KeyFetcher) for `pubkey-store`.
//!
//! The key document is re-read on every fetch, so edits to the file are
//! visible to the next lookup without restarting the service.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pubkey_store::{KeyId, PublicKeyLookup, PublicKeyStore};
//! use pubkey_store_file::{FileFetcherConfig, FileKeyFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FileFetcherConfig::builder().path("/etc/keys/public-keys.json").build()?;
//! let store = PublicKeyStore::new(Arc::new(FileKeyFetcher::new(config)?));
//!
//! let key = store.lookup_public_key(&KeyId::from("key-2024-001")).await?;
//! println!("{} {}", key.kty(), key.alg);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Fetcher configuration.
pub mod config;
/// Configuration errors.
pub mod error;
/// File-backed fetcher.
pub mod fetcher;

pub use config::{DEFAULT_MAX_FILE_SIZE, DEFAULT_READ_TIMEOUT, FileFetcherConfig};
pub use error::ConfigError;
pub use fetcher::FileKeyFetcher;
