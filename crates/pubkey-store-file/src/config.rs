//! Configuration for the file-backed key fetcher.
//!
//! [`FileFetcherConfig`] can be built in code through its validating builder
//! or deserialized from a service configuration file:
//!
//! ```toml
//! path = "/etc/keys/public-keys.json"
//! max_file_size = 1048576
//! read_timeout = "5s"
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default maximum key file size (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default read timeout (5 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`FileKeyFetcher`](crate::FileKeyFetcher).
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use pubkey_store_file::FileFetcherConfig;
///
/// let config = FileFetcherConfig::builder()
///     .path("/etc/keys/public-keys.json")
///     .read_timeout(Duration::from_secs(2))
///     .build()?;
///
/// assert_eq!(config.read_timeout(), Duration::from_secs(2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileFetcherConfig {
    /// Path to the key document.
    pub(crate) path: PathBuf,

    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub(crate) max_file_size: u64,

    /// Upper bound on the time spent reading the file.
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub(crate) read_timeout: Duration,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_read_timeout() -> Duration {
    DEFAULT_READ_TIMEOUT
}

#[bon::bon]
impl FileFetcherConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the key document. Must not be empty.
    ///
    /// # Optional Fields
    ///
    /// * `max_file_size` - Maximum file size in bytes (default: 1 MiB).
    /// * `read_timeout` - Read timeout (default: 5 seconds).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the path is empty or a limit is zero.
    #[builder]
    pub fn new(
        #[builder(into)] path: PathBuf,
        #[builder(default = DEFAULT_MAX_FILE_SIZE)] max_file_size: u64,
        #[builder(default = DEFAULT_READ_TIMEOUT)] read_timeout: Duration,
    ) -> Result<Self> {
        let config = Self { path, max_file_size, read_timeout };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration, e.g. after deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the path is empty or a limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Empty { field: "path" });
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_file_size",
                min: "1".into(),
                value: "0".into(),
            });
        }

        if self.read_timeout.is_zero() {
            return Err(ConfigError::BelowMinimum {
                field: "read_timeout",
                min: "1ms".into(),
                value: "0s".into(),
            });
        }

        Ok(())
    }

    /// Returns the key document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the maximum accepted file size in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Returns the read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}
