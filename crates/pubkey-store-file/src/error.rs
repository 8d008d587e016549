//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised when a [`FileFetcherConfig`](crate::FileFetcherConfig) is invalid.
///
/// # Non-exhaustive
///
/// New variants may be added in minor releases. Downstream match expressions
/// must include a wildcard arm (`_ =>`).
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required field is empty.
    #[error("{field} cannot be empty")]
    Empty {
        /// Name of the field.
        field: &'static str,
    },

    /// A numeric or duration field is below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the field.
        field: &'static str,
        /// Minimum accepted value, rendered for display.
        min: String,
        /// Rejected value, rendered for display.
        value: String,
    },
}
