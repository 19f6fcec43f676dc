//! Error types for DescriptionEnhancer.
//!
//! Library crates use [`EnhancerError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DescriptionEnhancer operations.
#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Reading or writing tabular product data failed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// A record's category path is empty or malformed.
    #[error("invalid category path: {message}")]
    InvalidPath { message: String },

    /// Operator-chosen index outside `1..=len`.
    #[error("selection {index} is out of range (choose 1 to {len})")]
    OutOfRange { index: usize, len: usize },

    /// The text-generation collaborator failed for a product.
    #[error("generation failed for '{product}': {message}")]
    Generation { product: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad template, unusable input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EnhancerError>;

impl EnhancerError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an invalid-path error from any displayable message.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a generation error for the named product.
    pub fn generation(product: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Generation {
            product: product.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the operator can simply be asked again.
    ///
    /// Only a bad menu selection qualifies; everything else ends the current action.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
