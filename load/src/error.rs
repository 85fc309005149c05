//! Error types for loading documents, schemas and check configs.
//!
//! Provides a unified error type covering I/O, serialization, schema
//! structure and batch configuration failures.

use config_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading or checking files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension does not identify a supported format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A configured pattern is not a valid regex.
    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        /// Pattern name from the config file.
        name: String,
        /// Regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// The schema is structurally malformed.
    #[error("schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// Check config validation failure (e.g., a target without documents).
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
