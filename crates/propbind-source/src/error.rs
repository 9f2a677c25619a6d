//! Error types for configuration source loading.

use thiserror::Error;

/// Errors returned while loading or flattening configuration sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// A specific field cannot be represented as a flat property.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// Generic source failure.
    #[error("invalid config: {0}")]
    Invalid(String),
}
