//! Error types for crossmark.

use thiserror::Error;

/// Result type alias using crossmark's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for crossmark operations.
///
/// The matching pipeline itself never surfaces these to callers: a failure
/// inside a run degrades to "this pair is not matched". They are used at the
/// edges (embedding backends, judge transport, market sources).
#[derive(Error, Debug)]
pub enum Error {
    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Judge call failed (transport or protocol level)
    #[error("Judge error: {0}")]
    Judge(String),

    /// Market source could not produce records
    #[error("Source error: {0}")]
    Source(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Request exceeded its deadline
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
