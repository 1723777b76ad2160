//! Error types for classpulse-core

use thiserror::Error;

/// Main error type for the classpulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error (record input, cache-key rendering)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A record violated its declared constraints at the ingestion boundary
    #[error("malformed record {record}: {field}: {message}")]
    MalformedInput {
        record: String,
        field: &'static str,
        message: String,
    },

    /// Unexpected failure while computing metrics
    #[error("computation failed: {0}")]
    Computation(String),
}

impl Error {
    pub(crate) fn malformed(
        record: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedInput {
            record: record.into(),
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for classpulse-core
pub type Result<T> = std::result::Result<T, Error>;
