//! Error types for vector index operations.

use thiserror::Error;

/// Errors that can occur while embedding or indexing documents.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// Unable to reach a backend.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Backend returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The configured Pinecone index does not exist.
    #[error("Index not found: {name}. Create it in the Pinecone console first.")]
    IndexNotFound { name: String },

    /// A document is missing a required key.
    #[error("Document is missing the required '{0}' field")]
    MissingField(String),

    /// The embedding backend returned no vector.
    #[error("Embedding backend returned no vector")]
    EmptyEmbedding,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local index storage error.
    #[error("Local index error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vector index operations.
pub type VectorStoreResult<T> = Result<T, VectorStoreError>;

/// Map a failed request the way every backend client reports it.
pub(crate) fn map_send_error(err: reqwest::Error, host: &str, timeout_seconds: u64) -> VectorStoreError {
    if err.is_connect() {
        VectorStoreError::Connection(format!("unable to reach {}", host))
    } else if err.is_timeout() {
        VectorStoreError::Timeout {
            seconds: timeout_seconds,
        }
    } else {
        VectorStoreError::Http(err)
    }
}
