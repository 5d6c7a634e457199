//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while reading a file or persisting its record.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] datadesk_db::DbError),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse PDF {source_name}: {message}")]
    PdfParse { source_name: String, message: String },

    #[error("The file has no header")]
    MissingHeader,

    #[error("Duplicate column name in header: {0}")]
    DuplicateColumn(String),

    #[error("Column descriptions do not match the file columns (missing: {missing:?}, unexpected: {unexpected:?})")]
    DescriptionMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Cannot upload data to database with missing information: {0}")]
    MissingInformation(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}
