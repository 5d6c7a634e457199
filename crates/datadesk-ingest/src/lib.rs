//! Datadesk Ingest - File connectors for the ingestion pipeline.
//!
//! Each connector reads one file format, reports the metadata a person must
//! supply about it, and persists a described record once that metadata is
//! complete:
//! - [`StructuredConnector`] for CSV tables, with categorical column detection
//! - [`UnstructuredConnector`] for PDF documents

mod connectors;
mod error;
pub mod metadata;

pub use connectors::structured::{ColumnKind, StructuredConnector, CATEGORICAL_THRESHOLD};
pub use connectors::unstructured::{FileInfo, UnstructuredConnector};
pub use connectors::{connector_for_path, Connector, SourceKind};
pub use error::{IngestError, IngestResult};
pub use metadata::{merge_metadata, MetadataMap};
