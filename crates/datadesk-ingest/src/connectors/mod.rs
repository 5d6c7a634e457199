//! Connectors for the supported file formats.

pub mod structured;
pub mod unstructured;

use crate::error::{IngestError, IngestResult};
use crate::metadata::MetadataMap;
use datadesk_core::Specification;
use std::path::Path;

/// Shape of the data a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Column-oriented table (CSV).
    Structured,
    /// Paginated document (PDF).
    Unstructured,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Structured => "structured",
            SourceKind::Unstructured => "unstructured",
        }
    }

    /// Detect the source kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(SourceKind::Structured),
            "pdf" => Some(SourceKind::Unstructured),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect which connector handles a path.
pub fn connector_for_path(path: &Path) -> IngestResult<SourceKind> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    SourceKind::from_extension(extension).ok_or_else(|| {
        IngestError::UnsupportedFileType(if extension.is_empty() {
            "unknown".to_string()
        } else {
            extension.to_string()
        })
    })
}

/// Metadata-collection contract shared by all connectors.
pub trait Connector {
    /// Metadata fields the caller must supply, with their prompts.
    fn specification(&self) -> Specification;

    /// Record the supplied fields. Keys the connector does not ask for are ignored.
    fn save_metadata(&mut self, metadata: &MetadataMap);

    fn source_kind(&self) -> SourceKind;
}
