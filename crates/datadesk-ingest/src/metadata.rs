//! Flattening of partial metadata mappings supplied by a caller.

use crate::error::{IngestError, IngestResult};
use std::collections::HashMap;

/// Merged field identifier → description mapping.
pub type MetadataMap = HashMap<String, String>;

/// Merge an ordered sequence of partial mappings; later entries overwrite earlier ones.
pub fn merge_metadata<I, C, K, V>(chunks: I) -> MetadataMap
where
    I: IntoIterator<Item = C>,
    C: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut merged = MetadataMap::new();
    for chunk in chunks {
        for (key, value) in chunk {
            merged.insert(key.into(), value.into());
        }
    }
    merged
}

/// Read metadata chunks from JSON: either one object or an array of objects.
///
/// Strings are taken verbatim, numbers and booleans are rendered as text.
pub fn chunks_from_json(value: &serde_json::Value) -> IngestResult<Vec<Vec<(String, String)>>> {
    match value {
        serde_json::Value::Object(_) => Ok(vec![chunk_from_object(value)?]),
        serde_json::Value::Array(items) => items.iter().map(chunk_from_object).collect(),
        other => Err(IngestError::InvalidMetadata(format!(
            "expected an object or an array of objects, got {}",
            json_kind(other)
        ))),
    }
}

/// Parse a `key=value` pair as given on a command line.
pub fn parse_assignment(input: &str) -> IngestResult<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(IngestError::InvalidMetadata(format!(
            "expected key=value, got '{}'",
            input
        ))),
    }
}

fn chunk_from_object(value: &serde_json::Value) -> IngestResult<Vec<(String, String)>> {
    let object = value.as_object().ok_or_else(|| {
        IngestError::InvalidMetadata(format!("expected an object, got {}", json_kind(value)))
    })?;

    object
        .iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(IngestError::InvalidMetadata(format!(
                        "field '{}' must be text, got {}",
                        key,
                        json_kind(other)
                    )))
                }
            };
            Ok((key.clone(), text))
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
