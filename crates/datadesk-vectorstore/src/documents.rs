//! Projection of stored records into indexable documents.

use crate::error::{VectorStoreError, VectorStoreResult};
use crate::store::VectorStore;
use datadesk_core::{Dataframe, Indexable, RecordKind, UnstructuredDocument};
use serde_json::{json, Value};
use tracing::info;

/// Text to embed plus the metadata that points back at its source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub text: String,
    pub source_id: String,
    pub source_type: String,
}

impl IndexedDocument {
    pub fn new(
        text: impl Into<String>,
        source_id: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            source_type: source_type.into(),
        }
    }

    /// `{id, type}` metadata.
    pub fn metadata(&self) -> Value {
        json!({
            "id": self.source_id,
            "type": self.source_type,
        })
    }

    /// Metadata as stored by the hosted index, which keeps the text under `text`.
    pub fn metadata_with_text(&self) -> Value {
        json!({
            "id": self.source_id,
            "type": self.source_type,
            "text": self.text,
        })
    }
}

/// `"{name}\n{description}"` tagged with the record's kind.
pub fn record_document<R: Indexable + ?Sized>(record: &R) -> IndexedDocument {
    IndexedDocument::new(
        format!("{}\n{}", record.name(), record.description()),
        record.record_id(),
        record.kind().as_str(),
    )
}

/// `"{name}\n{description}\n{content}"` tagged as unstructured.
pub fn unstructured_document(document: &UnstructuredDocument) -> IndexedDocument {
    IndexedDocument::new(
        format!(
            "{}\n{}\n{}",
            document.name, document.description, document.content
        ),
        document.id.as_str(),
        RecordKind::Unstructured.as_str(),
    )
}

/// Every pair as `"key: value"`, one per line in the given order.
/// The `id` and `type` keys are required and become the metadata.
pub fn fields_document<K, V>(fields: &[(K, V)]) -> VectorStoreResult<IndexedDocument>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let lookup = |key: &str| {
        fields
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref().to_string())
            .ok_or_else(|| VectorStoreError::MissingField(key.to_string()))
    };
    let source_id = lookup("id")?;
    let source_type = lookup("type")?;

    let text = fields
        .iter()
        .map(|(k, v)| format!("{}: {}", k.as_ref(), v.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(IndexedDocument {
        text,
        source_id,
        source_type,
    })
}

/// Index a dataframe, variable or categorical value.
pub async fn index_record<R: Indexable + ?Sized>(
    store: &VectorStore,
    record: &R,
) -> VectorStoreResult<String> {
    store.add_document(&record_document(record)).await
}

/// Index a document together with its full text.
pub async fn index_unstructured(
    store: &VectorStore,
    document: &UnstructuredDocument,
) -> VectorStoreResult<String> {
    store.add_document(&unstructured_document(document)).await
}

/// Index an ad-hoc set of fields.
pub async fn index_fields<K, V>(store: &VectorStore, fields: &[(K, V)]) -> VectorStoreResult<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let document = fields_document(fields)?;
    store.add_document(&document).await
}

/// Index a dataframe, then each of its variables, then their categorical values.
pub async fn index_dataframe_tree(
    store: &VectorStore,
    dataframe: &Dataframe,
) -> VectorStoreResult<Vec<String>> {
    let mut ids = vec![index_record(store, dataframe).await?];

    for variable in &dataframe.variables {
        ids.push(index_record(store, variable).await?);
        for value in &variable.values {
            ids.push(index_record(store, value).await?);
        }
    }

    info!(
        "Indexed dataframe '{}' as {} documents",
        dataframe.name,
        ids.len()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadesk_core::{DataframeDraft, UnstructuredDraft, ValueDraft, VariableDraft};

    #[test]
    fn test_record_document() {
        let dataframe = Dataframe::from_draft(&DataframeDraft {
            name: "X".to_string(),
            description: "Y".to_string(),
            variables: vec![],
        });

        let doc = record_document(&dataframe);
        assert_eq!(doc.text, "X\nY");
        assert_eq!(doc.metadata(), json!({"id": dataframe.id, "type": "Dataframe"}));
    }

    #[test]
    fn test_value_document_kind() {
        let dataframe = Dataframe::from_draft(&DataframeDraft {
            name: "people".to_string(),
            description: "census".to_string(),
            variables: vec![VariableDraft {
                name: "city".to_string(),
                description: "home".to_string(),
                is_categorical: true,
                values: vec![ValueDraft::new("NY", "New York")],
            }],
        });

        let value = &dataframe.variables[0].values[0];
        let doc = record_document(value);
        assert_eq!(doc.text, "NY\nNew York");
        assert_eq!(doc.source_type, "Value");
        assert_eq!(record_document(&dataframe.variables[0]).source_type, "Variable");
    }

    #[test]
    fn test_unstructured_document() {
        let document = UnstructuredDocument::from_draft(&UnstructuredDraft {
            name: "manual".to_string(),
            description: "how to".to_string(),
            content: "A\nB\n".to_string(),
        });

        let doc = unstructured_document(&document);
        assert_eq!(doc.text, "manual\nhow to\nA\nB\n");
        assert_eq!(doc.source_type, "Unstructured");
        assert_eq!(doc.metadata_with_text()["text"], "manual\nhow to\nA\nB\n");
    }

    #[test]
    fn test_fields_document_keeps_order() {
        let doc = fields_document(&[("type", "Note"), ("id", "n-1"), ("body", "hello")]).unwrap();
        assert_eq!(doc.text, "type: Note\nid: n-1\nbody: hello");
        assert_eq!(doc.source_id, "n-1");
        assert_eq!(doc.source_type, "Note");
    }

    #[test]
    fn test_fields_document_requires_id_and_type() {
        assert!(matches!(
            fields_document(&[("type", "Note")]),
            Err(VectorStoreError::MissingField(field)) if field == "id"
        ));
        assert!(matches!(
            fields_document(&[("id", "n-1")]),
            Err(VectorStoreError::MissingField(field)) if field == "type"
        ));
    }
}
