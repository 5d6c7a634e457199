//! Core record types for Datadesk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for stored records.
pub type RecordId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Variant tag of a stored record, used as the `type` of indexed documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Dataframe,
    Variable,
    Value,
    Unstructured,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Dataframe => "Dataframe",
            RecordKind::Variable => "Variable",
            RecordKind::Value => "Value",
            RecordKind::Unstructured => "Unstructured",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dataframe" => Some(RecordKind::Dataframe),
            "variable" => Some(RecordKind::Variable),
            "value" => Some(RecordKind::Value),
            "unstructured" => Some(RecordKind::Unstructured),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record that can be projected into the vector index as `"{name}\n{description}"`.
pub trait Indexable {
    fn record_id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn kind(&self) -> RecordKind;
}

/// A categorical value and its description, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDraft {
    pub name: String,
    pub description: String,
}

impl ValueDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A described column, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDraft {
    pub name: String,
    pub description: String,
    pub is_categorical: bool,
    pub values: Vec<ValueDraft>,
}

/// A fully described dataset, ready to be written by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataframeDraft {
    pub name: String,
    pub description: String,
    pub variables: Vec<VariableDraft>,
}

/// A described document with its extracted text, ready to be written by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstructuredDraft {
    pub name: String,
    pub description: String,
    pub content: String,
}

/// A stored categorical value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalValue {
    pub id: RecordId,
    pub variable_id: RecordId,
    pub name: String,
    pub description: String,
}

/// A stored column of a dataframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: RecordId,
    pub dataframe_id: RecordId,
    pub name: String,
    pub description: String,
    pub is_categorical: bool,
    pub values: Vec<CategoricalValue>,
}

/// A stored dataset with its columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataframe {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub variables: Vec<Variable>,
}

impl Dataframe {
    /// Assign identifiers to every node of a draft.
    pub fn from_draft(draft: &DataframeDraft) -> Self {
        let id = new_id();
        let variables = draft
            .variables
            .iter()
            .map(|v| {
                let variable_id = new_id();
                Variable {
                    values: v
                        .values
                        .iter()
                        .map(|val| CategoricalValue {
                            id: new_id(),
                            variable_id: variable_id.clone(),
                            name: val.name.clone(),
                            description: val.description.clone(),
                        })
                        .collect(),
                    id: variable_id,
                    dataframe_id: id.clone(),
                    name: v.name.clone(),
                    description: v.description.clone(),
                    is_categorical: v.is_categorical,
                }
            })
            .collect();

        Self {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            created_at: Utc::now(),
            variables,
        }
    }
}

/// A stored unstructured document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstructuredDocument {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl UnstructuredDocument {
    pub fn from_draft(draft: &UnstructuredDraft) -> Self {
        Self {
            id: new_id(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            created_at: Utc::now(),
        }
    }
}

impl Indexable for Dataframe {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn kind(&self) -> RecordKind {
        RecordKind::Dataframe
    }
}

impl Indexable for Variable {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn kind(&self) -> RecordKind {
        RecordKind::Variable
    }
}

impl Indexable for CategoricalValue {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn kind(&self) -> RecordKind {
        RecordKind::Value
    }
}

impl Indexable for UnstructuredDocument {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn kind(&self) -> RecordKind {
        RecordKind::Unstructured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft() -> DataframeDraft {
        DataframeDraft {
            name: "people".to_string(),
            description: "census extract".to_string(),
            variables: vec![
                VariableDraft {
                    name: "age".to_string(),
                    description: "age in years".to_string(),
                    is_categorical: false,
                    values: vec![],
                },
                VariableDraft {
                    name: "city".to_string(),
                    description: "home city".to_string(),
                    is_categorical: true,
                    values: vec![ValueDraft::new("NY", "New York"), ValueDraft::new("LA", "Los Angeles")],
                },
            ],
        }
    }

    #[test]
    fn test_record_kind_tags() {
        assert_eq!(RecordKind::Dataframe.as_str(), "Dataframe");
        assert_eq!(RecordKind::Value.to_string(), "Value");
        assert_eq!(RecordKind::from_str("variable"), Some(RecordKind::Variable));
        assert_eq!(RecordKind::from_str("Unstructured"), Some(RecordKind::Unstructured));
        assert_eq!(RecordKind::from_str("table"), None);
    }

    #[test]
    fn test_dataframe_from_draft_links_ids() {
        let df = Dataframe::from_draft(&sample_draft());

        assert_eq!(df.variables.len(), 2);
        assert!(df.variables.iter().all(|v| v.dataframe_id == df.id));

        let city = &df.variables[1];
        assert_eq!(city.values.len(), 2);
        assert!(city.values.iter().all(|v| v.variable_id == city.id));
        assert_eq!(city.values[0].kind(), RecordKind::Value);
        assert_ne!(city.values[0].id, city.values[1].id);
    }
}
