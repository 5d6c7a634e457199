//! Metadata specifications and summaries exposed by connectors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The metadata fields a caller must supply, paired 1:1 with prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub inputs_required: Vec<String>,
    pub inputs_required_prompts: Vec<String>,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required field with its prompt.
    pub fn push(&mut self, field: impl Into<String>, prompt: impl Into<String>) {
        self.inputs_required.push(field.into());
        self.inputs_required_prompts.push(prompt.into());
    }

    /// Iterate `(field, prompt)` pairs in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inputs_required
            .iter()
            .map(String::as_str)
            .zip(self.inputs_required_prompts.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.inputs_required.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs_required.is_empty()
    }

    /// Fields not yet supplied, first occurrence only.
    pub fn pending<F>(&self, supplied: F) -> Vec<(&str, &str)>
    where
        F: Fn(&str) -> bool,
    {
        let mut seen = std::collections::HashSet::new();
        self.fields()
            .filter(|(field, _)| !supplied(field) && seen.insert(*field))
            .collect()
    }
}

/// Summary of a structured connector's collected metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub columns: Vec<String>,
    pub columns_description: BTreeMap<String, String>,
    pub categorical_values_description: BTreeMap<String, String>,
}
