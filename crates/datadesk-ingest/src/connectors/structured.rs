//! CSV connector.

use super::{Connector, SourceKind};
use crate::error::{IngestError, IngestResult};
use crate::metadata::{merge_metadata, MetadataMap};
use datadesk_core::{
    DataInfo, Dataframe, DataframeDraft, Specification, ValueDraft, VariableDraft,
};
use datadesk_db::Database;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A text column is categorical when it has fewer distinct values than this.
pub const CATEGORICAL_THRESHOLD: usize = 5;

const DB_NAME_KEY: &str = "db_name";
const DB_DESCRIPTION_KEY: &str = "db_description";

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// No non-empty cells.
    Empty,
}

impl ColumnKind {
    /// Infer the kind from the raw cells of one column.
    pub fn detect<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut saw_value = false;
        let mut saw_empty = false;
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;

        for cell in cells {
            let cell = cell.trim();
            if cell.is_empty() {
                saw_empty = true;
                continue;
            }
            saw_value = true;
            all_int &= cell.parse::<i64>().is_ok();
            all_float &= cell.parse::<f64>().is_ok();
            all_bool &= matches!(cell, "true" | "false" | "True" | "False" | "TRUE" | "FALSE");
        }

        if !saw_value {
            ColumnKind::Empty
        } else if all_int && !saw_empty {
            ColumnKind::Integer
        } else if all_float || all_int {
            // Missing cells turn integer columns into floats
            ColumnKind::Float
        } else if all_bool && !saw_empty {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

/// Connector for column-oriented files.
///
/// Build it from a file, ask it for its [`Specification`], hand it the
/// collected metadata with [`save_data`](Self::save_data), then call
/// [`persist`](Self::persist).
#[derive(Debug, Clone)]
pub struct StructuredConnector {
    column_names: Vec<String>,
    column_kinds: Vec<ColumnKind>,
    content: Vec<Vec<String>>,
    categorical_values: HashMap<String, Vec<String>>,
    db_name: Option<String>,
    db_description: Option<String>,
    columns_description: HashMap<String, String>,
    categorical_values_description: HashMap<String, String>,
}

impl StructuredConnector {
    /// Parse a CSV file with a header row.
    pub fn from_path(path: &Path) -> IngestResult<Self> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        debug!("Parsing CSV: {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV data with a header row.
    pub fn from_reader<R: Read>(reader: R) -> IngestResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let column_names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut seen = HashSet::new();
        if let Some(duplicate) = column_names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(IngestError::DuplicateColumn(duplicate.clone()));
        }
        let content = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>()))
            .collect::<Result<Vec<_>, _>>()?;

        let column_kinds: Vec<ColumnKind> = (0..column_names.len())
            .map(|idx| ColumnKind::detect(content.iter().map(|row| row[idx].as_str())))
            .collect();

        let mut connector = Self {
            column_names,
            column_kinds,
            content,
            categorical_values: HashMap::new(),
            db_name: None,
            db_description: None,
            columns_description: HashMap::new(),
            categorical_values_description: HashMap::new(),
        };
        connector.categorical_values = connector.check_categoricals();

        debug!(
            "Parsed {} columns, {} rows, {} categorical columns",
            connector.column_names.len(),
            connector.content.len(),
            connector.categorical_values.len()
        );

        Ok(connector)
    }

    /// Distinct values, in order of first appearance, of every text column
    /// with fewer than [`CATEGORICAL_THRESHOLD`] of them.
    fn check_categoricals(&self) -> HashMap<String, Vec<String>> {
        let mut categoricals = HashMap::new();

        for (idx, column) in self.column_names.iter().enumerate() {
            if self.column_kinds[idx] != ColumnKind::Text {
                continue;
            }

            let mut seen = HashSet::new();
            let mut distinct = Vec::new();
            for row in &self.content {
                let cell = &row[idx];
                if !cell.trim().is_empty() && seen.insert(cell.as_str()) {
                    distinct.push(cell.clone());
                }
            }

            if distinct.len() < CATEGORICAL_THRESHOLD {
                categoricals.insert(column.clone(), distinct);
            }
        }

        categoricals
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_kinds(&self) -> &[ColumnKind] {
        &self.column_kinds
    }

    /// Categorical columns and their distinct values.
    pub fn categorical_values(&self) -> &HashMap<String, Vec<String>> {
        &self.categorical_values
    }

    /// Merge partial metadata mappings in order and record the fields this file needs.
    pub fn save_data<I, C, K, V>(&mut self, chunks: I)
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let merged = merge_metadata(chunks);
        self.save_metadata(&merged);
    }

    /// Fail unless the file has columns and every column, and only those, is described.
    pub fn validate(&self) -> IngestResult<()> {
        if self.column_names.is_empty() {
            return Err(IngestError::MissingHeader);
        }

        let expected: HashSet<&str> = self.column_names.iter().map(String::as_str).collect();
        let described: HashSet<&str> = self.columns_description.keys().map(String::as_str).collect();

        if expected != described {
            let mut missing: Vec<String> = Vec::new();
            for column in &self.column_names {
                if !described.contains(column.as_str()) && !missing.contains(column) {
                    missing.push(column.clone());
                }
            }
            let mut unexpected: Vec<String> = described
                .difference(&expected)
                .map(|c| c.to_string())
                .collect();
            unexpected.sort();

            debug!("Described columns: {:?}", described);
            debug!("File columns: {:?}", expected);
            return Err(IngestError::DescriptionMismatch {
                missing,
                unexpected,
            });
        }

        Ok(())
    }

    /// Raw row values.
    pub fn data_content(&self) -> &[Vec<String>] {
        &self.content
    }

    /// Summary of the collected metadata.
    pub fn data_info(&self) -> DataInfo {
        DataInfo {
            name: self.db_name.clone(),
            description: self.db_description.clone(),
            columns: self.column_names.clone(),
            columns_description: self
                .columns_description
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            categorical_values_description: self
                .categorical_values_description
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    /// Validate the collected metadata and assemble the dataset record.
    pub fn build_record(&self) -> IngestResult<DataframeDraft> {
        self.validate()?;

        let (name, description) = match (&self.db_name, &self.db_description) {
            (Some(name), Some(description)) => (name.clone(), description.clone()),
            (None, _) => return Err(IngestError::MissingInformation(DB_NAME_KEY.to_string())),
            (_, None) => {
                return Err(IngestError::MissingInformation(DB_DESCRIPTION_KEY.to_string()))
            }
        };

        let mut variables = Vec::with_capacity(self.column_names.len());
        for column in &self.column_names {
            let mut values = Vec::new();
            let categorical = self.categorical_values.get(column);
            if let Some(distinct) = categorical {
                for value in distinct {
                    let value_description = self
                        .categorical_values_description
                        .get(value)
                        .ok_or_else(|| {
                            IngestError::MissingInformation(format!(
                                "categorical value '{}' of column '{}'",
                                value, column
                            ))
                        })?;
                    values.push(ValueDraft::new(value.clone(), value_description.clone()));
                }
            }

            variables.push(VariableDraft {
                name: column.clone(),
                description: self.columns_description[column].clone(),
                is_categorical: categorical.is_some(),
                values,
            });
        }

        Ok(DataframeDraft {
            name,
            description,
            variables,
        })
    }

    /// Write the dataset record. Without a store the record is only built.
    pub fn persist(&self, db: Option<&Database>) -> IngestResult<Option<Dataframe>> {
        let draft = self.build_record()?;

        info!(
            "Uploading CSV to SQL database: {} ({} variables)",
            draft.name,
            draft.variables.len()
        );
        debug!("Dataframe record: {:?}", draft);

        match db {
            Some(db) => Ok(Some(db.register_full_dataframe(&draft)?)),
            None => {
                info!("No database handle, skipping write for '{}'", draft.name);
                Ok(None)
            }
        }
    }
}

impl Connector for StructuredConnector {
    fn specification(&self) -> Specification {
        let mut spec = Specification::new();
        spec.push(DB_NAME_KEY, "Give a short name to the data you just uploaded");
        spec.push(DB_DESCRIPTION_KEY, "Describe the data you just uploaded");

        let mut value_fields = Vec::new();
        for column in &self.column_names {
            spec.push(
                column.clone(),
                format!("Describe the column '{}' of the dataset you just uploaded", column),
            );
            for value in self.categorical_values.get(column).into_iter().flatten() {
                value_fields.push((
                    value.clone(),
                    format!(
                        "Describe the meaning of categorical value '{}' for column '{}' of the dataset you just uploaded",
                        value, column
                    ),
                ));
            }
        }

        for (field, prompt) in value_fields {
            spec.push(field, prompt);
        }
        spec
    }

    fn save_metadata(&mut self, metadata: &MetadataMap) {
        if let Some(name) = metadata.get(DB_NAME_KEY) {
            self.db_name = Some(name.clone());
        }
        if let Some(description) = metadata.get(DB_DESCRIPTION_KEY) {
            self.db_description = Some(description.clone());
        }

        for column in &self.column_names {
            if let Some(description) = metadata.get(column) {
                self.columns_description
                    .insert(column.clone(), description.clone());
            }
            for value in self.categorical_values.get(column).into_iter().flatten() {
                if let Some(description) = metadata.get(value) {
                    self.categorical_values_description
                        .insert(value.clone(), description.clone());
                }
            }
        }
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Structured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(csv: &str) -> StructuredConnector {
        StructuredConnector::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let result = StructuredConnector::from_reader("a,b,a\n1,2,3\n".as_bytes());
        assert!(matches!(result, Err(IngestError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn test_column_kind_detection() {
        assert_eq!(ColumnKind::detect(["1", "2", "-3"]), ColumnKind::Integer);
        assert_eq!(ColumnKind::detect(["1", "", "3"]), ColumnKind::Float);
        assert_eq!(ColumnKind::detect(["1.5", "2"]), ColumnKind::Float);
        assert_eq!(ColumnKind::detect(["True", "false"]), ColumnKind::Boolean);
        assert_eq!(ColumnKind::detect(["True", ""]), ColumnKind::Text);
        assert_eq!(ColumnKind::detect(["NY", "1"]), ColumnKind::Text);
        assert_eq!(ColumnKind::detect(["", " "]), ColumnKind::Empty);
        assert!(ColumnKind::Float.is_numeric());
        assert!(!ColumnKind::Boolean.is_numeric());
    }

    #[test]
    fn test_categorical_threshold_boundary() {
        let four = connector("c\na\nb\nc\nd\na\n");
        assert_eq!(four.categorical_values()["c"], vec!["a", "b", "c", "d"]);

        let five = connector("c\na\nb\nc\nd\ne\n");
        assert!(five.categorical_values().is_empty());
    }

    #[test]
    fn test_numeric_columns_are_not_categorical() {
        let c = connector("n,flag\n1,yes\n2,no\n1,yes\n");
        assert!(!c.categorical_values().contains_key("n"));
        assert_eq!(c.categorical_values()["flag"], vec!["yes", "no"]);
    }

    #[test]
    fn test_empty_cells_are_not_categories() {
        let c = connector("city,n\nNY,1\n,2\nLA,3\n");
        assert_eq!(c.categorical_values()["city"], vec!["NY", "LA"]);
    }

    #[test]
    fn test_save_data_is_additive() {
        let mut c = connector("age,city\n30,NY\n");
        c.save_data(vec![vec![("db_name", "people"), ("age", "years")]]);
        c.save_data(vec![vec![("db_description", "census"), ("city", "home")]]);

        let info = c.data_info();
        assert_eq!(info.name.as_deref(), Some("people"));
        assert_eq!(info.description.as_deref(), Some("census"));
        assert_eq!(info.columns_description.len(), 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_columns() {
        let mut c = connector("age,city\n30,NY\n");
        c.save_data(vec![vec![("age", "years")]]);

        match c.validate() {
            Err(IngestError::DescriptionMismatch { missing, unexpected }) => {
                assert_eq!(missing, vec!["city".to_string()]);
                assert!(unexpected.is_empty());
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_without_header() {
        let c = connector("");
        assert!(matches!(c.validate(), Err(IngestError::MissingHeader)));
    }

    #[test]
    fn test_build_record_requires_value_descriptions() {
        let mut c = connector("city\nNY\nLA\n");
        c.save_data(vec![vec![
            ("db_name", "cities"),
            ("db_description", "where"),
            ("city", "home"),
            ("NY", "New York"),
        ]]);

        match c.build_record() {
            Err(IngestError::MissingInformation(msg)) => assert!(msg.contains("'LA'")),
            other => panic!("expected missing information, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_rows_fail_to_parse() {
        let result = StructuredConnector::from_reader("a,b\n1\n".as_bytes());
        assert!(matches!(result, Err(IngestError::Csv(_))));
    }
}
