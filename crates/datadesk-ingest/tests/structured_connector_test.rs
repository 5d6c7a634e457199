//! End-to-end tests for the CSV connector: specification, metadata, persistence.

mod common;

use datadesk_db::Database;
use datadesk_ingest::{Connector, IngestError, StructuredConnector};

const PEOPLE_CSV: &str = "age,city\n34,NY\n28,LA\n45,SF\n51,NY\n";

fn full_metadata() -> Vec<Vec<(&'static str, &'static str)>> {
    vec![
        vec![("db_name", "people"), ("db_description", "A census extract")],
        vec![("age", "Age in years"), ("city", "City of residence")],
        vec![("NY", "New York"), ("LA", "Los Angeles"), ("SF", "San Francisco")],
    ]
}

#[test]
fn test_people_scenario_specification() {
    let file = common::temp_file(".csv", PEOPLE_CSV.as_bytes());
    let connector = StructuredConnector::from_path(file.path()).unwrap();

    assert_eq!(connector.categorical_values().len(), 1);
    assert_eq!(connector.categorical_values()["city"], vec!["NY", "LA", "SF"]);

    let spec = connector.specification();
    assert_eq!(
        spec.inputs_required,
        vec!["db_name", "db_description", "age", "city", "NY", "LA", "SF"]
    );
    assert_eq!(spec.inputs_required_prompts.len(), spec.inputs_required.len());
    assert_eq!(
        spec.inputs_required_prompts[2],
        "Describe the column 'age' of the dataset you just uploaded"
    );
    assert_eq!(
        spec.inputs_required_prompts[6],
        "Describe the meaning of categorical value 'SF' for column 'city' of the dataset you just uploaded"
    );
}

#[test]
fn test_specification_lists_columns_then_values() {
    let csv = "kind,score,size\na,1,S\nb,2,M\na,3,L\n";
    let connector = StructuredConnector::from_reader(csv.as_bytes()).unwrap();

    let spec = connector.specification();
    assert_eq!(
        &spec.inputs_required[2..],
        &["kind", "score", "size", "a", "b", "S", "M", "L"]
    );
}

#[test]
fn test_persist_writes_one_variable_per_column() {
    let db = Database::open_in_memory().unwrap();
    let mut connector = StructuredConnector::from_reader(PEOPLE_CSV.as_bytes()).unwrap();
    connector.save_data(full_metadata());

    let stored = connector.persist(Some(&db)).unwrap().expect("record written");
    assert_eq!(stored.name, "people");
    assert_eq!(stored.variables.len(), 2);

    let age = &stored.variables[0];
    assert!(!age.is_categorical);
    assert!(age.values.is_empty());

    let city = &stored.variables[1];
    assert!(city.is_categorical);
    let described: Vec<_> = city
        .values
        .iter()
        .map(|v| (v.name.as_str(), v.description.as_str()))
        .collect();
    assert_eq!(
        described,
        vec![("NY", "New York"), ("LA", "Los Angeles"), ("SF", "San Francisco")]
    );

    assert_eq!(db.count_dataframes().unwrap(), 1);
    let loaded = db.get_dataframe(&stored.id).unwrap();
    assert_eq!(loaded.variables[1].values.len(), 3);
}

#[test]
fn test_persist_fails_when_a_column_is_undescribed() {
    let db = Database::open_in_memory().unwrap();
    let mut connector = StructuredConnector::from_reader(PEOPLE_CSV.as_bytes()).unwrap();
    connector.save_data(vec![vec![
        ("db_name", "people"),
        ("db_description", "A census extract"),
        ("city", "City of residence"),
    ]]);

    let result = connector.persist(Some(&db));
    assert!(matches!(
        result,
        Err(IngestError::DescriptionMismatch { ref missing, .. }) if missing == &vec!["age".to_string()]
    ));
    assert_eq!(db.count_dataframes().unwrap(), 0);
}

#[test]
fn test_persist_fails_without_name() {
    let mut connector = StructuredConnector::from_reader(PEOPLE_CSV.as_bytes()).unwrap();
    connector.save_data(vec![vec![
        ("db_description", "A census extract"),
        ("age", "Age in years"),
        ("city", "City of residence"),
    ]]);

    assert!(matches!(
        connector.persist(None),
        Err(IngestError::MissingInformation(field)) if field == "db_name"
    ));
}

#[test]
fn test_dry_run_builds_without_writing() {
    let mut connector = StructuredConnector::from_reader(PEOPLE_CSV.as_bytes()).unwrap();
    connector.save_data(full_metadata());

    assert!(connector.persist(None).unwrap().is_none());
    let draft = connector.build_record().unwrap();
    assert_eq!(draft.variables.len(), 2);
}

#[test]
fn test_later_chunks_override_earlier_ones() {
    let mut connector = StructuredConnector::from_reader(PEOPLE_CSV.as_bytes()).unwrap();
    let mut chunks = full_metadata();
    chunks.push(vec![("db_name", "residents")]);
    connector.save_data(chunks);

    let info = connector.data_info();
    assert_eq!(info.name.as_deref(), Some("residents"));
    assert_eq!(info.columns, vec!["age", "city"]);
    assert_eq!(info.categorical_values_description["LA"], "Los Angeles");
}

#[test]
fn test_data_content_keeps_rows() {
    let connector = StructuredConnector::from_reader(PEOPLE_CSV.as_bytes()).unwrap();
    let rows = connector.data_content();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1], vec!["28", "LA"]);
}

#[test]
fn test_empty_file_has_no_header() {
    let file = common::temp_file(".csv", b"");
    let connector = StructuredConnector::from_path(file.path()).unwrap();
    assert_eq!(connector.specification().inputs_required.len(), 2);
    assert!(matches!(connector.persist(None), Err(IngestError::MissingHeader)));
}

#[test]
fn test_missing_file() {
    let result = StructuredConnector::from_path(std::path::Path::new("/no/such/file.csv"));
    assert!(matches!(result, Err(IngestError::FileNotFound(_))));
}
