//! End-to-end tests for the PDF connector.

mod common;

use datadesk_db::Database;
use datadesk_ingest::{Connector, IngestError, MetadataMap, UnstructuredConnector};

#[test]
fn test_pages_are_joined_with_newlines() {
    let pdf = common::pdf_with_pages(&["A", "B"]);
    let connector = UnstructuredConnector::from_bytes(&pdf).unwrap();

    assert_eq!(connector.page_count(), 2);
    assert_eq!(connector.content(), "A\nB\n");
}

#[test]
fn test_line_moves_start_new_lines() {
    let pdf = common::pdf_with_streams(&[
        "BT /F1 12 Tf 20 150 Td (Hello) Tj 0 -14 Td (World) Tj ET",
    ]);
    let connector = UnstructuredConnector::from_bytes(&pdf).unwrap();

    assert_eq!(connector.content(), "Hello\nWorld\n");
}

#[test]
fn test_text_matrix_and_next_line_operators() {
    let pdf = common::pdf_with_streams(&[
        "BT /F1 12 Tf 14 TL 1 0 0 1 20 200 Tm (Title) Tj T* (Body) Tj 1 0 0 1 20 150 Tm (Footer) Tj ET",
    ]);
    let connector = UnstructuredConnector::from_bytes(&pdf).unwrap();

    assert_eq!(connector.content(), "Title\nBody\nFooter\n");
}

#[test]
fn test_wide_tj_offsets_separate_words() {
    let pdf = common::pdf_with_streams(&[
        "BT /F1 12 Tf 20 150 Td [(Hello) -250 (World)] TJ ET",
        "BT /F1 12 Tf 20 150 Td [(Ke) -30 (rning)] TJ ET",
    ]);
    let connector = UnstructuredConnector::from_bytes(&pdf).unwrap();

    assert_eq!(connector.content(), "Hello World\nKerning\n");
}

#[test]
fn test_from_path_and_persist() {
    let file = common::temp_file(".pdf", &common::pdf_with_pages(&["Quarterly report"]));
    let db = Database::open_in_memory().unwrap();

    let mut connector = UnstructuredConnector::from_path(file.path()).unwrap();
    connector.save_data("report", "Numbers for the quarter");

    let stored = connector.persist(Some(&db)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "report");
    assert_eq!(stored[0].content, "Quarterly report\n");

    let loaded = db.get_unstructured(&stored[0].id).unwrap();
    assert_eq!(loaded.description, "Numbers for the quarter");
}

#[test]
fn test_dry_run_returns_nothing() {
    let mut connector = UnstructuredConnector::from_bytes(&common::pdf_with_pages(&["x"])).unwrap();

    let mut metadata = MetadataMap::new();
    metadata.insert("file_name".to_string(), "x".to_string());
    metadata.insert("file_description".to_string(), "a letter".to_string());
    metadata.insert("unrelated".to_string(), "ignored".to_string());
    connector.save_metadata(&metadata);

    assert!(connector.persist(None).unwrap().is_empty());
    assert_eq!(connector.data_info().file_name.as_deref(), Some("x"));
    assert_eq!(connector.data_info().to_json()["file_description"], "a letter");
}

#[test]
fn test_persist_without_metadata_fails() {
    let connector = UnstructuredConnector::from_bytes(&common::pdf_with_pages(&["x"])).unwrap();
    let db = Database::open_in_memory().unwrap();

    assert!(matches!(
        connector.persist(Some(&db)),
        Err(IngestError::MissingInformation(_))
    ));
    assert!(db.list_unstructured(None).unwrap().is_empty());
}

#[test]
fn test_missing_file() {
    let result = UnstructuredConnector::from_path(std::path::Path::new("/no/such/file.pdf"));
    assert!(matches!(result, Err(IngestError::FileNotFound(_))));
}
