//! Unstructured document operations.

use super::dataframes::parse_timestamp;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use datadesk_core::{UnstructuredDocument, UnstructuredDraft};
use rusqlite::params;
use tracing::info;

impl Database {
    /// Write a described document and return the stored record.
    pub fn register_unstructured(&self, draft: &UnstructuredDraft) -> DbResult<UnstructuredDocument> {
        let document = UnstructuredDocument::from_draft(draft);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO unstructured (id, name, description, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                document.id,
                document.name,
                document.description,
                document.content,
                document.created_at.to_rfc3339(),
            ],
        )?;

        info!(
            "Registered document '{}' ({} chars) as {}",
            document.name,
            document.content.len(),
            document.id
        );

        Ok(document)
    }

    /// Get a stored document by ID.
    pub fn get_unstructured(&self, id: &str) -> DbResult<UnstructuredDocument> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, description, content, created_at FROM unstructured WHERE id = ?1",
            params![id],
            row_to_document,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("Document not found: {}", id))
            }
            _ => DbError::from(e),
        })
    }

    /// List stored documents, newest first.
    pub fn list_unstructured(&self, limit: Option<i64>) -> DbResult<Vec<UnstructuredDocument>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, content, created_at
            FROM unstructured ORDER BY created_at DESC LIMIT ?1
            "#,
        )?;

        let documents = stmt.query_map(params![limit.unwrap_or(100)], row_to_document)?;
        documents.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<UnstructuredDocument> {
    let created_at_str: String = row.get(4)?;
    Ok(UnstructuredDocument {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_timestamp(&created_at_str),
    })
}
