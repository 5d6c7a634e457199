//! On-disk vector index.

use crate::cohere::CohereEmbedder;
use crate::documents::IndexedDocument;
use crate::error::VectorStoreResult;
use chrono::Utc;
use datadesk_core::new_id;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDEX_FILE: &str = "index.sqlite3";

/// A vector read back from the local index.
#[derive(Debug, Clone)]
pub struct StoredVector {
    pub id: String,
    pub document: IndexedDocument,
    pub values: Vec<f32>,
}

/// Vectors kept in a SQLite file inside a directory.
#[derive(Debug)]
pub struct LocalIndex {
    conn: Connection,
    path: PathBuf,
    embedder: CohereEmbedder,
}

impl LocalIndex {
    /// Open the index in `dir`, creating the directory if needed.
    pub fn open(dir: &Path, embedder: CohereEmbedder) -> VectorStoreResult<Self> {
        if !dir.exists() {
            debug!("Creating local index directory {:?}", dir);
            std::fs::create_dir_all(dir)?;
        }

        let path = dir.join(INDEX_FILE);
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vectors (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                source_type TEXT NOT NULL,
                text TEXT NOT NULL,
                vector BLOB NOT NULL,
                dimensions INTEGER NOT NULL,
                model TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_vectors_source ON vectors(source_id);
            "#,
        )?;

        info!("Opened local vector index at {:?}", path);
        Ok(Self {
            conn,
            path,
            embedder,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embed and store one document, returning its vector id.
    pub async fn add_document(&self, doc: &IndexedDocument) -> VectorStoreResult<String> {
        let values = self.embedder.embed_document(&doc.text).await?;
        let id = new_id();

        let vector_bytes: Vec<u8> = values.iter().flat_map(|f| f.to_le_bytes()).collect();
        self.conn.execute(
            r#"
            INSERT INTO vectors (id, source_id, source_type, text, vector, dimensions, model, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                id,
                doc.source_id,
                doc.source_type,
                doc.text,
                vector_bytes,
                values.len() as i64,
                self.embedder.model(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        info!(
            "Stored {} ({} {}) in local index",
            id, doc.source_type, doc.source_id
        );
        Ok(id)
    }

    /// Number of stored vectors.
    pub fn count(&self) -> VectorStoreResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Read one stored vector by id.
    pub fn get(&self, id: &str) -> VectorStoreResult<Option<StoredVector>> {
        let stored = self
            .conn
            .query_row(
                "SELECT id, source_id, source_type, text, vector FROM vectors WHERE id = ?1",
                params![id],
                |row| {
                    let vector_bytes: Vec<u8> = row.get(4)?;
                    Ok(StoredVector {
                        id: row.get(0)?,
                        document: IndexedDocument {
                            source_id: row.get(1)?,
                            source_type: row.get(2)?,
                            text: row.get(3)?,
                        },
                        values: vector_bytes
                            .chunks_exact(4)
                            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                            .collect(),
                    })
                },
            )
            .optional()?;
        Ok(stored)
    }
}
