//! SQLite document registry
//!
//! Tracks uploaded PDFs: id, title, file location and whether the document
//! has been indexed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::DocumentStoreProvider;
use crate::types::SourceDocument;

/// SQLite-based document metadata store
#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn in_memory() -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                file_path TEXT NOT NULL,
                processed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at);
            "#,
        )?;

        Ok(())
    }

    fn insert(&self, document: &SourceDocument) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (id, title, file_path, processed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                document.id.to_string(),
                document.title,
                document.file_path.to_string_lossy(),
                document.processed,
                document.created_at,
            ],
        )?;
        Ok(())
    }

    fn find(&self, id: &Uuid) -> Result<Option<SourceDocument>> {
        let conn = self.conn.lock();
        let document = conn
            .query_row(
                "SELECT id, title, file_path, processed, created_at FROM documents WHERE id = ?1",
                params![id.to_string()],
                row_to_document,
            )
            .optional()?;
        Ok(document)
    }

    fn set_processed(&self, id: &Uuid) -> Result<()> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE documents SET processed = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;

        if updated == 0 {
            return Err(Error::not_found(format!("Document {} not found", id)));
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<SourceDocument>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, file_path, processed, created_at FROM documents
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let documents = stmt
            .query_map([], row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(documents)
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<SourceDocument> {
    let id_str: String = row.get(0)?;
    let file_path: String = row.get(2)?;
    let created_at: DateTime<Utc> = row.get(4)?;

    Ok(SourceDocument {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?,
        title: row.get(1)?,
        file_path: PathBuf::from(file_path),
        processed: row.get(3)?,
        created_at,
    })
}

#[async_trait]
impl DocumentStoreProvider for SqliteDocumentStore {
    async fn create(&self, document: &SourceDocument) -> Result<()> {
        self.insert(document)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<SourceDocument>> {
        self.find(id)
    }

    async fn mark_processed(&self, id: &Uuid) -> Result<()> {
        self.set_processed(id)
    }

    async fn list(&self) -> Result<Vec<SourceDocument>> {
        self.all()
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
