//! SQLite-backed vector store
//!
//! Records live in a single `embeddings` table keyed by collection. Search is an
//! exact cosine scan over the collection, which keeps results deterministic.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::VectorStoreConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::{cosine_distance, UpsertOptions, VectorStoreProvider};
use crate::types::{ChunkMetadata, EmbeddingRecord, ScoredRecord};

/// Vector store persisted in SQLite
#[derive(Clone)]
pub struct SqliteVectorStore {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
    dimensions: usize,
    max_distance: Option<f32>,
}

impl SqliteVectorStore {
    /// Create or open the store at the given path
    pub fn new<P: AsRef<Path>>(path: P, dimensions: usize) -> Result<Self> {
        Self::open(path, dimensions, None)
    }

    /// Create or open the store, dropping hits farther than `max_distance` from the query
    pub fn open<P: AsRef<Path>>(path: P, dimensions: usize, max_distance: Option<f32>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn, dimensions, max_distance)
    }

    /// Open the store described by the vector store configuration
    pub fn from_config(config: &VectorStoreConfig, dimensions: usize) -> Result<Self> {
        Self::open(&config.storage_path, dimensions, config.max_distance)
    }

    /// Create an in-memory store
    pub fn in_memory(dimensions: usize) -> Result<Self> {
        Self::open_in_memory(dimensions, None)
    }

    /// Create an in-memory store with a distance cutoff
    pub fn open_in_memory(dimensions: usize, max_distance: Option<f32>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, dimensions, max_distance)
    }

    fn from_connection(conn: Connection, dimensions: usize, max_distance: Option<f32>) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::configuration("vector dimensions must be greater than 0"));
        }
        if max_distance.is_some_and(|max| !max.is_finite() || max < 0.0) {
            return Err(Error::configuration("max_distance must be a non-negative number"));
        }

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS embeddings (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                collection TEXT NOT NULL,
                document_id TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL,
                vector BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_embeddings_collection ON embeddings(collection);
            CREATE INDEX IF NOT EXISTS idx_embeddings_document ON embeddings(collection, document_id);
            "#,
        )?;

        Ok(Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                dimensions,
                max_distance,
            }),
        })
    }

    /// Number of records stored for one document in a collection
    pub fn count_for_document(&self, collection: &str, document_id: &Uuid) -> Result<usize> {
        let conn = self.inner.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM embeddings WHERE collection = ?1 AND document_id = ?2",
            params![collection, document_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl Inner {
    fn upsert(&self, collection: &str, records: &[EmbeddingRecord], options: UpsertOptions) -> Result<usize> {
        if let Some(bad) = records.iter().find(|r| r.vector.len() != self.dimensions) {
            return Err(Error::vector_store(format!(
                "Record {} has {} dimensions, store expects {}",
                bad.id,
                bad.vector.len(),
                self.dimensions
            )));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if options.pre_delete_collection {
            let deleted = tx.execute("DELETE FROM embeddings WHERE collection = ?1", params![collection])?;
            tracing::info!("Pre-deleted {} records from collection '{}'", deleted, collection);
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO embeddings (id, collection, document_id, content, metadata, vector, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            let now = chrono::Utc::now();
            for record in records {
                stmt.execute(params![
                    record.id.to_string(),
                    collection,
                    record.metadata.document_id.to_string(),
                    record.content,
                    serde_json::to_string(&record.metadata)?,
                    encode_vector(&record.vector),
                    now,
                ])?;
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    fn search(&self, collection: &str, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT id, content, metadata, vector FROM embeddings WHERE collection = ?1 ORDER BY seq",
            )?;
            let rows = stmt
                .query_map(params![collection], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions {
            return Err(Error::vector_store(format!(
                "Query has {} dimensions, store expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut hits = Vec::with_capacity(rows.len());
        for (id, content, metadata, blob) in rows {
            let vector = decode_vector(&blob);
            if vector.len() != self.dimensions {
                tracing::warn!("Skipping record {} with {} dimensions", id, vector.len());
                continue;
            }

            let distance = cosine_distance(query, &vector);
            if self.max_distance.is_some_and(|max| distance > max) {
                continue;
            }

            let metadata: ChunkMetadata = serde_json::from_str(&metadata)?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| Error::vector_store(format!("Invalid record id {}: {}", id, e)))?;

            hits.push(ScoredRecord {
                record: EmbeddingRecord {
                    id,
                    content,
                    vector,
                    metadata,
                },
                distance,
            });
        }

        // Stable sort keeps insertion order among equal distances
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM embeddings WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::internal(format!("Task join error: {}", e))
}

#[async_trait]
impl VectorStoreProvider for SqliteVectorStore {
    async fn upsert(
        &self,
        collection: &str,
        records: &[EmbeddingRecord],
        options: UpsertOptions,
    ) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        let collection = collection.to_string();
        let records = records.to_vec();
        tokio::task::spawn_blocking(move || inner.upsert(&collection, &records, options))
            .await
            .map_err(join_error)?
    }

    async fn similarity_search(
        &self,
        collection: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let inner = Arc::clone(&self.inner);
        let collection = collection.to_string();
        let query = query_vector.to_vec();
        tokio::task::spawn_blocking(move || inner.search(&collection, &query, k))
            .await
            .map_err(join_error)?
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        let collection = collection.to_string();
        tokio::task::spawn_blocking(move || inner.count(&collection))
            .await
            .map_err(join_error)?
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
