//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EmbeddingRecord, ScoredRecord};

/// Options for [`VectorStoreProvider::upsert`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOptions {
    /// Remove every existing entry of the collection before writing
    pub pre_delete_collection: bool,
}

/// Trait for vector storage and similarity search over named collections
///
/// Implementations:
/// - `SqliteVectorStore`: SQLite-backed exact cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Append records to `collection`, returning how many were written.
    ///
    /// Existing entries are kept unless `options.pre_delete_collection` is set;
    /// writing the same logical document twice yields duplicate entries.
    async fn upsert(
        &self,
        collection: &str,
        records: &[EmbeddingRecord],
        options: UpsertOptions,
    ) -> Result<usize>;

    /// The `k` nearest records by cosine distance, nearest first.
    ///
    /// An empty or unknown collection yields an empty result, not an error.
    async fn similarity_search(
        &self,
        collection: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>>;

    /// Number of records in `collection`
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Vector dimensions accepted by the store
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Cosine distance in `[0, 2]`; a zero vector is treated as orthogonal (distance 1)
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    1.0 - similarity
}
