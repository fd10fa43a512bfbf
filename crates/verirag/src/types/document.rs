//! Document, chunk, and embedding record types with page provenance

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// An uploaded PDF tracked by the document metadata store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// Unique document ID
    pub id: Uuid,
    /// Human-readable title (defaults to the uploaded filename)
    pub title: String,
    /// Location of the PDF on disk
    pub file_path: PathBuf,
    /// Set once the document has been indexed successfully
    pub processed: bool,
    /// Upload timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SourceDocument {
    /// Create a new, unprocessed document record
    pub fn new(title: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            file_path: file_path.into(),
            processed: false,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Text extracted from one PDF page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A bounded passage of a page, the unit of retrieval
///
/// Offsets are character (not byte) positions into the trimmed page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Source document
    pub document_id: Uuid,
    /// Page the chunk was cut from
    pub page_number: u32,
    /// Position of the chunk within the document
    pub chunk_index: u32,
    /// First character (inclusive)
    pub char_start: usize,
    /// Last character (exclusive)
    pub char_end: usize,
    /// Chunk text
    pub content: String,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

/// Provenance stored alongside each vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub document_id: Uuid,
    pub title: String,
    pub page_number: u32,
    pub chunk_index: u32,
    pub char_start: usize,
    pub char_end: usize,
}

impl ChunkMetadata {
    /// Build metadata for a chunk of the given document
    pub fn from_chunk(chunk: &Chunk, title: &str) -> Self {
        Self {
            document_id: chunk.document_id,
            title: title.to_string(),
            page_number: chunk.page_number,
            chunk_index: chunk.chunk_index,
            char_start: chunk.char_start,
            char_end: chunk.char_end,
        }
    }
}

/// Persisted form of a chunk: text, vector, and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    /// Record ID (fresh per upsert; repeated ingestion yields new IDs)
    pub id: Uuid,
    /// Chunk text
    pub content: String,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// Provenance
    pub metadata: ChunkMetadata,
}

impl EmbeddingRecord {
    /// Pair a chunk with its embedding
    pub fn new(chunk: &Chunk, title: &str, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: chunk.content.clone(),
            vector,
            metadata: ChunkMetadata::from_chunk(chunk, title),
        }
    }
}

/// A similarity search hit
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    /// The stored record
    pub record: EmbeddingRecord,
    /// Cosine distance to the query (0 = identical direction)
    pub distance: f32,
}

impl ScoredRecord {
    /// Cosine similarity (1 - distance)
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}
