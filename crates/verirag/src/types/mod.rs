//! Core types for the VeriRAG pipeline

pub mod document;
pub mod response;

pub use document::{Chunk, ChunkMetadata, EmbeddingRecord, PageText, ScoredRecord, SourceDocument};
pub use response::{IngestReport, IngestStage, IngestStatus, VerifiedAnswer};
