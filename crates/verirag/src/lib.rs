//! verirag: PDF question answering with retrieval-augmented generation and
//! self-reported faithfulness
//!
//! PDFs are split into page-bounded overlapping chunks, embedded, and stored in
//! a named vector collection. Queries retrieve the nearest passages and ask the
//! generation model for a four-field JSON verdict: answer, faithfulness score,
//! explanation and a verbatim citation.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::VeriragConfig;
pub use error::{Error, Result};
pub use generation::AnswerVerifier;
pub use ingestion::{IngestionPipeline, TextChunker};
pub use types::{
    document::{Chunk, EmbeddingRecord, PageText, ScoredRecord, SourceDocument},
    response::{IngestReport, IngestStage, IngestStatus, VerifiedAnswer},
};
