//! Ingestion pipeline orchestration
//!
//! extract → chunk → embed → store → mark processed, once per document.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::VeriragConfig;
use crate::error::{Error, Result};
use crate::providers::{DocumentStoreProvider, EmbeddingProvider, UpsertOptions, VectorStoreProvider};
use crate::types::{Chunk, EmbeddingRecord, IngestReport, IngestStage, PageText, SourceDocument};

use super::chunker::TextChunker;
use super::pdf::PdfExtractor;

/// Turns an uploaded PDF into searchable embedding records
pub struct IngestionPipeline {
    documents: Arc<dyn DocumentStoreProvider>,
    extractor: Arc<dyn PdfExtractor>,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStoreProvider>,
    collection: String,
    extraction_timeout: Duration,
}

impl IngestionPipeline {
    /// Create a pipeline writing into `collection`
    pub fn new(
        documents: Arc<dyn DocumentStoreProvider>,
        extractor: Arc<dyn PdfExtractor>,
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStoreProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            documents,
            extractor,
            chunker,
            embedder,
            vectors,
            collection: collection.into(),
            extraction_timeout: Duration::from_secs(120),
        }
    }

    /// Wire a pipeline from configuration and shared components
    pub fn from_config(
        config: &VeriragConfig,
        documents: Arc<dyn DocumentStoreProvider>,
        extractor: Arc<dyn PdfExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        let chunker = TextChunker::from_config(&config.chunking)?;
        Ok(Self::new(
            documents,
            extractor,
            chunker,
            embedder,
            vectors,
            config.vector_store.collection.clone(),
        )
        .with_extraction_timeout(Duration::from_secs(config.ingestion.extraction_timeout_secs)))
    }

    /// Bound the PDF extraction step
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Ingest one document. Never fails; the outcome is in the report.
    ///
    /// Partial writes are not rolled back, and ingesting the same document
    /// twice stores its chunks twice.
    pub async fn ingest(&self, document_id: &Uuid) -> IngestReport {
        let mut stage = IngestStage::Pending;

        match self.run(document_id, &mut stage).await {
            Ok((chunks_indexed, title)) => {
                tracing::info!(
                    "Document {} ('{}') indexed: {} chunks in '{}'",
                    document_id,
                    title,
                    chunks_indexed,
                    self.collection
                );
                IngestReport::success(*document_id, chunks_indexed, &title)
            }
            Err(e) => {
                tracing::error!("Ingestion of {} failed at {:?}: {}", document_id, stage, e);
                IngestReport::failure(*document_id, stage, &e)
            }
        }
    }

    async fn run(&self, document_id: &Uuid, stage: &mut IngestStage) -> Result<(usize, String)> {
        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Document {} not found", document_id)))?;

        *stage = IngestStage::Extracting;
        let pages = self.extract(&document).await?;
        tracing::info!(
            "[{}] Extracted {} pages from {}",
            document.title,
            pages.len(),
            document.file_path.display()
        );

        *stage = IngestStage::Chunking;
        let chunks = self.chunker.chunk_pages(document.id, &pages);
        if chunks.is_empty() {
            return Err(Error::extraction(
                document.file_path.display().to_string(),
                "no text could be chunked",
            ));
        }
        tracing::info!("[{}] Created {} chunks, generating embeddings...", document.title, chunks.len());

        *stage = IngestStage::EmbeddingAndStoring;
        let records = self.embed(&document, &chunks).await?;
        let written = self
            .vectors
            .upsert(&self.collection, &records, UpsertOptions::default())
            .await?;
        self.documents.mark_processed(&document.id).await?;

        *stage = IngestStage::Done;
        Ok((written, document.title))
    }

    async fn extract(&self, document: &SourceDocument) -> Result<Vec<PageText>> {
        let origin = document.file_path.display().to_string();
        let data = read_pdf(&document.file_path).await?;
        tracing::debug!("[{}] Read {} bytes", document.title, data.len());

        let extractor = Arc::clone(&self.extractor);
        let task_origin = origin.clone();
        let task = tokio::task::spawn_blocking(move || extractor.extract_pages(&data, &task_origin));

        // Extractor panics unwind into the JoinError and become a failed report
        match tokio::time::timeout(self.extraction_timeout, task).await {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) if e.is_panic() => {
                tracing::error!("[{}] PDF extraction panicked", document.title);
                Err(Error::extraction(origin, "PDF extraction panicked"))
            }
            Ok(Err(e)) => Err(Error::internal(format!("Task join error: {}", e))),
            Err(_) => Err(Error::extraction(
                origin,
                format!("extraction took longer than {}s", self.extraction_timeout.as_secs()),
            )),
        }
    }

    async fn embed(&self, document: &SourceDocument, chunks: &[Chunk]) -> Result<Vec<EmbeddingRecord>> {
        self.embedder.ensure_credentials()?;

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(Error::provider(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        Ok(chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddingRecord::new(chunk, &document.title, vector))
            .collect())
    }
}

async fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::not_found(format!(
            "PDF file not found: {}",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}
