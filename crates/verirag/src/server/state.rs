//! Application state shared by the HTTP server and the CLI

use std::path::Path;
use std::sync::Arc;

use crate::config::VeriragConfig;
use crate::error::{Error, Result};
use crate::generation::AnswerVerifier;
use crate::ingestion::{IngestionPipeline, PdfTextExtractor};
use crate::providers::{self, DocumentStoreProvider, EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::storage::{SqliteDocumentStore, SqliteVectorStore, UploadStore};
use crate::types::SourceDocument;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: VeriragConfig,
    /// Document registry
    documents: Arc<dyn DocumentStoreProvider>,
    /// Upload directory
    uploads: UploadStore,
    /// Indexing pipeline
    pipeline: IngestionPipeline,
    /// Query-time verifier
    verifier: AnswerVerifier,
    /// `provider/model` labels for /api/info
    embedding_label: String,
    llm_label: String,
}

impl AppState {
    /// Build state from configuration: SQLite stores, providers, pipeline and verifier
    pub fn new(config: VeriragConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Initializing VeriRAG state (embedding: {:?}, generation: {:?})...",
            config.embedding.provider,
            config.generation.provider
        );

        let embedder = providers::embedding_provider(&config)?;
        let llm = providers::llm_provider(&config)?;

        let vectors: Arc<dyn VectorStoreProvider> = Arc::new(SqliteVectorStore::from_config(
            &config.vector_store,
            config.embedding.dimensions,
        )?);
        tracing::info!("Vector store ready at {}", config.vector_store.storage_path.display());

        let documents: Arc<dyn DocumentStoreProvider> =
            Arc::new(SqliteDocumentStore::new(&config.storage.database_path)?);
        let uploads = UploadStore::new(&config.storage.upload_dir)?;

        if let Err(e) = embedder.ensure_credentials() {
            tracing::warn!("{}; queries will return a degraded answer until it is set", e);
        }

        let pipeline = IngestionPipeline::from_config(
            &config,
            Arc::clone(&documents),
            Arc::new(PdfTextExtractor::new()),
            Arc::clone(&embedder),
            Arc::clone(&vectors),
        )?;
        let verifier = AnswerVerifier::from_config(&config, Arc::clone(&embedder), vectors, Arc::clone(&llm));

        Ok(Self::from_parts(config, documents, uploads, pipeline, verifier, embedder.as_ref(), llm.as_ref()))
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: VeriragConfig,
        documents: Arc<dyn DocumentStoreProvider>,
        uploads: UploadStore,
        pipeline: IngestionPipeline,
        verifier: AnswerVerifier,
        embedder: &dyn EmbeddingProvider,
        llm: &dyn LlmProvider,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                embedding_label: format!("{}/{}", embedder.name(), embedder.model()),
                llm_label: format!("{}/{}", llm.name(), llm.model()),
                config,
                documents,
                uploads,
                pipeline,
                verifier,
            }),
        }
    }

    pub fn config(&self) -> &VeriragConfig {
        &self.inner.config
    }

    pub fn documents(&self) -> &Arc<dyn DocumentStoreProvider> {
        &self.inner.documents
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.inner.pipeline
    }

    pub fn verifier(&self) -> &AnswerVerifier {
        &self.inner.verifier
    }

    pub fn embedding_label(&self) -> &str {
        &self.inner.embedding_label
    }

    pub fn llm_label(&self) -> &str {
        &self.inner.llm_label
    }

    /// Save an uploaded PDF and register it as an unprocessed document
    pub async fn add_document(&self, filename: &str, title: Option<String>, data: &[u8]) -> Result<SourceDocument> {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_title(filename));

        let id = uuid::Uuid::new_v4();
        let path = self.inner.uploads.save(&id, filename, data).await?;

        let mut document = SourceDocument::new(title, path);
        document.id = id;
        self.inner.documents.create(&document).await?;

        tracing::info!("Registered document {} ('{}', {} bytes)", document.id, document.title, data.len());
        Ok(document)
    }

    /// Register a PDF from the local filesystem
    pub async fn add_document_from_path(&self, path: &Path, title: Option<String>) -> Result<SourceDocument> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("PDF file not found: {}", path.display()))
            } else {
                e.into()
            }
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        self.add_document(&filename, title, &data).await
    }
}

/// Filename without its `.pdf` extension
fn default_title(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.is_empty() {
        "Untitled".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title() {
        assert_eq!(default_title("Annual Report.pdf"), "Annual Report");
        assert_eq!(default_title("dir/notes.pdf"), "notes");
        assert_eq!(default_title(""), "Untitled");
    }

    #[tokio::test]
    async fn test_state_from_config_registers_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VeriragConfig::default();
        config.vector_store.storage_path = dir.path().join("vectors.db");
        config.storage.database_path = dir.path().join("documents.db");
        config.storage.upload_dir = dir.path().join("uploads");

        let state = AppState::new(config).unwrap();
        let doc = state.add_document("guide.pdf", None, b"%PDF-1.5\n").await.unwrap();

        assert_eq!(doc.title, "guide");
        assert!(doc.file_path.exists());
        assert!(!doc.processed);
        assert_eq!(state.documents().get(&doc.id).await.unwrap().unwrap().id, doc.id);
        assert_eq!(state.embedding_label(), "gemini/text-embedding-004");
    }
}
