//! Shared fixtures: deterministic providers, PDF builder and a wired harness

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use verirag::config::VeriragConfig;
use verirag::ingestion::{IngestionPipeline, PdfTextExtractor, TextChunker};
use verirag::providers::{DocumentStoreProvider, EmbeddingProvider, GenerationRequest, LlmProvider};
use verirag::server::state::AppState;
use verirag::storage::{SqliteDocumentStore, SqliteVectorStore, UploadStore};
use verirag::{AnswerVerifier, Error, Result, SourceDocument};

pub const DIMENSIONS: usize = 64;
pub const COLLECTION: &str = "rag_collection";

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket
pub struct HashingEmbedder {
    pub calls: AtomicUsize,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            // FNV-1a
            let hash = word
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
            v[(hash % DIMENSIONS as u64) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    fn model(&self) -> &str {
        "hashing-bow"
    }

    fn name(&self) -> &str {
        "test"
    }
}

/// Generator that replays a fixed reply and records every prompt
pub struct ScriptedGenerator {
    reply: String,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.prompt.clone());
        if self.reply.is_empty() {
            return Err(Error::provider("scripted generator has no reply"));
        }
        Ok(self.reply.clone())
    }

    fn supports_structured_output(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

pub const SKY_REPLY: &str = r#"{"answer":"The sky is blue.","faithfulness_score":0.95,"explanation":"The context states this directly.","source_citation":"The sky is blue."}"#;

/// Single-font PDF with one page per entry, each page showing its lines
pub fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Fully wired components over temporary on-disk stores
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub config: VeriragConfig,
    pub embedder: Arc<HashingEmbedder>,
    pub generator: Arc<ScriptedGenerator>,
    pub documents: Arc<SqliteDocumentStore>,
    pub vectors: Arc<SqliteVectorStore>,
    pub state: AppState,
}

impl Harness {
    pub fn new(reply: &str) -> Self {
        Self::with_embedder(reply, Arc::new(HashingEmbedder::new()))
    }

    pub fn with_embedder(reply: &str, embedder: Arc<HashingEmbedder>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VeriragConfig::default();
        config.embedding.dimensions = DIMENSIONS;
        config.chunking.chunk_size = 200;
        config.chunking.chunk_overlap = 40;
        config.vector_store.storage_path = dir.path().join("vectors.db");
        config.storage.database_path = dir.path().join("documents.db");
        config.storage.upload_dir = dir.path().join("uploads");

        let generator = Arc::new(ScriptedGenerator::new(reply));
        let documents = Arc::new(SqliteDocumentStore::new(&config.storage.database_path).unwrap());
        let vectors = Arc::new(SqliteVectorStore::new(&config.vector_store.storage_path, DIMENSIONS).unwrap());
        let uploads = UploadStore::new(&config.storage.upload_dir).unwrap();

        let pipeline = IngestionPipeline::new(
            documents.clone(),
            Arc::new(PdfTextExtractor::new()),
            TextChunker::from_config(&config.chunking).unwrap(),
            embedder.clone(),
            vectors.clone(),
            COLLECTION,
        );
        let verifier = AnswerVerifier::new(embedder.clone(), vectors.clone(), generator.clone(), COLLECTION);

        let state = AppState::from_parts(
            config.clone(),
            documents.clone(),
            uploads,
            pipeline,
            verifier,
            embedder.as_ref(),
            generator.as_ref(),
        );

        Self {
            dir,
            config,
            embedder,
            generator,
            documents,
            vectors,
            state,
        }
    }

    /// Write a PDF to the temp dir and register it
    pub async fn add_pdf(&self, name: &str, pages: &[&[&str]]) -> SourceDocument {
        let path = self.write_pdf(name, pages);
        self.state.add_document_from_path(&path, None).await.unwrap()
    }

    pub fn write_pdf(&self, name: &str, pages: &[&[&str]]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, build_pdf(pages)).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub async fn is_processed(&self, document: &SourceDocument) -> bool {
        self.documents.get(&document.id).await.unwrap().unwrap().processed
    }
}
