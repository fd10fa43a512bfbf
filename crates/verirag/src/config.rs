//! Configuration for the VeriRAG service
//!
//! Built once at process start (defaults, then an optional TOML file, then
//! `VERIRAG_*` environment overrides) and handed to each component's constructor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VeriragConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embedding: EmbeddingConfig,
    /// Generation configuration
    pub generation: GenerationConfig,
    /// Provider endpoints and timeouts
    pub providers: ProviderConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Vector store configuration
    pub vector_store: VectorStoreConfig,
    /// Document metadata and upload storage
    pub storage: StorageConfig,
    /// Ingestion configuration
    pub ingestion: IngestionConfig,
}

impl VeriragConfig {
    /// Load configuration from an optional TOML file and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::configuration(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::configuration(format!("Invalid config: {}", e)))
    }

    /// Override selected fields from `VERIRAG_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("VERIRAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse::<u16>("VERIRAG_PORT") {
            self.server.port = port;
        }
        if let Ok(path) = std::env::var("VERIRAG_DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("VERIRAG_VECTOR_PATH") {
            self.vector_store.storage_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("VERIRAG_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        if let Ok(collection) = std::env::var("VERIRAG_COLLECTION") {
            self.vector_store.collection = collection;
        }
        if let Ok(url) = std::env::var("VERIRAG_OLLAMA_URL") {
            self.providers.ollama_base_url = url;
        }
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::configuration("chunking.chunk_size must be greater than 0"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::configuration(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::configuration("embedding.dimensions must be greater than 0"));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::configuration("embedding.batch_size must be greater than 0"));
        }
        if self.vector_store.collection.trim().is_empty() {
            return Err(Error::configuration("vector_store.collection must not be empty"));
        }
        if self.vector_store.top_k == 0 {
            return Err(Error::configuration("vector_store.top_k must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::configuration("generation.temperature must be within [0, 2]"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Which backend serves embeddings or generation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Generative Language API
    #[default]
    Gemini,
    /// Local Ollama server
    Ollama,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend provider
    pub provider: ProviderKind,
    /// Model version (fixed for the lifetime of a collection)
    pub model: String,
    /// Output dimensions of the model
    pub dimensions: usize,
    /// Texts per provider request
    pub batch_size: usize,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Explicit API key; takes precedence over `api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            batch_size: 100,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            api_key: None,
        }
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Backend provider
    pub provider: ProviderKind,
    /// Model name
    pub model: String,
    /// Sampling temperature (0 = deterministic)
    pub temperature: f32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request structured JSON output from the provider
    pub structured_output: bool,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Explicit API key; takes precedence over `api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.0,
            max_output_tokens: 1024,
            structured_output: true,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            api_key: None,
        }
    }
}

/// Provider endpoints and timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Gemini API base URL
    pub gemini_base_url: String,
    /// Ollama base URL
    pub ollama_base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Maximum overlap between neighbouring chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// SQLite file holding the embedding records
    pub storage_path: PathBuf,
    /// Collection shared by every ingested document
    pub collection: String,
    /// Passages retrieved per query
    pub top_k: usize,
    /// Drop hits whose cosine distance exceeds this value
    pub max_distance: Option<f32>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            storage_path: data_dir().join("vectors.db"),
            collection: "rag_collection".to_string(),
            top_k: 3,
            max_distance: None,
        }
    }
}

/// Document metadata and upload storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding document records
    pub database_path: PathBuf,
    /// Directory for uploaded PDF files
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: data_dir().join("documents.db"),
            upload_dir: data_dir().join("uploads"),
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Upper bound for PDF text extraction in seconds
    pub extraction_timeout_secs: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            extraction_timeout_secs: 120,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("verirag")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VeriragConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.vector_store.collection, "rag_collection");
        assert_eq!(config.vector_store.top_k, 3);
        assert_eq!(config.embedding.model, "text-embedding-004");
        assert_eq!(config.generation.temperature, 0.0);
    }

    #[test]
    fn test_partial_toml() {
        let config = VeriragConfig::from_toml(
            r#"
            [chunking]
            chunk_size = 500

            [embedding]
            provider = "ollama"
            model = "nomic-embed-text"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.embedding.provider, ProviderKind::Ollama);
        assert_eq!(config.embedding.dimensions, 768);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut config = VeriragConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            VeriragConfig::from_toml("[chunking]\nchunk_size = \"big\""),
            Err(Error::Configuration(_))
        ));
    }
}
