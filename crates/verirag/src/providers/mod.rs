//! Provider abstractions for embeddings, generation, vector storage, and document metadata
//!
//! Trait-based seams let the pipeline switch between the Gemini API and a local
//! Ollama server, and keep the stores swappable.

pub mod credentials;
pub mod document_store;
pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;
pub mod vector_store;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderKind, VeriragConfig};
use crate::error::{Error, Result};

pub use credentials::ApiCredential;
pub use document_store::DocumentStoreProvider;
pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiClient, GeminiEmbedder};
pub use llm::{GenerationRequest, LlmProvider};
pub use ollama::{OllamaEmbedder, OllamaLlm};
pub use vector_store::{UpsertOptions, VectorStoreProvider};

/// HTTP client with the fixed per-request timeout used for every provider call
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Build the configured embedding provider
pub fn embedding_provider(config: &VeriragConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.embedding.provider {
        ProviderKind::Gemini => Arc::new(GeminiEmbedder::new(
            &config.providers,
            &config.embedding,
            ApiCredential::new(config.embedding.api_key.clone(), &config.embedding.api_key_env),
        )?),
        ProviderKind::Ollama => Arc::new(OllamaEmbedder::new(&config.providers, &config.embedding)?),
    };
    Ok(provider)
}

/// Build the configured generation provider
pub fn llm_provider(config: &VeriragConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.generation.provider {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(
            &config.providers,
            &config.generation,
            ApiCredential::new(config.generation.api_key.clone(), &config.generation.api_key_env),
        )?),
        ProviderKind::Ollama => Arc::new(OllamaLlm::new(&config.providers, &config.generation)?),
    };
    Ok(provider)
}
