//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations:
/// - `GeminiEmbedder`: Google Generative Language API (text-embedding-004)
/// - `OllamaEmbedder`: Local Ollama server (nomic-embed-text)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Fail with a configuration error if a required credential is absent.
    ///
    /// Must not perform network I/O.
    fn ensure_credentials(&self) -> Result<()> {
        Ok(())
    }

    /// Generate one vector per text, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| Error::provider("Embedding response was empty"))
    }

    /// Output dimensions of the model
    fn dimensions(&self) -> usize;

    /// Model version used for every vector
    fn model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Check that a provider answered with one vector of the right size per input
pub fn validate_embeddings(expected: usize, dimensions: usize, embeddings: &[Vec<f32>]) -> Result<()> {
    if embeddings.len() != expected {
        return Err(Error::provider(format!(
            "Expected {} embeddings, provider returned {}",
            expected,
            embeddings.len()
        )));
    }

    if let Some((i, bad)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != dimensions)
    {
        return Err(Error::provider(format!(
            "Embedding {} has {} dimensions, expected {}",
            i,
            bad.len(),
            dimensions
        )));
    }

    Ok(())
}
