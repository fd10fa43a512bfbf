//! Ollama-based providers for embeddings and generation
//!
//! Local backend; no credential is required.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::embedding::{validate_embeddings, EmbeddingProvider};
use super::http_client;
use super::llm::{GenerationRequest, LlmProvider};
use crate::config::{EmbeddingConfig, GenerationConfig, ProviderConfig};
use crate::error::{Error, Result};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(providers: &ProviderConfig, config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(providers.timeout_secs)?,
            base_url: providers.ollama_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let response = self
                .client
                .post(format!("{}/api/embed", self.base_url))
                .json(&EmbedRequest {
                    model: &self.model,
                    input: batch,
                })
                .send()
                .await
                .map_err(|e| Error::provider(format!("Ollama embedding request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::provider(format!(
                    "Ollama embedding failed ({}): {}",
                    status, body
                )));
            }

            let embed_response: EmbedResponse = response.json().await.map_err(|e| {
                Error::provider(format!("Failed to parse Ollama embedding response: {}", e))
            })?;

            validate_embeddings(batch.len(), self.dimensions, &embed_response.embeddings)?;
            all_embeddings.extend(embed_response.embeddings);
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: reqwest::Client,
    base_url: String,
    model: String,
    structured_output: bool,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider
    pub fn new(providers: &ProviderConfig, config: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(providers.timeout_secs)?,
            base_url: providers.ollama_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            structured_output: config.structured_output,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let json_mode = self.structured_output && request.json_output;

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.model,
                prompt: &request.prompt,
                stream: false,
                format: json_mode.then_some("json"),
                options: GenerateOptions {
                    temperature: request.temperature,
                    num_predict: request.max_output_tokens,
                },
            })
            .send()
            .await
            .map_err(|e| Error::provider(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(format!(
                "Ollama generation failed ({}): {}",
                status, body
            )));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(gen_response.response)
    }

    fn supports_structured_output(&self) -> bool {
        self.structured_output
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn providers(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            ollama_base_url: server.base_url(),
            timeout_secs: 5,
            ..ProviderConfig::default()
        }
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed").body_contains("nomic-embed-text");
                then.status(200)
                    .json_body(json!({"embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]}));
            })
            .await;

        let config = EmbeddingConfig {
            model: "nomic-embed-text".to_string(),
            dimensions: 3,
            ..EmbeddingConfig::default()
        };
        let embedder = OllamaEmbedder::new(&providers(&server), &config).unwrap();

        assert!(embedder.ensure_credentials().is_ok());
        let vectors = embedder
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.4, 0.5, 0.6]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_uses_json_format() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .body_contains("\"format\":\"json\"")
                    .body_contains("\"stream\":false");
                then.status(200).json_body(json!({"response": "{}", "done": true}));
            })
            .await;

        let config = GenerationConfig {
            model: "llama3.2".to_string(),
            ..GenerationConfig::default()
        };
        let llm = OllamaLlm::new(&providers(&server), &config).unwrap();

        let text = llm
            .generate(&GenerationRequest::json("prompt".to_string(), json!({})))
            .await
            .unwrap();
        assert_eq!(text, "{}");
        mock.assert_async().await;
    }
}
