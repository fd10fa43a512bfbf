//! Google Gemini providers (Generative Language API)
//!
//! - `GeminiEmbedder`: text-embedding-004, 768 dimensions, batched
//! - `GeminiClient`: gemini-1.5-flash with JSON-mode output

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::credentials::ApiCredential;
use super::embedding::{validate_embeddings, EmbeddingProvider};
use super::http_client;
use super::llm::{GenerationRequest, LlmProvider};
use crate::config::{EmbeddingConfig, GenerationConfig, ProviderConfig};
use crate::error::{Error, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

fn model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("({}): {}", status, body)
}

/// Gemini embedding provider
pub struct GeminiEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    credential: ApiCredential,
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder
    pub fn new(
        providers: &ProviderConfig,
        config: &EmbeddingConfig,
        credential: ApiCredential,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(providers.timeout_secs)?,
            base_url: providers.gemini_base_url.trim_end_matches('/').to_string(),
            model: model_id(&config.model).to_string(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
            credential,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:batchEmbedContents", self.base_url, self.model)
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    fn ensure_credentials(&self) -> Result<()> {
        self.credential.resolve().map(|_| ())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let api_key = self.credential.resolve()?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedContentRequest {
                        model: format!("models/{}", self.model),
                        content: Content {
                            role: None,
                            parts: vec![Part { text: text.clone() }],
                        },
                    })
                    .collect(),
            };

            let response = self
                .client
                .post(self.endpoint())
                .header(API_KEY_HEADER, &api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::provider(format!("Gemini embedding request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(Error::provider(format!(
                    "Gemini embedding failed {}",
                    error_body(response).await
                )));
            }

            let embed_response: BatchEmbedResponse = response.json().await.map_err(|e| {
                Error::provider(format!("Failed to parse Gemini embedding response: {}", e))
            })?;

            let vectors: Vec<Vec<f32>> = embed_response
                .embeddings
                .into_iter()
                .map(|e| e.values)
                .collect();
            validate_embeddings(batch.len(), self.dimensions, &vectors)?;
            all_embeddings.extend(vectors);
        }

        tracing::debug!("Embedded {} texts with {}", texts.len(), self.model);
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Gemini generation client
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    structured_output: bool,
    credential: ApiCredential,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(
        providers: &ProviderConfig,
        config: &GenerationConfig,
        credential: ApiCredential,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(providers.timeout_secs)?,
            base_url: providers.gemini_base_url.trim_end_matches('/').to_string(),
            model: model_id(&config.model).to_string(),
            structured_output: config.structured_output,
            credential,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl LlmProvider for GeminiClient {
    fn ensure_credentials(&self) -> Result<()> {
        self.credential.resolve().map(|_| ())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self.credential.resolve()?;
        let json_mode = self.structured_output && request.json_output;

        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: json_mode.then(|| "application/json".to_string()),
                response_schema: if json_mode {
                    request.response_schema.clone()
                } else {
                    None
                },
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::provider(format!(
                "Gemini generation failed {}",
                error_body(response).await
            )));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("Failed to parse Gemini response: {}", e)))?;

        let candidate = gen_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider("No candidates in Gemini response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::provider(format!(
                "No text in Gemini response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }

    fn supports_structured_output(&self) -> bool {
        self.structured_output
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
