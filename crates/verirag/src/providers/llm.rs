//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// A single generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Complete prompt text
    pub prompt: String,
    /// Sampling temperature (0 = deterministic)
    pub temperature: f32,
    /// Output token budget
    pub max_output_tokens: u32,
    /// Ask the provider to enforce JSON output
    pub json_output: bool,
    /// JSON schema for providers that accept one
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    /// Deterministic request with JSON output enforced
    pub fn json(prompt: String, schema: serde_json::Value) -> Self {
        Self {
            prompt,
            temperature: 0.0,
            max_output_tokens: 1024,
            json_output: true,
            response_schema: Some(schema),
        }
    }
}

/// Trait for LLM text generation
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API (gemini-1.5-flash)
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Fail with a configuration error if a required credential is absent
    fn ensure_credentials(&self) -> Result<()> {
        Ok(())
    }

    /// Generate raw text for the request
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Whether the provider can structurally enforce JSON output
    fn supports_structured_output(&self) -> bool;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model in use
    fn model(&self) -> &str;
}
