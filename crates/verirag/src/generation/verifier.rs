//! Retrieve → prompt → generate → parse, producing a [`VerifiedAnswer`]

use std::sync::Arc;

use crate::config::VeriragConfig;
use crate::error::Result;
use crate::providers::{EmbeddingProvider, GenerationRequest, LlmProvider, VectorStoreProvider};
use crate::types::VerifiedAnswer;

use super::output::{answer_response_schema, parse_verified_answer};
use super::prompt::PromptBuilder;

/// Answers queries strictly from indexed passages with a self-reported
/// faithfulness judgment
pub struct AnswerVerifier {
    embedder: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
    collection: String,
    top_k: usize,
    temperature: f32,
    max_output_tokens: u32,
}

impl AnswerVerifier {
    /// Create a verifier with deterministic decoding and `top_k = 3`
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            vectors,
            llm,
            collection: collection.into(),
            top_k: 3,
            temperature: 0.0,
            max_output_tokens: 1024,
        }
    }

    /// Wire a verifier from configuration and shared components
    pub fn from_config(
        config: &VeriragConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let mut verifier = Self::new(embedder, vectors, llm, config.vector_store.collection.clone());
        verifier.top_k = config.vector_store.top_k;
        verifier.temperature = config.generation.temperature;
        verifier.max_output_tokens = config.generation.max_output_tokens;
        verifier
    }

    /// Override the number of passages retrieved per query
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a query. Never fails; errors become degraded answers.
    pub async fn answer(&self, query: &str) -> VerifiedAnswer {
        if let Err(e) = self.embedder.ensure_credentials() {
            tracing::warn!("Answer service not configured: {}", e);
            return VerifiedAnswer::unconfigured(&e);
        }

        match self.retrieve_and_generate(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Query failed ({}): {}", e.kind(), e);
                VerifiedAnswer::system_error(&e)
            }
        }
    }

    async fn retrieve_and_generate(&self, query: &str) -> Result<VerifiedAnswer> {
        let query_vector = self.embedder.embed(query).await?;
        let hits = self
            .vectors
            .similarity_search(&self.collection, &query_vector, self.top_k)
            .await?;

        if hits.is_empty() {
            tracing::info!("No passages in '{}' matched the query", self.collection);
            return Ok(VerifiedAnswer::not_found());
        }

        let context = PromptBuilder::build_context(&hits);
        let prompt = PromptBuilder::build_verification_prompt(query, &context);
        tracing::debug!(
            "Retrieved {} passages ({} chars of context), generating with {}/{}",
            hits.len(),
            context.len(),
            self.llm.name(),
            self.llm.model()
        );

        self.llm.ensure_credentials()?;
        let request = GenerationRequest {
            prompt,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            json_output: self.llm.supports_structured_output(),
            response_schema: Some(answer_response_schema()),
        };
        let raw = self.llm.generate(&request).await?;
        let answer = parse_verified_answer(&raw)?;

        if !context.contains(answer.source_citation.as_str()) {
            tracing::warn!(
                "Citation is not a verbatim quote of the retrieved context: {:?}",
                answer.source_citation
            );
        }

        Ok(answer)
    }
}
