//! Response types: verified answers and ingestion reports

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Answer returned when retrieval finds nothing
pub const NO_RELEVANT_INFORMATION: &str =
    "I couldn't find any relevant information in the indexed documents to answer this question.";

/// Answer returned when any pipeline step fails
pub const PROCESSING_ERROR_ANSWER: &str = "I encountered an error while processing your request.";

/// Citation sentinel for failed generations
pub const SYSTEM_ERROR_CITATION: &str = "System Error";

/// Citation used when no context was consulted
pub const NO_CITATION: &str = "N/A";

/// Answer plus the model's self-reported faithfulness judgment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedAnswer {
    /// Answer text
    pub answer: String,
    /// Self-reported support by the context, in [0, 1]
    pub faithfulness_score: f32,
    /// Why the score was given
    pub explanation: String,
    /// Verbatim quote from the retrieved context
    pub source_citation: String,
}

impl VerifiedAnswer {
    /// Fixed response for an empty retrieval
    pub fn not_found() -> Self {
        Self {
            answer: NO_RELEVANT_INFORMATION.to_string(),
            faithfulness_score: 0.0,
            explanation: "No indexed passages matched the query, so no answer was generated."
                .to_string(),
            source_citation: NO_CITATION.to_string(),
        }
    }

    /// Degraded response when the embedding credential is missing
    pub fn unconfigured(error: &Error) -> Self {
        Self {
            answer: "The answer service is not configured: no embedding API credential is available."
                .to_string(),
            faithfulness_score: 0.0,
            explanation: error.to_string(),
            source_citation: NO_CITATION.to_string(),
        }
    }

    /// Degraded response for provider, store, or parse failures
    pub fn system_error(error: &Error) -> Self {
        Self {
            answer: PROCESSING_ERROR_ANSWER.to_string(),
            faithfulness_score: 0.0,
            explanation: error.to_string(),
            source_citation: SYSTEM_ERROR_CITATION.to_string(),
        }
    }
}

/// Ingestion stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Pending,
    Extracting,
    Chunking,
    EmbeddingAndStoring,
    Done,
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Error,
}

/// Boolean-plus-message result of [`crate::ingestion::IngestionPipeline::ingest`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    pub document_id: Uuid,
    pub status: IngestStatus,
    /// Last stage reached (`done` on success, the failing stage otherwise)
    pub stage: IngestStage,
    pub chunks_indexed: usize,
    pub message: String,
    /// Error kind on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl IngestReport {
    pub fn success(document_id: Uuid, chunks_indexed: usize, title: &str) -> Self {
        Self {
            document_id,
            status: IngestStatus::Success,
            stage: IngestStage::Done,
            chunks_indexed,
            message: format!("Indexed {} chunks from '{}'.", chunks_indexed, title),
            error_kind: None,
        }
    }

    pub fn failure(document_id: Uuid, stage: IngestStage, error: &Error) -> Self {
        Self {
            document_id,
            status: IngestStatus::Error,
            stage,
            chunks_indexed: 0,
            message: error.to_string(),
            error_kind: Some(error.kind().to_string()),
        }
    }

    /// True when the document was fully indexed
    pub fn succeeded(&self) -> bool {
        self.status == IngestStatus::Success
    }
}
