//! Error types for the VeriRAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for VeriRAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// VeriRAG errors
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credential or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document record or its underlying file is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// PDF could not be read or yielded no text
    #[error("Failed to extract text from '{path}': {message}")]
    Extraction { path: String, message: String },

    /// Embedding or generation API failure (network, auth, quota, malformed body)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Generation output did not match the answer schema
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a vector store error
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short machine-readable kind, used in API bodies and ingest reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::NotFound(_) => "not_found",
            Error::Extraction { .. } => "extraction_error",
            Error::Provider(_) | Error::Http(_) => "provider_error",
            Error::Parse(_) | Error::Json(_) => "parse_error",
            Error::VectorStore(_) => "vector_store_error",
            Error::Database(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for administrative routes
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Provider(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Parse(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::VectorStore(_)
            | Error::Database(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (self.status_code(), body).into_response()
    }
}
