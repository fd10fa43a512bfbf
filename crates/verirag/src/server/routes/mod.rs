//! API routes for the VeriRAG server

pub mod documents;
pub mod query;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Documents - with larger body limit for PDF uploads
        .route(
            "/documents",
            get(documents::list_documents)
                .post(documents::upload_document)
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id/ingest", post(documents::ingest_document))
        // Query
        .route("/query", post(query::query_documents))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "name": "verirag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "PDF question answering with self-reported faithfulness",
        "collection": config.vector_store.collection,
        "top_k": config.vector_store.top_k,
        "embedding": state.embedding_label(),
        "generation": state.llm_label(),
        "endpoints": {
            "POST /api/query": "Answer a question from indexed documents",
            "POST /api/documents": "Upload a PDF (?ingest=true to index immediately)",
            "GET /api/documents": "List documents",
            "GET /api/documents/:id": "Get document details",
            "POST /api/documents/:id/ingest": "Index a document"
        }
    }))
}
