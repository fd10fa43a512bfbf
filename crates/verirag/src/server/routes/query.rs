//! Query endpoint returning a verified answer

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::server::state::AppState;

/// Request body for `POST /api/query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// POST /api/query - Answer a question from the indexed documents
///
/// A missing, non-string or blank `query`, or an unreadable body, yields
/// `400 {"error": "No query provided"}`. Everything else is a `200` with a
/// (possibly degraded) verified answer.
pub async fn query_documents(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let query = match payload {
        Ok(Json(QueryRequest { query: Some(q) })) if !q.trim().is_empty() => q,
        Ok(_) => return no_query(),
        Err(rejection) => {
            tracing::debug!("Rejected query body: {}", rejection);
            return no_query();
        }
    };

    tracing::info!("Query: \"{}\"", query);
    let answer = state.verifier().answer(&query).await;
    tracing::info!(
        "Answered with faithfulness {:.2} (citation: {:?})",
        answer.faithfulness_score,
        answer.source_citation
    );

    Json(answer).into_response()
}

fn no_query() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "No query provided" }))).into_response()
}
