//! Document upload, listing and ingestion endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{IngestReport, SourceDocument};

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Ingest right after saving
    #[serde(default)]
    pub ingest: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document: SourceDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestReport>,
}

/// POST /api/documents - Upload a PDF (`file` field, optional `title` field)
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::parse(format!("Failed to read multipart field: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::parse(format!("Failed to read file: {}", e)))?;
                file = Some((filename, data.to_vec()));
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::parse(format!("Failed to read title: {}", e)))?,
                );
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let (filename, data) = file.ok_or_else(|| Error::parse("Missing 'file' field"))?;
    tracing::info!("Upload: {} ({} bytes)", filename, data.len());

    let document = state.add_document(&filename, title, &data).await?;
    let ingest = if params.ingest {
        let report = state.pipeline().ingest(&document.id).await;
        Some(report)
    } else {
        None
    };

    // Reflect the processed flag set by ingestion
    let id = document.id;
    let document = state.documents().get(&id).await?.unwrap_or(document);

    Ok((StatusCode::CREATED, Json(UploadResponse { document, ingest })))
}

/// GET /api/documents - All documents, oldest first
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<SourceDocument>>> {
    Ok(Json(state.documents().list().await?))
}

/// GET /api/documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SourceDocument>> {
    state
        .documents()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Document {} not found", id)))
}

/// POST /api/documents/:id/ingest - Index a registered document
pub async fn ingest_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> (StatusCode, Json<IngestReport>) {
    let report = state.pipeline().ingest(&id).await;

    let status = if report.succeeded() {
        StatusCode::OK
    } else if report.error_kind.as_deref() == Some("not_found") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    (status, Json(report))
}
