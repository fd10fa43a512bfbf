//! HTTP surface: query validation, uploads and ingestion status codes

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{build_pdf, Harness, SKY_REPLY};
use verirag::server::build_router;

const BOUNDARY: &str = "verirag-test-boundary";

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(uri: &str, filename: &str, data: &[u8], title: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(title) = title {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn query_without_text_is_rejected() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());

    for body in ["{}", r#"{"query": ""}"#, r#"{"query": "   "}"#, r#"{"query": 42}"#, "not json"] {
        let (status, value) = send(&router, post_json("/api/query", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(value, json!({"error": "No query provided"}));
    }

    let missing_type = Request::post("/api/query").body(Body::from(r#"{"query":"sky"}"#)).unwrap();
    let (status, _) = send(&router, missing_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_on_empty_index_returns_sentinel() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());

    let (status, value) = send(&router, post_json("/api/query", r#"{"query":"What color is the sky?"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["faithfulness_score"], 0.0);
    assert_eq!(value["source_citation"], "N/A");
    assert_eq!(value.as_object().unwrap().len(), 4);
}

#[tokio::test]
async fn upload_ingest_and_query() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());
    let pdf = build_pdf(&[&["The sky is blue."]]);

    let (status, value) = send(&router, multipart("/api/documents", "sky.pdf", &pdf, Some("Sky Facts"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(value["document"]["title"], "Sky Facts");
    assert_eq!(value["document"]["processed"], false);
    assert!(value.get("ingest").is_none());
    let id = value["document"]["id"].as_str().unwrap().to_string();

    let (status, report) = send(&router, Request::post(format!("/api/documents/{id}/ingest")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["status"], "success");
    assert_eq!(report["stage"], "done");
    assert_eq!(report["chunks_indexed"], 1);

    let (status, doc) = send(&router, Request::get(format!("/api/documents/{id}")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["processed"], true);

    let (status, answer) = send(&router, post_json("/api/query", r#"{"query":"What color is the sky?"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(answer["answer"].as_str().unwrap().contains("blue"));
    assert_eq!(answer["source_citation"], "The sky is blue.");
}

#[tokio::test]
async fn upload_with_immediate_ingest() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());
    let pdf = build_pdf(&[&["The sky is blue."]]);

    let (status, value) = send(&router, multipart("/api/documents?ingest=true", "sky.pdf", &pdf, None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(value["document"]["title"], "sky");
    assert_eq!(value["document"]["processed"], true);
    assert_eq!(value["ingest"]["status"], "success");

    let (status, list) = send(&router, Request::get("/api/documents").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_rejects_non_pdf_and_missing_file() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());

    let (status, value) = send(&router, multipart("/api/documents", "notes.txt", b"plain text", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(value["error"]["type"], "extraction_error");

    let empty = Request::post("/api/documents")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(format!("--{BOUNDARY}--\r\n")))
        .unwrap();
    let (status, _) = send(&router, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ingest_status_codes() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());

    let unknown = uuid::Uuid::new_v4();
    let (status, report) = send(&router, Request::post(format!("/api/documents/{unknown}/ingest")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(report["status"], "error");
    assert_eq!(report["error_kind"], "not_found");

    let broken = h.state.add_document("broken.pdf", None, b"%PDF-1.5\ngarbage").await.unwrap();
    let (status, report) = send(&router, Request::post(format!("/api/documents/{}/ingest", broken.id)).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(report["stage"], "extracting");

    let (status, value) = send(&router, Request::get(format!("/api/documents/{unknown}")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value["error"]["type"], "not_found");
}

#[tokio::test]
async fn health_and_info() {
    let h = Harness::new(SKY_REPLY);
    let router = build_router(h.state.clone());

    let (status, body) = send(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));

    let (status, info) = send(&router, Request::get("/api/info").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["name"], "verirag");
    assert_eq!(info["collection"], "rag_collection");
    assert_eq!(info["embedding"], "test/hashing-bow");
    assert_eq!(info["generation"], "scripted/scripted-1");
}
