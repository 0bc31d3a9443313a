//! End-to-end router tests: chunk upload → finalize → extraction.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use harlog::{ExtractionPipeline, MockClassifier};
use http_body_util::BodyExt;
use serde_json::Value;
use server_core::server::app::{build_app, AppState};
use server_core::uploads::{MemorySessionStore, UploadTracker};
use tower::ServiceExt;

const BOUNDARY: &str = "X-TEST-BOUNDARY";

const CAPTURE: &str = r#"{
  "log": {
    "entries": [
      {
        "request": {"method": "GET", "url": "https://shop.example/", "headers": []},
        "response": {
          "status": 200,
          "headers": [{"name": "Content-Type", "value": "text/html"}],
          "content": {"mimeType": "text/html", "size": 5120}
        }
      },
      {
        "request": {
          "method": "GET",
          "url": "https://shop.example/api/cart",
          "headers": [{"name": "Accept", "value": "application/json"}]
        },
        "response": {
          "status": 200,
          "headers": [{"name": "Content-Type", "value": "application/json"}],
          "content": {"mimeType": "application/json", "size": 210}
        }
      },
      {
        "request": {
          "method": "POST",
          "url": "https://shop.example/api/orders",
          "headers": [{"name": "Content-Type", "value": "application/json"}],
          "postData": {"text": "{\"sku\": \"A-1\"}"}
        },
        "response": {
          "status": 201,
          "headers": [{"name": "Content-Type", "value": "application/json"}],
          "content": {"mimeType": "application/json", "size": 64}
        }
      }
    ]
  }
}"#;

fn app_with(classifier: MockClassifier, dir: &tempfile::TempDir) -> Router {
    let tracker = Arc::new(UploadTracker::new(
        Arc::new(MemorySessionStore::new()),
        dir.path(),
    ));
    let pipeline = Arc::new(
        ExtractionPipeline::new(Arc::new(classifier))
            .with_classifier_deadline(Duration::from_secs(5)),
    );
    build_app(AppState {
        tracker,
        pipeline,
        default_model: "o3-mini-2025-01-31".to_string(),
        http_client: reqwest::Client::new(),
    })
}

fn field(name: &str, value: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
}

fn chunk_body(file_id: &str, index: u32, total: u32, payload: &[u8], chunk_first: bool) -> Vec<u8> {
    let meta = [
        field("fileId", file_id),
        field("index", &index.to_string()),
        field("totalChunks", &total.to_string()),
        field("filename", "capture.har"),
    ]
    .concat();

    let mut chunk = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"chunk\"; filename=\"blob\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    chunk.extend_from_slice(payload);
    chunk.extend_from_slice(b"\r\n");

    let mut body = Vec::new();
    if chunk_first {
        body.extend_from_slice(&chunk);
        body.extend_from_slice(meta.as_bytes());
    } else {
        body.extend_from_slice(meta.as_bytes());
        body.extend_from_slice(&chunk);
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send_chunk(app: &Router, file_id: &str, index: u32, total: u32, payload: &[u8]) -> Value {
    send_chunk_ordered(app, file_id, index, total, payload, false).await
}

async fn send_chunk_ordered(
    app: &Router,
    file_id: &str,
    index: u32,
    total: u32,
    payload: &[u8],
    chunk_first: bool,
) -> Value {
    let request = Request::post("/api/upload-chunked")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(chunk_body(file_id, index, total, payload, chunk_first)))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> axum::response::Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn health_reports_session_count() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["uploads"]["active_sessions"], 0);
}

#[tokio::test]
async fn upload_finalize_extract_flow() {
    let dir = tempfile::tempdir().unwrap();
    // Pick the order-creation call, index 1 after filtering.
    let app = app_with(MockClassifier::selecting(1, "creates the order"), &dir);

    // Split the capture into two chunks, delivered out of order.
    let raw = CAPTURE.as_bytes();
    let (first, second) = raw.split_at(raw.len() / 2);

    let ack = send_chunk(&app, "cap-1", 1, 2, second).await;
    assert_eq!(ack["success"], true);
    assert_eq!(ack["chunkIndex"], 1);
    send_chunk(&app, "cap-1", 0, 2, first).await;

    let response = post_json(
        &app,
        "/api/finalize-upload",
        serde_json::json!({"fileId": "cap-1", "description": "placing an order"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["fileId"], "cap-1");
    assert_eq!(body["filename"], "capture.har");
    assert_eq!(body["status"], "complete");
    assert_eq!(body["chunks"], 2);
    assert_eq!(body["size"], raw.len() as u64);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/extract-api?fileId=cap-1&description=placing%20an%20order")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    let curl = body["curlCommand"].as_str().unwrap();
    assert!(curl.starts_with("curl -X POST 'https://shop.example/api/orders'"));
    assert!(curl.contains(r#"-d '{"sku": "A-1"}'"#));
    assert_eq!(body["requestDetails"]["method"], "POST");
    assert_eq!(body["requestDetails"]["responseStatus"], 201);
    assert_eq!(body["requestDetails"]["contentType"], "application/json");
    assert_eq!(body["requestDetails"]["responseSize"], 64);
}

#[tokio::test]
async fn chunk_field_before_metadata_is_buffered() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    let ack = send_chunk_ordered(&app, "cap-2", 0, 1, CAPTURE.as_bytes(), true).await;
    assert_eq!(ack["success"], true);
    assert_eq!(ack["chunkIndex"], 0);

    let response = post_json(
        &app,
        "/api/finalize-upload",
        serde_json::json!({"fileId": "cap-2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn finalize_before_all_chunks_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    send_chunk(&app, "cap-3", 0, 3, b"partial").await;
    send_chunk(&app, "cap-3", 2, 3, b"partial").await;

    let response = post_json(
        &app,
        "/api/finalize-upload",
        serde_json::json!({"fileId": "cap-3"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Upload incomplete. Received 2 of 3 chunks");
}

#[tokio::test]
async fn finalize_unknown_upload_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    let response = post_json(
        &app,
        "/api/finalize-upload",
        serde_json::json!({"fileId": "missing"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Upload not found");
}

#[tokio::test]
async fn extract_on_non_har_upload_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    send_chunk(&app, "cap-4", 0, 1, b"this is not json").await;
    post_json(&app, "/api/finalize-upload", serde_json::json!({"fileId": "cap-4"})).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/extract-api?fileId=cap-4&description=anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid HAR file format"));
}

#[tokio::test]
async fn extract_with_no_api_entries_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    let html_only = r#"{
      "log": {"entries": [{
        "request": {"method": "GET", "url": "https://a.com/", "headers": []},
        "response": {
          "status": 200,
          "headers": [{"name": "Content-Type", "value": "text/html"}],
          "content": {"mimeType": "text/html", "size": 100}
        }
      }]}
    }"#;
    send_chunk(&app, "cap-5", 0, 1, html_only.as_bytes()).await;
    post_json(&app, "/api/finalize-upload", serde_json::json!({"fileId": "cap-5"})).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/extract-api?fileId=cap-5&description=anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "No API requests found in the HAR file");
}

#[tokio::test]
async fn proxy_failure_reports_envelope_with_request_info() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::new(), &dir);

    // An unsendable method fails before any network traffic.
    let response = post_json(
        &app,
        "/proxy",
        serde_json::json!({
            "url": "https://upstream.example/api/items",
            "method": "not a method",
            "headers": {"X-Trace": "1"},
            "body": "{}"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("invalid method"));
    assert!(body.get("server_response").is_none());

    // The failed request is echoed back for the caller to inspect.
    assert_eq!(body["request_info"]["url"], "https://upstream.example/api/items");
    assert_eq!(body["request_info"]["method"], "not a method");
    assert_eq!(body["request_info"]["headers"]["X-Trace"], "1");
    assert_eq!(body["request_info"]["body"], "{}");
}

#[tokio::test]
async fn classifier_outage_still_extracts_first_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(MockClassifier::failing(), &dir);

    send_chunk(&app, "cap-6", 0, 1, CAPTURE.as_bytes()).await;
    post_json(&app, "/api/finalize-upload", serde_json::json!({"fileId": "cap-6"})).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/extract-api?fileId=cap-6&description=anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    // First API-like entry wins when the classifier is down.
    assert_eq!(body["requestDetails"]["url"], "https://shop.example/api/cart");
}
