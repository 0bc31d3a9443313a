//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::Method,
    routing::{get, post},
    Router,
};
use harlog::ExtractionPipeline;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::routes::{
    extract_handler, finalize_handler, health_handler, proxy_handler, upload_chunk_handler,
};
use crate::uploads::UploadTracker;

/// Per-chunk request ceiling. Clients split captures into chunks well
/// below this; the limit only guards against unbounded bodies.
const MAX_CHUNK_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<UploadTracker>,
    pub pipeline: Arc<ExtractionPipeline>,
    /// Model used when the caller does not name one.
    pub default_model: String,
    /// Outbound client for the replay proxy.
    pub http_client: reqwest::Client,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin, the capture UI runs on a
    // separate origin in development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/upload-chunked", post(upload_chunk_handler))
        .route("/api/finalize-upload", post(finalize_handler))
        .route("/api/extract-api", get(extract_handler))
        // Trailing-slash variant kept for existing clients.
        .route("/api/extract-api/", get(extract_handler))
        .route("/proxy", post(proxy_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_CHUNK_BODY_BYTES))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
