//! Extraction endpoint: assembled capture → replayable curl command.

use axum::{
    extract::{Extension, Query},
    Json,
};
use harlog::ExtractionResult;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct ExtractQuery {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub description: String,
    #[serde(rename = "selectedModel")]
    pub selected_model: Option<String>,
}

/// Run the extraction pipeline over a finalized upload.
///
/// Classifier trouble never fails this request: the pipeline falls
/// back to the first candidate. Errors here are about the upload
/// itself (unknown, incomplete, not a HAR, nothing API-like in it).
pub async fn extract_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ExtractQuery>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let path = state.tracker.assembled_file(&query.file_id).await?;
    let raw = tokio::fs::read(&path).await?;

    let model = query
        .selected_model
        .as_deref()
        .unwrap_or(&state.default_model);

    tracing::info!(
        file_id = %query.file_id,
        model,
        capture_bytes = raw.len(),
        "extraction requested"
    );

    let result = state.pipeline.run(&raw, &query.description, model).await?;
    Ok(Json(result))
}
