//! Chunk intake and finalize endpoints.

use axum::{
    body::Bytes,
    extract::{Extension, Multipart},
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::StreamReader;

use crate::error::ApiError;
use crate::server::app::AppState;
use crate::uploads::FinalizedUpload;

#[derive(Serialize)]
pub struct ChunkAck {
    pub success: bool,
    #[serde(rename = "chunkIndex")]
    pub chunk_index: u32,
}

/// Metadata fields of the chunk form, gathered as they arrive.
#[derive(Default)]
struct ChunkMeta {
    index: Option<u32>,
    total_chunks: Option<u32>,
    file_id: Option<String>,
    filename: Option<String>,
}

impl ChunkMeta {
    fn ready(&self) -> bool {
        self.index.is_some()
            && self.total_chunks.is_some()
            && self.file_id.is_some()
            && self.filename.is_some()
    }
}

fn parse_u32(name: &str, value: &str) -> Result<u32, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("field '{name}' must be a non-negative integer")))
}

/// Accept one chunk of a multipart upload.
///
/// Expected fields: `chunk` (the bytes), `index`, `totalChunks`,
/// `fileId`, `filename`. Field order is not fixed by clients: when
/// the metadata fields precede `chunk`, the payload is streamed to
/// disk without buffering; otherwise the chunk is held in memory
/// until the metadata arrives.
pub async fn upload_chunk_handler(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChunkAck>, ApiError> {
    let mut meta = ChunkMeta::default();
    let mut buffered_chunk: Option<Bytes> = None;
    let mut stored_index: Option<u32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "index" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                meta.index = Some(parse_u32("index", &text)?);
            }
            "totalChunks" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                meta.total_chunks = Some(parse_u32("totalChunks", &text)?);
            }
            "fileId" => {
                meta.file_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            "filename" => {
                meta.filename = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            "chunk" => {
                if meta.ready() {
                    let reader = StreamReader::new(
                        field.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
                    );
                    stored_index = Some(
                        state
                            .tracker
                            .receive_chunk(
                                meta.file_id.as_deref().unwrap_or_default(),
                                meta.index.unwrap_or_default(),
                                meta.total_chunks.unwrap_or_default(),
                                meta.filename.as_deref().unwrap_or_default(),
                                reader,
                            )
                            .await?,
                    );
                } else {
                    buffered_chunk = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                    );
                }
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    let chunk_index = match (stored_index, buffered_chunk) {
        (Some(index), _) => index,
        (None, Some(bytes)) => {
            if !meta.ready() {
                return Err(ApiError::BadRequest(
                    "missing one of: index, totalChunks, fileId, filename".to_string(),
                ));
            }
            state
                .tracker
                .receive_chunk(
                    meta.file_id.as_deref().unwrap_or_default(),
                    meta.index.unwrap_or_default(),
                    meta.total_chunks.unwrap_or_default(),
                    meta.filename.as_deref().unwrap_or_default(),
                    bytes.as_ref(),
                )
                .await?
        }
        (None, None) => {
            return Err(ApiError::BadRequest("missing 'chunk' field".to_string()));
        }
    };

    Ok(Json(ChunkAck {
        success: true,
        chunk_index,
    }))
}

#[derive(Deserialize)]
pub struct FinalizeRequest {
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct FinalizeResponse {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub chunks: u32,
    pub status: String,
}

/// Reassemble a complete upload into one capture file.
pub async fn finalize_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let description = request.description.clone();
    let FinalizedUpload {
        file_id,
        filename,
        size,
        chunks,
        ..
    } = state
        .tracker
        .finalize(&request.file_id, request.description)
        .await?;

    Ok(Json(FinalizeResponse {
        file_id,
        filename,
        size,
        description,
        chunks,
        status: "complete".to_string(),
    }))
}
