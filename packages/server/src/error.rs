//! API error taxonomy and HTTP mapping.
//!
//! Only NotFound/Incomplete/InvalidFormat surface to callers as
//! client errors. Classifier failures never reach this type: the
//! pipeline absorbs them via its fallback. Anything unexpected is a
//! 500 carrying the underlying message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use harlog::HarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown upload id at finalize or extraction time.
    #[error("Upload not found")]
    UploadNotFound,

    /// Finalize or extraction requested before all chunks arrived.
    #[error("Upload incomplete. Received {received} of {expected} chunks")]
    UploadIncomplete { received: u32, expected: u32 },

    /// Chunk index outside the declared range.
    #[error("Chunk index {index} out of range for {total} declared chunks")]
    ChunkOutOfRange { index: u32, total: u32 },

    /// Malformed multipart or JSON request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Assembled capture is not valid JSON or lacks `log.entries`.
    #[error("Invalid HAR file format: {reason}")]
    InvalidHar { reason: String },

    /// Zero API-like entries after filtering.
    #[error("No API requests found in the HAR file")]
    NoApiRequests,

    #[error("An error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::UploadNotFound | Self::NoApiRequests => StatusCode::NOT_FOUND,
            Self::UploadIncomplete { .. }
            | Self::ChunkOutOfRange { .. }
            | Self::BadRequest(_)
            | Self::InvalidHar { .. } => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HarError> for ApiError {
    fn from(error: HarError) -> Self {
        match error {
            HarError::InvalidFormat { reason } => Self::InvalidHar { reason },
            HarError::NoCandidates => Self::NoApiRequests,
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(error: std::io::Error) -> Self {
        Self::Internal(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}
