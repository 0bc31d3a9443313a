//! Typed errors for HAR analysis.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while analyzing a capture.
#[derive(Debug, Error)]
pub enum HarError {
    /// Capture is not valid JSON or lacks `log.entries`.
    #[error("invalid HAR format: {reason}")]
    InvalidFormat { reason: String },

    /// No API-like entries survived filtering.
    #[error("no API requests found in the HAR file")]
    NoCandidates,

    /// Classifier transport or provider failure.
    ///
    /// Inside the pipeline this is absorbed by the selector's
    /// fallback; it only reaches callers that drive a `Classifier`
    /// directly.
    #[error("classifier error: {0}")]
    Classifier(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for HAR analysis operations.
pub type Result<T> = std::result::Result<T, HarError>;
