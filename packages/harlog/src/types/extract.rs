//! Types flowing through candidate selection and the pipeline output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minimized view of one candidate entry, sent to the classifier to
/// keep prompts small.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub index: usize,
    pub method: String,
    pub url: String,
    /// First request `content-type` header, or the literal "None".
    #[serde(rename = "contentType")]
    pub content_type: String,
}

/// The reply shape the classifier is instructed to produce. Also
/// drives the JSON schema for structured-output providers.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SelectionReply {
    /// Index into the candidate array.
    pub selected_index: u32,
    /// Brief explanation of why this request matches the description.
    pub reasoning: String,
}

/// Outcome of one selection round. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSelection {
    /// Index into the *filtered* entry list.
    pub selected_index: usize,
    pub reasoning: Option<String>,
}

impl CandidateSelection {
    /// The availability-over-precision fallback: the first filtered
    /// entry wins whenever the classifier is unusable.
    pub fn fallback() -> Self {
        Self {
            selected_index: 0,
            reasoning: None,
        }
    }
}

/// Summary fields of the selected request, surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub method: String,
    pub url: String,
    /// Response `content-type`, or "Not specified".
    pub content_type: String,
    pub response_status: u16,
    pub response_size: i64,
}

/// Final pipeline output: one replayable command plus its details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub curl_command: String,
    pub request_details: RequestDetails,
}
