//! HAR extraction pipeline.
//!
//! Orchestrates the full flow over an assembled capture:
//! parse → validate `log.entries` → filter → select → render.

pub mod prompts;
pub mod select;

pub use prompts::{format_selection_prompt, SELECTION_PROMPT, SELECTION_SYSTEM_PROMPT};
pub use select::{candidate_summaries, parse_selection_reply, select_candidate};

use std::sync::Arc;
use std::time::Duration;

use crate::classify::Classifier;
use crate::curl::curl_command;
use crate::error::{HarError, Result};
use crate::filter::filter_api_entries;
use crate::types::extract::{ExtractionResult, RequestDetails};
use crate::types::har::{HarDocument, HarEntry};

/// Parse raw capture bytes and pull out `log.entries`.
///
/// A document that is not JSON, or that lacks `log.entries`, is
/// rejected as `InvalidFormat`.
pub fn parse_entries(raw: &[u8]) -> Result<Vec<HarEntry>> {
    let document: HarDocument = serde_json::from_slice(raw).map_err(|e| HarError::InvalidFormat {
        reason: e.to_string(),
    })?;

    document
        .log
        .and_then(|log| log.entries)
        .ok_or_else(|| HarError::InvalidFormat {
            reason: "missing log.entries".to_string(),
        })
}

/// The extraction pipeline, owning the classifier seam and its
/// per-request deadline.
pub struct ExtractionPipeline {
    classifier: Arc<dyn Classifier>,
    classifier_deadline: Duration,
}

impl ExtractionPipeline {
    pub const DEFAULT_CLASSIFIER_DEADLINE: Duration = Duration::from_secs(30);

    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            classifier_deadline: Self::DEFAULT_CLASSIFIER_DEADLINE,
        }
    }

    /// Bound the classifier round trip. Hitting the deadline counts
    /// as a selector failure and triggers the fallback, never an
    /// error for the caller.
    pub fn with_classifier_deadline(mut self, deadline: Duration) -> Self {
        self.classifier_deadline = deadline;
        self
    }

    /// Run the pipeline over an assembled capture.
    pub async fn run(
        &self,
        raw: &[u8],
        description: &str,
        model: &str,
    ) -> Result<ExtractionResult> {
        let entries = parse_entries(raw)?;
        let total = entries.len();

        let candidates = filter_api_entries(entries);
        if candidates.is_empty() {
            return Err(HarError::NoCandidates);
        }
        tracing::debug!(
            total_entries = total,
            api_entries = candidates.len(),
            "filtered capture"
        );

        let selection = select_candidate(
            self.classifier.as_ref(),
            &candidates,
            description,
            model,
            self.classifier_deadline,
        )
        .await;
        tracing::debug!(
            selected_index = selection.selected_index,
            reasoning = selection.reasoning.as_deref().unwrap_or(""),
            "candidate selected"
        );

        Ok(build_result(&candidates[selection.selected_index]))
    }
}

/// Assemble the caller-facing result for the selected entry.
fn build_result(entry: &HarEntry) -> ExtractionResult {
    let response = entry.response.as_ref();

    let content_type = response
        .and_then(|r| r.content_type())
        .unwrap_or("Not specified")
        .to_string();

    ExtractionResult {
        curl_command: curl_command(entry),
        request_details: RequestDetails {
            method: entry.request.method.clone(),
            url: entry.request.url.clone(),
            content_type,
            response_status: response.map(|r| r.status).unwrap_or_default(),
            response_size: response
                .and_then(|r| r.content.as_ref())
                .and_then(|c| c.size)
                .unwrap_or(0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_json_and_missing_entries() {
        assert!(matches!(
            parse_entries(b"not json"),
            Err(HarError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_entries(br#"{"log": {}}"#),
            Err(HarError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_entries(br#"{"notlog": true}"#),
            Err(HarError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn accepts_empty_entry_list() {
        let entries = parse_entries(br#"{"log": {"entries": []}}"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn result_defaults_missing_response_fields() {
        let entry = HarEntry::new("GET", "https://a.com/api").with_mime_type("application/json");
        let result = build_result(&entry);
        assert_eq!(result.request_details.content_type, "Not specified");
        assert_eq!(result.request_details.response_size, 0);
        assert_eq!(result.request_details.response_status, 200);
    }
}
