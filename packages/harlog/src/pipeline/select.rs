//! Candidate selection with a fail-open fallback.
//!
//! The selector minimizes the filtered entries, asks the classifier
//! to rank them against the description, and parses the reply
//! tolerantly. Every failure mode (transport error, timeout, missing
//! or malformed JSON, out-of-range index) resolves to the first
//! filtered entry: extraction must always produce *some* command
//! rather than fail when the classifier is unavailable.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::classify::Classifier;
use crate::pipeline::prompts::format_selection_prompt;
use crate::types::extract::{CandidateSelection, CandidateSummary};
use crate::types::har::HarEntry;

/// Minimize entries to `{index, method, url, contentType}`.
pub fn candidate_summaries(entries: &[HarEntry]) -> Vec<CandidateSummary> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| CandidateSummary {
            index,
            method: entry.request.method.clone(),
            url: entry.request.url.clone(),
            content_type: entry
                .request
                .content_type()
                .unwrap_or("None")
                .to_string(),
        })
        .collect()
}

/// First brace-delimited span in a free-text reply. Greedy, so it
/// spans from the first `{` to the last `}`, which tolerates prose
/// before and after the object.
fn json_object_span(reply: &str) -> Option<&str> {
    static OBJECT_RE: OnceLock<Regex> = OnceLock::new();
    let re = OBJECT_RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("static pattern is valid"));
    re.find(reply).map(|found| found.as_str())
}

/// Parse a classifier reply into a selection.
///
/// Returns `None` when no usable object is found, `selected_index`
/// is absent or non-integral, or the index falls outside
/// `[0, candidate_count)`.
pub fn parse_selection_reply(reply: &str, candidate_count: usize) -> Option<CandidateSelection> {
    let span = json_object_span(reply)?;
    let value: serde_json::Value = serde_json::from_str(span).ok()?;

    let selected_index = value.get("selected_index")?.as_u64()? as usize;
    if selected_index >= candidate_count {
        return None;
    }

    let reasoning = value
        .get("reasoning")
        .and_then(|r| r.as_str())
        .map(str::to_string);

    Some(CandidateSelection {
        selected_index,
        reasoning,
    })
}

/// Rank `entries` against `description` via the classifier.
///
/// Callers guarantee `entries` is non-empty; the pipeline rejects
/// empty candidate lists before the classifier is ever invoked.
pub async fn select_candidate(
    classifier: &dyn Classifier,
    entries: &[HarEntry],
    description: &str,
    model: &str,
    deadline: Duration,
) -> CandidateSelection {
    debug_assert!(!entries.is_empty());

    let prompt = format_selection_prompt(description, &candidate_summaries(entries));

    let reply = match tokio::time::timeout(deadline, classifier.rank(&prompt, model)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(error)) => {
            tracing::warn!(%error, "classifier call failed, falling back to first candidate");
            return CandidateSelection::fallback();
        }
        Err(_) => {
            tracing::warn!(
                deadline_ms = deadline.as_millis() as u64,
                "classifier call timed out, falling back to first candidate"
            );
            return CandidateSelection::fallback();
        }
    };

    match parse_selection_reply(&reply, entries.len()) {
        Some(selection) => selection,
        None => {
            tracing::warn!("classifier reply unusable, falling back to first candidate");
            CandidateSelection::fallback()
        }
    }
}
