//! Prompt template for candidate selection.

use crate::types::extract::CandidateSummary;

/// System message for structured-output providers.
pub const SELECTION_SYSTEM_PROMPT: &str =
    "You are an expert at analyzing API requests captured in a HAR file.";

/// User prompt. `{description}` and `{candidates}` are substituted;
/// the braces in the example object are literal output the model is
/// asked to reproduce.
pub const SELECTION_PROMPT: &str = r#"You are an expert at analyzing API requests. I need you to find the most relevant API request from a HAR file based on this description:

"{description}"

Here are all the API requests found in the HAR file (simplified to save tokens):
{candidates}

Please identify the SINGLE most relevant request that best matches the description.
Return ONLY a JSON object with the following structure:
{
  "selected_index": [index of the selected request in the provided array],
  "reasoning": "Brief explanation of why this request matches the description"
}"#;

/// Render the selection prompt for a candidate list.
pub fn format_selection_prompt(description: &str, candidates: &[CandidateSummary]) -> String {
    let listing = serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());
    SELECTION_PROMPT
        .replace("{description}", description)
        .replace("{candidates}", &listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_description_and_candidates() {
        let candidates = vec![CandidateSummary {
            index: 0,
            method: "GET".to_string(),
            url: "https://example.com/api/items".to_string(),
            content_type: "None".to_string(),
        }];

        let prompt = format_selection_prompt("the item list call", &candidates);
        assert!(prompt.contains(r#""the item list call""#));
        assert!(prompt.contains("https://example.com/api/items"));
        assert!(prompt.contains(r#""contentType": "None""#));
        assert!(prompt.contains("selected_index"));
    }
}
