//! API-call filtering over HAR entries.
//!
//! Pure and order-preserving: surviving entries keep their capture
//! order, nothing is deduplicated, and applying the filter twice is
//! a no-op.

use crate::types::har::HarEntry;

/// MIME fragments that mark static assets and documents.
const EXCLUDED_MIME_FRAGMENTS: [&str; 4] = ["html", "image", "font", "css"];

/// MIME fragments that mark API-shaped payloads.
const API_MIME_FRAGMENTS: [&str; 3] = ["json", "xml", "javascript"];

/// Keep only entries that look like API calls.
pub fn filter_api_entries(entries: Vec<HarEntry>) -> Vec<HarEntry> {
    entries.into_iter().filter(is_api_entry).collect()
}

/// Classify a single entry.
///
/// An entry survives when it has `response.content`, its MIME type
/// contains none of the excluded fragments, and either the MIME type
/// contains an API fragment or the request URL contains "api"
/// (case-insensitive substring).
pub fn is_api_entry(entry: &HarEntry) -> bool {
    let Some(response) = &entry.response else {
        return false;
    };
    let Some(content) = &response.content else {
        return false;
    };

    let mime_type = content
        .mime_type
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if EXCLUDED_MIME_FRAGMENTS
        .iter()
        .any(|fragment| mime_type.contains(fragment))
    {
        return false;
    }

    API_MIME_FRAGMENTS
        .iter()
        .any(|fragment| mime_type.contains(fragment))
        || entry.request.url.to_ascii_lowercase().contains("api")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_json_api_entry() {
        let entries = vec![
            HarEntry::new("GET", "https://example.com/").with_mime_type("text/html"),
            HarEntry::new("GET", "https://example.com/api/items")
                .with_mime_type("application/json"),
            HarEntry::new("GET", "https://example.com/logo.png").with_mime_type("image/png"),
        ];

        let kept = filter_api_entries(entries);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].request.url, "https://example.com/api/items");
    }

    #[test]
    fn drops_entries_without_response_content() {
        let entries = vec![HarEntry::new("GET", "https://example.com/api/x").without_content()];
        assert!(filter_api_entries(entries).is_empty());
    }

    #[test]
    fn exclusion_wins_over_api_url() {
        // A stylesheet served from an /api/ path is still a stylesheet.
        let entry = HarEntry::new("GET", "https://example.com/api/theme").with_mime_type("text/css");
        assert!(!is_api_entry(&entry));
    }

    #[test]
    fn api_url_rescues_unknown_mime_type() {
        let entry = HarEntry::new("GET", "https://example.com/API/v2/users")
            .with_mime_type("application/octet-stream");
        assert!(is_api_entry(&entry));

        let entry =
            HarEntry::new("GET", "https://example.com/data").with_mime_type("application/octet-stream");
        assert!(!is_api_entry(&entry));
    }

    #[test]
    fn missing_mime_type_keeps_api_urls_only() {
        let kept = filter_api_entries(vec![
            HarEntry::new("GET", "https://example.com/api/items"),
            HarEntry::new("GET", "https://example.com/static/app"),
        ]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn is_idempotent_and_order_preserving() {
        let entries = vec![
            HarEntry::new("GET", "https://a.com/api/1").with_mime_type("application/json"),
            HarEntry::new("GET", "https://a.com/page").with_mime_type("text/html"),
            HarEntry::new("POST", "https://a.com/api/2").with_mime_type("text/javascript"),
            HarEntry::new("GET", "https://a.com/api/3").with_mime_type("application/xml"),
        ];

        let once = filter_api_entries(entries);
        let urls: Vec<_> = once.iter().map(|e| e.request.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                "https://a.com/api/1",
                "https://a.com/api/2",
                "https://a.com/api/3"
            ]
        );

        let twice = filter_api_entries(once.clone());
        let urls_twice: Vec<_> = twice.iter().map(|e| e.request.url.clone()).collect();
        assert_eq!(urls, urls_twice);
    }
}
