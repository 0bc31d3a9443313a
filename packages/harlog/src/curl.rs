//! Shell-replayable curl rendering for a single HAR entry.

use crate::types::har::HarEntry;

/// Clause separator: backslash continuation plus a two-space indent,
/// so the command pastes into a shell as one multi-line invocation.
const CLAUSE_SEPARATOR: &str = " \\\n  ";

/// Escape a value for embedding inside a single-quoted shell string:
/// close the quote, emit an escaped literal quote, reopen.
fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Render one entry as a curl command.
///
/// Emits `curl -X METHOD 'url'`, one `-H` clause per request header
/// in capture order, and at most one body clause: `-d` for a raw
/// body, otherwise one `-F` per form param.
pub fn curl_command(entry: &HarEntry) -> String {
    let request = &entry.request;
    let mut parts = vec![format!("curl -X {} '{}'", request.method, request.url)];

    for header in &request.headers {
        parts.push(format!(
            "-H '{}: {}'",
            header.name,
            escape_single_quotes(&header.value)
        ));
    }

    if let Some(post_data) = &request.post_data {
        if let Some(text) = &post_data.text {
            parts.push(format!("-d '{}'", escape_single_quotes(text)));
        } else if let Some(params) = &post_data.params {
            for param in params {
                parts.push(format!(
                    "-F '{}={}'",
                    param.name,
                    escape_single_quotes(&param.value)
                ));
            }
        }
    }

    parts.join(CLAUSE_SEPARATOR)
}
