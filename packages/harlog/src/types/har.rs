//! Typed subset of the HAR (HTTP Archive) format.
//!
//! Only the fields the extraction pipeline reads are modeled.
//! Optional fields (`postData`, `content`, headers) deserialize
//! permissively: a missing field is absent, never an error. Unknown
//! fields are ignored, so full browser exports parse unchanged.

use serde::{Deserialize, Serialize};

/// Top-level HAR document. `log` and `entries` stay optional so the
/// pipeline can distinguish "not a HAR file" from "empty capture".
#[derive(Debug, Clone, Deserialize)]
pub struct HarDocument {
    pub log: Option<HarLog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarLog {
    pub entries: Option<Vec<HarEntry>>,
}

/// One captured request/response pair. Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarEntry {
    pub request: HarRequest,
    #[serde(default)]
    pub response: Option<HarResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(rename = "postData", default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
}

/// Ordered name/value pair; order is preserved from the capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<PostParam>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostParam {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
}

/// Case-insensitive first-match header lookup.
pub fn header_value<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

impl HarRequest {
    /// First `content-type` request header, if any.
    pub fn content_type(&self) -> Option<&str> {
        header_value(&self.headers, "content-type")
    }
}

impl HarResponse {
    /// First `content-type` response header, if any.
    pub fn content_type(&self) -> Option<&str> {
        header_value(&self.headers, "content-type")
    }
}

impl HarEntry {
    /// Minimal entry with an empty-but-present response content,
    /// the shape a filter-surviving entry needs. Builder setters
    /// below flesh it out; used by tests and fixtures.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            request: HarRequest {
                method: method.into(),
                url: url.into(),
                headers: Vec::new(),
                post_data: None,
            },
            response: Some(HarResponse {
                status: 200,
                headers: Vec::new(),
                content: Some(ResponseContent::default()),
            }),
        }
    }

    /// Set the response `content.mimeType`.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let response = self.response.get_or_insert_with(HarResponse::default);
        response.content.get_or_insert_with(ResponseContent::default).mime_type =
            Some(mime_type.into());
        self
    }

    /// Set the response status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.response.get_or_insert_with(HarResponse::default).status = status;
        self
    }

    /// Set the response `content.size`.
    pub fn with_response_size(mut self, size: i64) -> Self {
        let response = self.response.get_or_insert_with(HarResponse::default);
        response.content.get_or_insert_with(ResponseContent::default).size = Some(size);
        self
    }

    /// Append a request header (order is significant).
    pub fn with_request_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.request.headers.push(Header {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a response header (order is significant).
    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response
            .get_or_insert_with(HarResponse::default)
            .headers
            .push(Header {
                name: name.into(),
                value: value.into(),
            });
        self
    }

    /// Set a raw request body.
    pub fn with_body_text(mut self, text: impl Into<String>) -> Self {
        self.request.post_data.get_or_insert_with(PostData::default).text = Some(text.into());
        self
    }

    /// Set multipart form params as the request body.
    pub fn with_form_params(
        mut self,
        params: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let params = params
            .into_iter()
            .map(|(name, value)| PostParam {
                name: name.into(),
                value: value.into(),
            })
            .collect();
        self.request.post_data.get_or_insert_with(PostData::default).params = Some(params);
        self
    }

    /// Drop `response.content` entirely (an entry the filter must skip).
    pub fn without_content(mut self) -> Self {
        if let Some(response) = &mut self.response {
            response.content = None;
        }
        self
    }
}
