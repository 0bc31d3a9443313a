//! Replay proxy.
//!
//! Lets the capture UI replay an extracted request without tripping
//! browser CORS rules. The outcome of the upstream call is always
//! reported in the body; only a malformed or unsendable request turns
//! into a 500 envelope with `success: false`.

use std::collections::HashMap;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::server::app::AppState;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Serialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_response: Option<UpstreamResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub request_info: ProxyRequest,
}

#[derive(Serialize)]
pub struct UpstreamResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// Parsed JSON when the upstream body is JSON, raw text otherwise.
    pub body: Value,
}

pub async fn proxy_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ProxyRequest>,
) -> (StatusCode, Json<ProxyResponse>) {
    match forward(&state, &request).await {
        Ok(upstream) => (
            StatusCode::OK,
            Json(ProxyResponse {
                success: true,
                server_response: Some(upstream),
                error: None,
                request_info: request,
            }),
        ),
        Err(error) => {
            tracing::warn!(url = %request.url, error = %error, "proxy request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyResponse {
                    success: false,
                    server_response: None,
                    error: Some(error),
                    request_info: request,
                }),
            )
        }
    }
}

async fn forward(state: &AppState, request: &ProxyRequest) -> Result<UpstreamResponse, String> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .map_err(|_| format!("invalid method: {}", request.method))?;

    let mut builder = state.http_client.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await.map_err(|e| e.to_string())?;

    let status_code = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    let text = response.text().await.map_err(|e| e.to_string())?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Ok(UpstreamResponse {
        status_code,
        headers,
        body,
    })
}
