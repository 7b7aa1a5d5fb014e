//! Shared HTTP plumbing for the provider adapters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Build a client with the configured per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {}", e))
}

/// Send a JSON request and return the decoded JSON body.
///
/// Failures are rendered as messages the retry classifier understands:
/// non-success statuses start with `HTTP <code>`, client timeouts contain
/// `timeout`.
pub async fn send_json(backend: &str, request: reqwest::RequestBuilder) -> Result<Value, String> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            format!("request timeout: {}", e)
        } else {
            format!("request failed: {}", e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("HTTP {}: {}", status, truncate(&body, 500)));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("invalid JSON body: {}", e))?;
    debug!(backend, "Received response");
    Ok(body)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, String> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

/// Concatenate non-empty strings with newlines; `None` when nothing is left.
pub fn join_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let text = parts
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!text.trim().is_empty()).then_some(text)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
