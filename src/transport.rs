//! HTTP transport used by the node.
//!
//! The host runtime normally owns the HTTP stack; the node only needs a way to
//! send one JSON request and get a JSON response back. [`HttpTransport`] is
//! that seam, and [`ReqwestTransport`] is the stock implementation.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, WabaError};

/// Perform one JSON HTTP request.
///
/// Implementations return the decoded response body on a 2xx status and an
/// error for transport failures and non-2xx statuses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(&self, method: Method, url: &str, body: &Value) -> Result<Value>;
}

/// [`HttpTransport`] backed by a `reqwest` client.
///
/// No timeout is set here; the client's defaults apply.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxy, timeouts, TLS roots).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, method: Method, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .request(method, url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "WABA response received");

        if !status.is_success() {
            return Err(WabaError::Api {
                status: status.as_u16(),
                message: error_detail(&text, status.canonical_reason()),
            });
        }

        Ok(decode_body(text))
    }
}

/// Parse a response body as JSON, keeping non-JSON bodies as a JSON string.
pub fn decode_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Pull a human-readable message out of an error response body.
fn error_detail(text: &str, reason: Option<&str>) -> String {
    if let Ok(body) = serde_json::from_str::<Value>(text) {
        let detail = ["message", "error", "msg"].iter().find_map(|key| {
            match body.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Object(obj)) => obj
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            }
        });
        if let Some(detail) = detail {
            return detail;
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("Unknown API error").to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
