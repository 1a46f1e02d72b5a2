//! Reqwest-based Connectors gateway client.
//!
//! Implements both collaborator traits: [`ToolCatalog`] over
//! `GET /integrations/{name}/tools` and `POST /tools/select`, and
//! [`ToolInvoker`] over `POST /tools/{id}/invoke`.
//!
//! The client applies a per-request timeout and forwards configured
//! credentials; it never retries (retry policy, if any, belongs to the caller
//! or the gateway).

use crate::adapter::{InvokeError, ToolInvoker};
use crate::contracts::{ToolDefinition, ToolSelectionOptions};
use crate::error::{Result, ToolkitError};
use crate::toolkit::ToolCatalog;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a Connectors gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorsConfig {
    /// Base URL of the gateway, e.g. `https://connectors.example.com`.
    pub base_url: String,

    /// Bearer API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Tenant id for multi-tenant deployments (sent as `x-tenant-id`).
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Per-request timeout in seconds (default 30; 0 disables).
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// HTTP client for the Connectors gateway.
#[derive(Debug, Clone)]
pub struct HttpConnectors {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    tenant_id: Option<String>,
    timeout: Option<Duration>,
}

impl HttpConnectors {
    /// Create a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn new(config: ConnectorsConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ToolkitError::Config(format!("Invalid baseUrl '{}': {e}", config.base_url)))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ToolkitError::Config(format!(
                "Invalid baseUrl '{}': must be an absolute http(s) URL",
                config.base_url
            )));
        }

        let timeout = match config.timeout {
            Some(0) => None, // explicit disable
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            tenant_id: config.tenant_id,
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn prepare(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(tenant) = &self.tenant_id {
            request = request.header("x-tenant-id", tenant);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn fetch_tools(&self, request: reqwest::RequestBuilder) -> Result<Vec<ToolDefinition>> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(|e| ToolkitError::Http(describe_request_error(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolkitError::Catalog(format!(
                "gateway returned {status}: {}",
                error_message_from_body(&body)
            )));
        }

        let defs = response
            .json::<Vec<ToolDefinition>>()
            .await
            .map_err(|e| ToolkitError::Catalog(format!("invalid tool list payload: {e}")))?;
        Ok(defs)
    }
}

#[async_trait]
impl ToolCatalog for HttpConnectors {
    async fn list_tools(&self, integration: &str) -> Result<Vec<ToolDefinition>> {
        tracing::debug!(integration, "listing tools");
        let url = self.endpoint(&format!("integrations/{integration}/tools"));
        self.fetch_tools(self.client.get(url)).await
    }

    async fn select_tools(
        &self,
        query: &str,
        options: &ToolSelectionOptions,
    ) -> Result<Vec<ToolDefinition>> {
        tracing::debug!(query, max_tools = options.max_tools, "selecting tools");
        let url = self.endpoint("tools/select");
        let mut body = json!({
            "query": query,
            "maxTools": options.max_tools,
            "minScore": options.min_score,
        });
        if !options.categories.is_empty() {
            body["categories"] = json!(options.categories);
        }
        self.fetch_tools(self.client.post(url).json(&body)).await
    }
}

#[async_trait]
impl ToolInvoker for HttpConnectors {
    async fn invoke(
        &self,
        tool_id: &str,
        arguments: Value,
    ) -> std::result::Result<Value, InvokeError> {
        let url = self.endpoint(&format!("tools/{tool_id}/invoke"));
        let request = self.client.post(url).json(&json!({"arguments": arguments}));

        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(|e| InvokeError::new(classify_request_error(&e), describe_request_error(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InvokeError::new("ApiError", describe_request_error(e)))?;

        if !status.is_success() {
            return Err(InvokeError::new(
                "ApiError",
                format!("gateway returned {status}: {}", error_message_from_body(&body)),
            ));
        }

        // Non-JSON payloads surface as plain strings.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

fn classify_request_error(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "TimeoutError"
    } else if e.is_connect() {
        "ConnectError"
    } else {
        "RequestError"
    }
}

/// Render a reqwest error without its URL (which may embed credentials in
/// query parameters).
fn describe_request_error(e: reqwest::Error) -> String {
    let e = e.without_url();
    let mut message = e.to_string();
    // Append source messages for context (reqwest's top-level Display is terse).
    let mut source = std::error::Error::source(&e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// Pull a human-readable message out of a gateway error body.
fn error_message_from_body(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = parsed.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    if body.is_empty() {
        "no response body".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = HttpConnectors::new(ConnectorsConfig {
            base_url: "ftp://example.com".to_string(),
            api_key: None,
            tenant_id: None,
            timeout: None,
        })
        .unwrap_err();
        assert!(matches!(err, ToolkitError::Config(_)));

        assert!(
            HttpConnectors::new(ConnectorsConfig {
                base_url: "not a url".to_string(),
                api_key: None,
                tenant_id: None,
                timeout: None,
            })
            .is_err()
        );
    }

    #[test]
    fn test_endpoint_joins_without_duplicate_slash() {
        let client = HttpConnectors::new(ConnectorsConfig {
            base_url: "https://example.com/api/".to_string(),
            api_key: None,
            tenant_id: None,
            timeout: None,
        })
        .unwrap();
        assert_eq!(
            client.endpoint("tools/x/invoke"),
            "https://example.com/api/tools/x/invoke"
        );
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(error_message_from_body(r#"{"message":"boom"}"#), "boom");
        assert_eq!(error_message_from_body(r#"{"error":"nope"}"#), "nope");
        assert_eq!(error_message_from_body("plain text"), "plain text");
        assert_eq!(error_message_from_body(""), "no response body");
    }
}
