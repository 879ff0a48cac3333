//! HTTP transport that posts executions to a running credential proxy.

use super::{ProxyRequest, ProxyResponse, QueryTransport};
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for proxy requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport that submits executions to the proxy's `/api/graphql`
/// endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: Client,
}

impl HttpTransport {
    /// Creates a new transport for the given proxy endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProbeError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Returns the endpoint URL this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn execute(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
        debug!("Submitting query to proxy at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ProbeError::transport(format!("Failed to reach proxy: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::transport(format!("Failed to read proxy response: {e}")))?;

        if !status.is_success() {
            // The proxy reports failures as {"error": "..."}.
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| format!("Proxy returned status {status}"));
            return Err(ProbeError::proxy(message));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProbeError::transport(format!("Malformed proxy response: {e}")))
    }
}
