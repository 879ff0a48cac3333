//! Transport abstraction between the executor and the credential proxy.
//!
//! Provides a trait-based interface so the orchestration layer can be
//! exercised without a running proxy.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{FailingTransport, MockTransport};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An execution request in the proxy's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// The fully substituted query string.
    pub query: String,
    /// GraphQL variables forwarded verbatim.
    pub variables: Value,
    /// Upstream endpoint the proxy forwards to.
    pub subgraph_url: String,
    /// Name of the environment variable holding the credential,
    /// resolved on the proxy side.
    pub api_key_env_var: String,
}

/// The proxy's response to an execution request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    /// The `data` portion of the upstream GraphQL response.
    #[serde(default)]
    pub data: Value,
    /// First upstream GraphQL error message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Upstream round-trip time measured by the proxy, in milliseconds.
    #[serde(default)]
    pub execution_time: u64,
}

/// Trait defining the interface for submitting queries to the proxy.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Submits a substituted query and returns the proxy's response.
    async fn execute(&self, request: &ProxyRequest) -> Result<ProxyResponse>;
}
