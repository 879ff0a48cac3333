//! Mock transports for testing the orchestration layer.

use super::{ProxyRequest, ProxyResponse, QueryTransport};
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// A transport that returns a predefined payload and records every
/// request it receives.
pub struct MockTransport {
    data: Value,
    error: Option<String>,
    execution_time: u64,
    requests: Mutex<Vec<ProxyRequest>>,
}

impl MockTransport {
    /// Creates a mock that answers every request with the given payload.
    pub fn with_data(data: Value) -> Self {
        Self {
            data,
            error: None,
            execution_time: 1,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock whose responses carry an upstream GraphQL error.
    pub fn with_graphql_error(message: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            error: Some(message.into()),
            execution_time: 1,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<ProxyRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl QueryTransport for MockTransport {
    async fn execute(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request.clone());

        Ok(ProxyResponse {
            data: self.data.clone(),
            error: self.error.clone(),
            execution_time: self.execution_time,
        })
    }
}

/// A transport that fails every request, for exercising error paths.
pub struct FailingTransport {
    message: String,
}

impl FailingTransport {
    /// Creates a transport failing with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl QueryTransport for FailingTransport {
    async fn execute(&self, _request: &ProxyRequest) -> Result<ProxyResponse> {
        Err(ProbeError::transport(self.message.clone()))
    }
}
