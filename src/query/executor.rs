//! Query execution against a subgraph via the credential proxy.
//!
//! Provides isolated execution that can be tested independently of a
//! running proxy through the transport trait.

use crate::error::{ProbeError, Result};
use crate::persistence::{self, SavedQuery, StateDb, Subgraph};
use crate::template::{substitute, validate_query};
use crate::transport::{ProxyRequest, QueryTransport};
use crate::validation::{run_snippet, ValidationOutcome};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Query executor that handles substitution, transport, validation, and
/// history recording.
pub struct QueryExecutor<'a> {
    transport: &'a dyn QueryTransport,
    state_db: Option<&'a StateDb>,
}

/// Result of one query execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// The `data` portion of the response; an empty object when the
    /// transport failed.
    pub data: Value,
    /// Transport or upstream GraphQL error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Upstream round-trip time; zero when the transport failed.
    pub execution_time_ms: u64,
    /// Validation verdict, when the query declares a snippet and no
    /// transport error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationOutcome>,
}

impl ExecutionOutcome {
    /// True when the execution produced data without any error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(transport: &'a dyn QueryTransport, state_db: Option<&'a StateDb>) -> Self {
        Self {
            transport,
            state_db,
        }
    }

    /// Executes a saved query with the given parameter bindings.
    ///
    /// The template is syntax-checked before anything is sent; a failing
    /// check aborts the execution. Transport failures do not: they
    /// become the outcome's `error` with zero execution time. Either
    /// way, a history entry is recorded when a state database is
    /// attached.
    pub async fn execute(
        &self,
        query: &SavedQuery,
        subgraph: &Subgraph,
        bindings: &HashMap<String, String>,
    ) -> Result<ExecutionOutcome> {
        validate_query(&query.template).map_err(|e| ProbeError::query(e.to_string()))?;

        let substituted = substitute(&query.template, &query.parameters, bindings);
        debug!("Executing query '{}' against '{}'", query.name, subgraph.name);

        let request = ProxyRequest {
            query: substituted,
            variables: json!({}),
            subgraph_url: subgraph.url.clone(),
            api_key_env_var: subgraph.api_key_env_var.clone(),
        };

        let outcome = match self.transport.execute(&request).await {
            Ok(response) => {
                let validation = match (&query.validation_snippet, &response.error) {
                    (Some(snippet), None) => Some(run_snippet(snippet, &response.data)),
                    _ => None,
                };
                ExecutionOutcome {
                    data: response.data,
                    error: response.error,
                    execution_time_ms: response.execution_time,
                    validation,
                }
            }
            Err(e) => ExecutionOutcome {
                data: json!({}),
                error: Some(e.to_string()),
                execution_time_ms: 0,
                validation: None,
            },
        };

        if let Some(state_db) = self.state_db {
            let result = serde_json::to_value(&outcome)
                .map_err(|e| ProbeError::internal(format!("Failed to serialize outcome: {e}")))?;
            persistence::history::record_execution(
                state_db.pool(),
                query.id,
                &subgraph.name,
                bindings,
                &result,
                outcome.error.as_deref(),
                outcome.validation.as_ref().map(|v| v.passed),
                outcome.execution_time_ms as i64,
            )
            .await?;
        }

        Ok(outcome)
    }
}
