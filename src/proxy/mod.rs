//! Credential-holding GraphQL proxy.
//!
//! Exposes `POST /api/graphql`: resolves the named credential environment
//! variable server-side, forwards the query to the upstream subgraph with
//! a bearer header, and returns `{data, error?, executionTime}`. Clients
//! never see the credential itself, only its variable name.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Timeout for upstream subgraph requests.
const UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Shared state for proxy handlers.
pub struct ProxyState {
    http: reqwest::Client,
}

impl ProxyState {
    /// Creates the shared state with its upstream HTTP client.
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http })
    }
}

/// Builds the axum router with all proxy endpoints.
pub fn router(state: Arc<ProxyState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/graphql", post(handle_graphql))
        .layer(cors)
        .with_state(state)
}

/// Starts the proxy server on the given address and serves until the
/// process is stopped.
pub async fn start(addr: SocketAddr) -> anyhow::Result<()> {
    let state = Arc::new(ProxyState::new()?);
    let app = router(state);

    info!("Proxy listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handles one execution request.
///
/// Field checks happen on the raw JSON body so missing and empty fields
/// produce the same 400 response instead of a framework rejection.
async fn handle_graphql(
    State(state): State<Arc<ProxyState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let query = non_empty_str(&body, "query");
    let subgraph_url = non_empty_str(&body, "subgraphUrl");

    let (query, subgraph_url) = match (query, subgraph_url) {
        (Some(q), Some(u)) => (q, u),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing required fields: query and subgraphUrl.",
            );
        }
    };

    let api_key_env_var = body
        .get("apiKeyEnvVar")
        .and_then(Value::as_str)
        .unwrap_or("");

    let api_key = match std::env::var(api_key_env_var) {
        Ok(key) if !key.is_empty() => key,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("API key not found for environment variable: {api_key_env_var}"),
            );
        }
    };

    let variables = body.get("variables").cloned().unwrap_or_else(|| json!({}));

    let start = Instant::now();
    match forward(&state.http, subgraph_url, &api_key, query, &variables).await {
        Ok(upstream) => {
            let execution_time = start.elapsed().as_millis() as u64;
            let data = upstream.get("data").cloned().unwrap_or(Value::Null);
            let error = upstream
                .get("errors")
                .and_then(|errs| errs.get(0))
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(String::from);

            (
                StatusCode::OK,
                Json(json!({
                    "data": data,
                    "error": error,
                    "executionTime": execution_time,
                })),
            )
        }
        Err(e) => {
            error!("GraphQL proxy error: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Forwards the query to the upstream subgraph with a bearer credential.
async fn forward(
    http: &reqwest::Client,
    subgraph_url: &str,
    api_key: &str,
    query: &str,
    variables: &Value,
) -> anyhow::Result<Value> {
    let response = http
        .post(subgraph_url)
        .bearer_auth(api_key)
        .json(&json!({
            "query": query,
            "variables": variables,
        }))
        .send()
        .await?;

    Ok(response.json().await?)
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}
