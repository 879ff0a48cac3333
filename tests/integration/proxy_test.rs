//! Integration tests for the credential proxy, against a mock upstream.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use subgraph_probe::proxy::{router, ProxyState};
use subgraph_probe::transport::{HttpTransport, ProxyRequest, QueryTransport};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts the proxy on an ephemeral port and returns its address.
async fn start_proxy() -> SocketAddr {
    let state = Arc::new(ProxyState::new().unwrap());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn post_graphql(addr: SocketAddr, body: Value) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/graphql"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let addr = start_proxy().await;

    let (status, body) = post_graphql(addr, json!({"query": "{ tokens { id } }"})).await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        json!("Missing required fields: query and subgraphUrl.")
    );

    let (status, _) = post_graphql(addr, json!({"subgraphUrl": "https://x"})).await;
    assert_eq!(status, 400);

    // Empty strings count as missing.
    let (status, _) = post_graphql(
        addr,
        json!({"query": "", "subgraphUrl": "https://x"}),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_unset_credential_variable_rejected() {
    let addr = start_proxy().await;

    let (status, body) = post_graphql(
        addr,
        json!({
            "query": "{ tokens { id } }",
            "subgraphUrl": "https://upstream.example/graphql",
            "apiKeyEnvVar": "SGPROBE_TEST_UNSET_VAR",
        }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        json!("API key not found for environment variable: SGPROBE_TEST_UNSET_VAR")
    );
}

#[tokio::test]
async fn test_forwards_with_bearer_credential() {
    std::env::set_var("SGPROBE_TEST_KEY_FORWARD", "secret-key");

    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_partial_json(json!({"query": "{ tokens { id } }"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"tokens": [{"id": "a"}]}})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_proxy().await;
    let (status, body) = post_graphql(
        addr,
        json!({
            "query": "{ tokens { id } }",
            "variables": {},
            "subgraphUrl": format!("{}/graphql", upstream.uri()),
            "apiKeyEnvVar": "SGPROBE_TEST_KEY_FORWARD",
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"], json!({"tokens": [{"id": "a"}]}));
    assert_eq!(body["error"], Value::Null);
    assert!(body["executionTime"].is_number());
}

#[tokio::test]
async fn test_reports_first_upstream_graphql_error() {
    std::env::set_var("SGPROBE_TEST_KEY_ERRORS", "secret-key");

    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [
                {"message": "indexing error"},
                {"message": "second error"}
            ]
        })))
        .mount(&upstream)
        .await;

    let addr = start_proxy().await;
    let (status, body) = post_graphql(
        addr,
        json!({
            "query": "{ tokens { id } }",
            "subgraphUrl": upstream.uri(),
            "apiKeyEnvVar": "SGPROBE_TEST_KEY_ERRORS",
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["error"], json!("indexing error"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_internal_error() {
    std::env::set_var("SGPROBE_TEST_KEY_DOWN", "secret-key");

    let addr = start_proxy().await;
    let (status, body) = post_graphql(
        addr,
        json!({
            "query": "{ tokens { id } }",
            // Nothing listens here; the forward fails.
            "subgraphUrl": "http://127.0.0.1:9/graphql",
            "apiKeyEnvVar": "SGPROBE_TEST_KEY_DOWN",
        }),
    )
    .await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], json!("Internal server error"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let addr = start_proxy().await;

    let body: Value = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn test_http_transport_against_real_proxy() {
    std::env::set_var("SGPROBE_TEST_KEY_TRANSPORT", "secret-key");

    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"count": 5}})),
        )
        .mount(&upstream)
        .await;

    let addr = start_proxy().await;
    let transport = HttpTransport::new(format!("http://{addr}/api/graphql")).unwrap();

    let response = transport
        .execute(&ProxyRequest {
            query: "{ count }".to_string(),
            variables: json!({}),
            subgraph_url: upstream.uri(),
            api_key_env_var: "SGPROBE_TEST_KEY_TRANSPORT".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.data, json!({"count": 5}));
    assert!(response.error.is_none());

    // A proxy-reported failure surfaces as a proxy error.
    let err = transport
        .execute(&ProxyRequest {
            query: "{ count }".to_string(),
            variables: json!({}),
            subgraph_url: upstream.uri(),
            api_key_env_var: "SGPROBE_TEST_UNSET_VAR_2".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("API key not found for environment variable"));
}
