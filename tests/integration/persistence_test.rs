//! Integration tests for the persistence layer.

use serde_json::json;
use std::collections::HashMap;
use subgraph_probe::persistence::{self, HistoryFilter, StateDb, Subgraph};
use subgraph_probe::template::ParamType;
use tempfile::tempdir;

async fn create_test_db() -> (StateDb, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test_state.db");
    let db = StateDb::open(&path).await.unwrap();
    (db, dir)
}

#[tokio::test]
async fn test_state_db_creation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    let db = StateDb::open(&path).await.unwrap();
    assert!(path.exists());
    db.close().await;
}

#[tokio::test]
async fn test_subgraph_crud() {
    let (db, _dir) = create_test_db().await;

    let subgraph = Subgraph::new(
        "uniswap-v3",
        "https://gateway.example/subgraphs/id/abc",
        "GRAPH_API_KEY",
    );
    persistence::subgraphs::create_subgraph(db.pool(), &subgraph)
        .await
        .unwrap();

    let retrieved = persistence::subgraphs::get_subgraph(db.pool(), "uniswap-v3")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retrieved.url, "https://gateway.example/subgraphs/id/abc");
    assert_eq!(retrieved.api_key_env_var, "GRAPH_API_KEY");

    let all = persistence::subgraphs::list_subgraphs(db.pool()).await.unwrap();
    assert_eq!(all.len(), 1);

    persistence::subgraphs::delete_subgraph(db.pool(), "uniswap-v3")
        .await
        .unwrap();
    assert!(persistence::subgraphs::get_subgraph(db.pool(), "uniswap-v3")
        .await
        .unwrap()
        .is_none());

    db.close().await;
}

#[tokio::test]
async fn test_saved_query_round_trip_keeps_parameters() {
    let (db, _dir) = create_test_db().await;

    let subgraph = Subgraph::new("test", "https://x", "KEY");
    persistence::subgraphs::create_subgraph(db.pool(), &subgraph)
        .await
        .unwrap();

    let id = persistence::queries::create_saved_query(
        db.pool(),
        "top_pools",
        "test",
        "{ pools(first: ${limit}, where: { id: ${poolId} }) { id } }",
        Some("return len(data.pools) > 0"),
    )
    .await
    .unwrap();

    let query = persistence::queries::get_saved_query(db.pool(), id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(query.parameters.len(), 2);
    assert_eq!(query.parameters[0].name, "limit");
    assert_eq!(query.parameters[0].param_type, ParamType::Number);
    assert_eq!(query.parameters[1].name, "poolId");
    assert_eq!(query.parameters[1].param_type, ParamType::String);
    assert_eq!(
        query.validation_snippet.as_deref(),
        Some("return len(data.pools) > 0")
    );

    db.close().await;
}

#[tokio::test]
async fn test_deleting_subgraph_cascades_to_queries() {
    let (db, _dir) = create_test_db().await;

    let subgraph = Subgraph::new("test", "https://x", "KEY");
    persistence::subgraphs::create_subgraph(db.pool(), &subgraph)
        .await
        .unwrap();
    persistence::queries::create_saved_query(db.pool(), "q", "test", "{ a }", None)
        .await
        .unwrap();

    persistence::subgraphs::delete_subgraph(db.pool(), "test")
        .await
        .unwrap();

    let queries = persistence::queries::list_saved_queries(db.pool(), None)
        .await
        .unwrap();
    assert!(queries.is_empty());

    db.close().await;
}

#[tokio::test]
async fn test_history_cap_keeps_most_recent_hundred() {
    let (db, _dir) = create_test_db().await;

    let subgraph = Subgraph::new("test", "https://x", "KEY");
    persistence::subgraphs::create_subgraph(db.pool(), &subgraph)
        .await
        .unwrap();
    let query_id =
        persistence::queries::create_saved_query(db.pool(), "q", "test", "{ a }", None)
            .await
            .unwrap();

    for n in 0..101 {
        persistence::history::record_execution(
            db.pool(),
            query_id,
            "test",
            &HashMap::new(),
            &json!({"n": n}),
            None,
            None,
            5,
        )
        .await
        .unwrap();
    }

    assert_eq!(persistence::history::count_history(db.pool()).await.unwrap(), 100);

    let entries = persistence::history::list_history(db.pool(), &HistoryFilter::default())
        .await
        .unwrap();
    assert_eq!(entries.len(), 100);
    assert_eq!(entries[0].result, json!({"n": 100}));
    assert_eq!(entries[99].result, json!({"n": 1}));

    db.close().await;
}
