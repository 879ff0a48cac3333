//! Integration tests for query execution orchestration.

use serde_json::json;
use std::collections::HashMap;
use subgraph_probe::persistence::{self, HistoryFilter, StateDb, Subgraph};
use subgraph_probe::query::QueryExecutor;
use subgraph_probe::transport::{FailingTransport, MockTransport};
use tempfile::tempdir;

async fn seeded_db() -> (StateDb, tempfile::TempDir, i64) {
    let dir = tempdir().unwrap();
    let db = StateDb::open(&dir.path().join("state.db")).await.unwrap();

    let subgraph = Subgraph::new("test", "https://gateway.example/id/abc", "GRAPH_KEY");
    persistence::subgraphs::create_subgraph(db.pool(), &subgraph)
        .await
        .unwrap();

    let query_id = persistence::queries::create_saved_query(
        db.pool(),
        "token_count",
        "test",
        "{ tokens(first: ${limit}) { id } }",
        Some("debug(\"n\", len(data.tokens))\nreturn len(data.tokens) > 0"),
    )
    .await
    .unwrap();

    (db, dir, query_id)
}

#[tokio::test]
async fn test_execution_records_history_entry() {
    let (db, _dir, query_id) = seeded_db().await;

    let query = persistence::queries::get_saved_query(db.pool(), query_id)
        .await
        .unwrap()
        .unwrap();
    let subgraph = persistence::subgraphs::get_subgraph(db.pool(), "test")
        .await
        .unwrap()
        .unwrap();

    let mock = MockTransport::with_data(json!({"tokens": [{"id": "a"}]}));
    let executor = QueryExecutor::new(&mock, Some(&db));

    let mut bindings = HashMap::new();
    bindings.insert("limit".to_string(), "1".to_string());

    let outcome = executor.execute(&query, &subgraph, &bindings).await.unwrap();
    assert!(outcome.is_success());
    assert!(outcome.validation.as_ref().unwrap().passed);

    let entries = persistence::history::list_history(db.pool(), &HistoryFilter::default())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].query_id, query_id);
    assert_eq!(entries[0].bindings.get("limit"), Some(&"1".to_string()));
    assert_eq!(entries[0].passed, Some(true));
    assert_eq!(entries[0].result["data"], json!({"tokens": [{"id": "a"}]}));

    db.close().await;
}

#[tokio::test]
async fn test_failed_execution_is_recorded_too() {
    let (db, _dir, query_id) = seeded_db().await;

    let query = persistence::queries::get_saved_query(db.pool(), query_id)
        .await
        .unwrap()
        .unwrap();
    let subgraph = persistence::subgraphs::get_subgraph(db.pool(), "test")
        .await
        .unwrap()
        .unwrap();

    let failing = FailingTransport::new("proxy unreachable");
    let executor = QueryExecutor::new(&failing, Some(&db));

    let outcome = executor
        .execute(&query, &subgraph, &HashMap::new())
        .await
        .unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.execution_time_ms, 0);

    let entries = persistence::history::list_history(db.pool(), &HistoryFilter::default())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].error.as_ref().unwrap().contains("proxy unreachable"));
    assert_eq!(entries[0].execution_time_ms, 0);
    assert_eq!(entries[0].passed, None);

    db.close().await;
}
