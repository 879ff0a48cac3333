//! Integration tests for validation snippet execution.

use serde_json::json;
use subgraph_probe::validation::run_snippet;

#[test]
fn test_snippet_verdicts() {
    let outcome = run_snippet("return data.count > 0", &json!({"count": 5}));
    assert!(outcome.passed);
    assert_eq!(outcome.checks.len(), 1);

    let outcome = run_snippet("return data.count > 0", &json!({"count": 0}));
    assert!(!outcome.passed);
}

#[test]
fn test_snippet_error_never_escapes() {
    let outcome = run_snippet(
        "return data.pools[0].volume.weekly > 0",
        &json!({"pools": []}),
    );
    assert!(!outcome.passed);
    let error = outcome.error.expect("error description attached");
    assert!(!error.is_empty());
}

#[test]
fn test_syntax_error_is_a_failed_outcome() {
    let outcome = run_snippet("return data.count >", &json!({"count": 1}));
    assert!(!outcome.passed);
    assert!(outcome.error.is_some());
}

#[test]
fn test_realistic_snippet_with_debug_capture() {
    let data = json!({
        "pools": [
            {"id": "a", "txCount": "120"},
            {"id": "b", "txCount": "98"}
        ]
    });
    let snippet = r#"
        let pools = data.pools
        debug("pool_count", len(pools))
        debug("first_id", pools[0].id)
        return len(pools) == 2 && pools[0].id == "a"
    "#;

    let outcome = run_snippet(snippet, &data);
    assert!(outcome.passed);

    let vars = outcome.checks[0]
        .debug_variables
        .as_ref()
        .expect("captured variables");
    assert_eq!(vars.get("pool_count"), Some(&json!(2)));
    assert_eq!(vars.get("first_id"), Some(&json!("a")));
}

#[test]
fn test_snippet_has_no_host_access() {
    for snippet in [
        "return localStorage",
        "return process.env",
        "return fetch(\"http://example.com\")",
    ] {
        let outcome = run_snippet(snippet, &json!({}));
        assert!(!outcome.passed, "snippet: {snippet}");
        assert!(outcome.error.is_some(), "snippet: {snippet}");
    }
}
