//! Execution history persistence.
//!
//! Records executed queries with their bindings and full results.
//! Retention is capped at the 100 most recent entries; the oldest entry
//! is evicted on insert once the cap is reached.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use std::collections::HashMap;

const MAX_HISTORY_ENTRIES: i64 = 100;

/// An execution history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: i64,
    pub query_id: i64,
    pub subgraph_name: String,
    /// Parameter bindings used for this execution.
    pub bindings: HashMap<String, String>,
    /// Full execution result, including any validation outcome.
    pub result: Value,
    pub error: Option<String>,
    /// Validation verdict, when a snippet ran.
    pub passed: Option<bool>,
    pub execution_time_ms: i64,
    pub created_at: String,
}

/// Raw database row for a history entry.
#[derive(Debug, Clone, FromRow)]
struct ExecutionRecordRow {
    id: i64,
    query_id: i64,
    subgraph_name: String,
    bindings: String,
    result: String,
    error: Option<String>,
    passed: Option<bool>,
    execution_time_ms: i64,
    created_at: String,
}

impl From<ExecutionRecordRow> for ExecutionRecord {
    fn from(row: ExecutionRecordRow) -> Self {
        let bindings = serde_json::from_str(&row.bindings).unwrap_or_default();
        let result = serde_json::from_str(&row.result).unwrap_or(Value::Null);

        Self {
            id: row.id,
            query_id: row.query_id,
            subgraph_name: row.subgraph_name,
            bindings,
            result,
            error: row.error,
            passed: row.passed,
            execution_time_ms: row.execution_time_ms,
            created_at: row.created_at,
        }
    }
}

/// Filter options for listing history.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub query_id: Option<i64>,
    pub subgraph_name: Option<String>,
    pub limit: Option<i64>,
}

/// Records a new execution in history and prunes beyond the cap.
#[allow(clippy::too_many_arguments)]
pub async fn record_execution(
    pool: &SqlitePool,
    query_id: i64,
    subgraph_name: &str,
    bindings: &HashMap<String, String>,
    result: &Value,
    error: Option<&str>,
    passed: Option<bool>,
    execution_time_ms: i64,
) -> Result<i64> {
    let bindings_json = serde_json::to_string(bindings)
        .map_err(|e| ProbeError::internal(format!("Failed to serialize bindings: {e}")))?;
    let result_json = serde_json::to_string(result)
        .map_err(|e| ProbeError::internal(format!("Failed to serialize result: {e}")))?;

    let insert = sqlx::query(
        r#"
        INSERT INTO execution_history
        (query_id, subgraph_name, bindings, result, error, passed, execution_time_ms)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(query_id)
    .bind(subgraph_name)
    .bind(&bindings_json)
    .bind(&result_json)
    .bind(error)
    .bind(passed)
    .bind(execution_time_ms)
    .execute(pool)
    .await
    .map_err(|e| ProbeError::persistence(format!("Failed to record execution: {e}")))?;

    let id = insert.last_insert_rowid();

    prune_excess_entries(pool).await?;

    Ok(id)
}

/// Prunes history entries beyond the retention cap, oldest first.
async fn prune_excess_entries(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM execution_history
        WHERE id NOT IN (
            SELECT id FROM execution_history
            ORDER BY id DESC
            LIMIT ?
        )
        "#,
    )
    .bind(MAX_HISTORY_ENTRIES)
    .execute(pool)
    .await
    .map_err(|e| ProbeError::persistence(format!("Failed to prune excess entries: {e}")))?;

    Ok(())
}

/// Lists history entries, most recent first.
pub async fn list_history(pool: &SqlitePool, filter: &HistoryFilter) -> Result<Vec<ExecutionRecord>> {
    let mut query = String::from(
        r#"
        SELECT id, query_id, subgraph_name, bindings, result, error, passed,
               execution_time_ms, created_at
        FROM execution_history
        WHERE 1=1
        "#,
    );

    if filter.query_id.is_some() {
        query.push_str(" AND query_id = ?");
    }
    if filter.subgraph_name.is_some() {
        query.push_str(" AND subgraph_name = ?");
    }

    query.push_str(" ORDER BY id DESC");

    if filter.limit.is_some() {
        query.push_str(" LIMIT ?");
    }

    let mut sqlx_query = sqlx::query_as::<_, ExecutionRecordRow>(&query);

    if let Some(query_id) = filter.query_id {
        sqlx_query = sqlx_query.bind(query_id);
    }
    if let Some(ref subgraph) = filter.subgraph_name {
        sqlx_query = sqlx_query.bind(subgraph);
    }
    if let Some(limit) = filter.limit {
        sqlx_query = sqlx_query.bind(limit);
    }

    let rows = sqlx_query
        .fetch_all(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to list history: {e}")))?;

    Ok(rows.into_iter().map(ExecutionRecord::from).collect())
}

/// Gets a single history entry by ID.
pub async fn get_history_entry(pool: &SqlitePool, id: i64) -> Result<Option<ExecutionRecord>> {
    let row: Option<ExecutionRecordRow> = sqlx::query_as(
        r#"
        SELECT id, query_id, subgraph_name, bindings, result, error, passed,
               execution_time_ms, created_at
        FROM execution_history
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ProbeError::persistence(format!("Failed to get history entry: {e}")))?;

    Ok(row.map(ExecutionRecord::from))
}

/// Clears all history entries.
pub async fn clear_history(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM execution_history")
        .execute(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to clear history: {e}")))?;

    Ok(result.rows_affected())
}

/// Returns the count of history entries.
pub async fn count_history(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM execution_history")
        .fetch_one(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to count history: {e}")))?;

    Ok(count)
}
