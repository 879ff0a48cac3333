//! Saved query persistence.
//!
//! CRUD operations for user-authored query templates. The parameter list
//! is derived from the template at save time and stored as a JSON column
//! alongside it.

use crate::error::{ProbeError, Result};
use crate::template::{extract_parameters, Parameter};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// A saved query template with its derived parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuery {
    pub id: i64,
    pub name: String,
    pub subgraph_name: String,
    pub template: String,
    pub parameters: Vec<Parameter>,
    pub validation_snippet: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Raw database row for a saved query.
#[derive(Debug, Clone, FromRow)]
struct SavedQueryRow {
    id: i64,
    name: String,
    subgraph_name: String,
    template: String,
    parameters: String,
    validation_snippet: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<SavedQueryRow> for SavedQuery {
    fn from(row: SavedQueryRow) -> Self {
        let parameters = serde_json::from_str(&row.parameters).unwrap_or_default();

        Self {
            id: row.id,
            name: row.name,
            subgraph_name: row.subgraph_name,
            template: row.template,
            parameters,
            validation_snippet: row.validation_snippet,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, subgraph_name, template, parameters, validation_snippet,
           created_at, updated_at
    FROM saved_queries
"#;

/// Creates a new saved query. The parameter list is extracted from the
/// template here so it is always in sync with the stored text.
pub async fn create_saved_query(
    pool: &SqlitePool,
    name: &str,
    subgraph_name: &str,
    template: &str,
    validation_snippet: Option<&str>,
) -> Result<i64> {
    let parameters = extract_parameters(template);
    let parameters_json = serde_json::to_string(&parameters)
        .map_err(|e| ProbeError::internal(format!("Failed to serialize parameters: {e}")))?;

    let result = sqlx::query(
        r#"
        INSERT INTO saved_queries (name, subgraph_name, template, parameters, validation_snippet)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(subgraph_name)
    .bind(template)
    .bind(&parameters_json)
    .bind(validation_snippet)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            ProbeError::persistence(format!(
                "Query '{}' already exists for subgraph '{}'",
                name, subgraph_name
            ))
        } else if e.to_string().contains("FOREIGN KEY constraint") {
            ProbeError::persistence(format!("Subgraph '{}' not found", subgraph_name))
        } else {
            ProbeError::persistence(format!("Failed to create saved query: {e}"))
        }
    })?;

    Ok(result.last_insert_rowid())
}

/// Gets a saved query by ID.
pub async fn get_saved_query(pool: &SqlitePool, id: i64) -> Result<Option<SavedQuery>> {
    let row: Option<SavedQueryRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to get saved query: {e}")))?;

    Ok(row.map(SavedQuery::from))
}

/// Gets a saved query by name, optionally scoped to a subgraph.
pub async fn get_saved_query_by_name(
    pool: &SqlitePool,
    name: &str,
    subgraph_name: Option<&str>,
) -> Result<Option<SavedQuery>> {
    let row: Option<SavedQueryRow> = if let Some(subgraph) = subgraph_name {
        sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE name = ? AND subgraph_name = ?"
        ))
        .bind(name)
        .bind(subgraph)
        .fetch_optional(pool)
        .await
    } else {
        sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE name = ? ORDER BY subgraph_name LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(pool)
        .await
    }
    .map_err(|e| ProbeError::persistence(format!("Failed to get saved query: {e}")))?;

    Ok(row.map(SavedQuery::from))
}

/// Lists saved queries, optionally filtered by subgraph.
pub async fn list_saved_queries(
    pool: &SqlitePool,
    subgraph_name: Option<&str>,
) -> Result<Vec<SavedQuery>> {
    let rows: Vec<SavedQueryRow> = if let Some(subgraph) = subgraph_name {
        sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE subgraph_name = ? ORDER BY name"
        ))
        .bind(subgraph)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY subgraph_name, name"))
            .fetch_all(pool)
            .await
    }
    .map_err(|e| ProbeError::persistence(format!("Failed to list saved queries: {e}")))?;

    Ok(rows.into_iter().map(SavedQuery::from).collect())
}

/// Updates a saved query's template and/or validation snippet.
///
/// A template change re-derives the stored parameter list.
pub async fn update_saved_query(
    pool: &SqlitePool,
    id: i64,
    template: Option<&str>,
    validation_snippet: Option<&str>,
) -> Result<()> {
    if let Some(new_template) = template {
        let parameters = extract_parameters(new_template);
        let parameters_json = serde_json::to_string(&parameters)
            .map_err(|e| ProbeError::internal(format!("Failed to serialize parameters: {e}")))?;

        sqlx::query(
            r#"
            UPDATE saved_queries
            SET template = ?, parameters = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(new_template)
        .bind(&parameters_json)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to update saved query: {e}")))?;
    }

    if let Some(snippet) = validation_snippet {
        sqlx::query(
            r#"
            UPDATE saved_queries
            SET validation_snippet = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(snippet)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to update saved query: {e}")))?;
    }

    Ok(())
}

/// Deletes a saved query by name within a subgraph.
pub async fn delete_saved_query_by_name(
    pool: &SqlitePool,
    name: &str,
    subgraph_name: &str,
) -> Result<()> {
    let result = sqlx::query("DELETE FROM saved_queries WHERE name = ? AND subgraph_name = ?")
        .bind(name)
        .bind(subgraph_name)
        .execute(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to delete saved query: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(ProbeError::persistence(format!(
            "Query '{}' not found for subgraph '{}'",
            name, subgraph_name
        )));
    }

    Ok(())
}
