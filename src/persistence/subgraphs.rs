//! Subgraph endpoint persistence.
//!
//! CRUD operations for saved subgraph configurations. A record holds the
//! endpoint URL and the name of the credential environment variable, not
//! the credential itself.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

/// A saved subgraph endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subgraph {
    pub name: String,
    pub url: String,
    pub api_key_env_var: String,
    pub created_at: String,
}

impl Subgraph {
    /// Creates a new subgraph record.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        api_key_env_var: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api_key_env_var: api_key_env_var.into(),
            created_at: String::new(),
        }
    }

    /// Returns a display string for listings.
    pub fn display_string(&self) -> String {
        format!("{} -> {} (key: ${})", self.name, self.url, self.api_key_env_var)
    }
}

/// Lists all saved subgraphs.
pub async fn list_subgraphs(pool: &SqlitePool) -> Result<Vec<Subgraph>> {
    let rows: Vec<Subgraph> = sqlx::query_as(
        r#"
        SELECT name, url, api_key_env_var, created_at
        FROM subgraphs
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ProbeError::persistence(format!("Failed to list subgraphs: {e}")))?;

    Ok(rows)
}

/// Gets a subgraph by name.
pub async fn get_subgraph(pool: &SqlitePool, name: &str) -> Result<Option<Subgraph>> {
    let row: Option<Subgraph> = sqlx::query_as(
        r#"
        SELECT name, url, api_key_env_var, created_at
        FROM subgraphs
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| ProbeError::persistence(format!("Failed to get subgraph: {e}")))?;

    Ok(row)
}

/// Creates a new subgraph record.
pub async fn create_subgraph(pool: &SqlitePool, subgraph: &Subgraph) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO subgraphs (name, url, api_key_env_var)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&subgraph.name)
    .bind(&subgraph.url)
    .bind(&subgraph.api_key_env_var)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            ProbeError::persistence(format!("Subgraph '{}' already exists", subgraph.name))
        } else {
            ProbeError::persistence(format!("Failed to create subgraph: {e}"))
        }
    })?;

    Ok(())
}

/// Updates an existing subgraph record.
pub async fn update_subgraph(pool: &SqlitePool, subgraph: &Subgraph) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE subgraphs
        SET url = ?, api_key_env_var = ?
        WHERE name = ?
        "#,
    )
    .bind(&subgraph.url)
    .bind(&subgraph.api_key_env_var)
    .bind(&subgraph.name)
    .execute(pool)
    .await
    .map_err(|e| ProbeError::persistence(format!("Failed to update subgraph: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(ProbeError::persistence(format!(
            "Subgraph '{}' not found",
            subgraph.name
        )));
    }

    Ok(())
}

/// Deletes a subgraph record.
pub async fn delete_subgraph(pool: &SqlitePool, name: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM subgraphs WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| ProbeError::persistence(format!("Failed to delete subgraph: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(ProbeError::persistence(format!(
            "Subgraph '{}' not found",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_get_subgraph() {
        let pool = test_pool().await;

        let subgraph = Subgraph::new(
            "uniswap",
            "https://gateway.example/subgraphs/id/abc",
            "GRAPH_API_KEY",
        );
        create_subgraph(&pool, &subgraph).await.unwrap();

        let retrieved = get_subgraph(&pool, "uniswap").await.unwrap().unwrap();
        assert_eq!(retrieved.name, "uniswap");
        assert_eq!(retrieved.url, "https://gateway.example/subgraphs/id/abc");
        assert_eq!(retrieved.api_key_env_var, "GRAPH_API_KEY");
        assert!(!retrieved.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_list_subgraphs_ordered_by_name() {
        let pool = test_pool().await;

        create_subgraph(&pool, &Subgraph::new("beta", "https://b", "B_KEY"))
            .await
            .unwrap();
        create_subgraph(&pool, &Subgraph::new("alpha", "https://a", "A_KEY"))
            .await
            .unwrap();

        let subgraphs = list_subgraphs(&pool).await.unwrap();
        assert_eq!(subgraphs.len(), 2);
        assert_eq!(subgraphs[0].name, "alpha");
        assert_eq!(subgraphs[1].name, "beta");
    }

    #[tokio::test]
    async fn test_duplicate_subgraph_fails() {
        let pool = test_pool().await;

        let subgraph = Subgraph::new("dup", "https://x", "KEY");
        create_subgraph(&pool, &subgraph).await.unwrap();

        let result = create_subgraph(&pool, &subgraph).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_update_subgraph() {
        let pool = test_pool().await;

        create_subgraph(&pool, &Subgraph::new("main", "https://old", "OLD_KEY"))
            .await
            .unwrap();

        update_subgraph(&pool, &Subgraph::new("main", "https://new", "NEW_KEY"))
            .await
            .unwrap();

        let updated = get_subgraph(&pool, "main").await.unwrap().unwrap();
        assert_eq!(updated.url, "https://new");
        assert_eq!(updated.api_key_env_var, "NEW_KEY");
    }

    #[tokio::test]
    async fn test_delete_subgraph() {
        let pool = test_pool().await;

        create_subgraph(&pool, &Subgraph::new("gone", "https://x", "KEY"))
            .await
            .unwrap();
        delete_subgraph(&pool, "gone").await.unwrap();

        assert!(get_subgraph(&pool, "gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_subgraph_fails() {
        let pool = test_pool().await;
        let result = delete_subgraph(&pool, "nope").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
