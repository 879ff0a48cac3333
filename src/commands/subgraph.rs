//! Subgraph command handlers (add, list, remove).

use crate::error::{ProbeError, Result};
use crate::persistence::{self, StateDb, Subgraph};
use url::Url;

/// Handles `subgraph add`.
pub async fn add(db: &StateDb, name: &str, url: &str, api_key_env_var: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| ProbeError::config(format!("Invalid subgraph URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ProbeError::config(format!(
            "Invalid scheme '{}'. Expected 'http' or 'https'",
            parsed.scheme()
        )));
    }

    let subgraph = Subgraph::new(name, url, api_key_env_var);
    persistence::subgraphs::create_subgraph(db.pool(), &subgraph).await?;

    println!("Added subgraph '{name}'.");
    Ok(())
}

/// Handles `subgraph list`.
pub async fn list(db: &StateDb) -> Result<()> {
    let subgraphs = persistence::subgraphs::list_subgraphs(db.pool()).await?;

    if subgraphs.is_empty() {
        println!("No subgraphs configured. Add one with 'sgprobe subgraph add'.");
        return Ok(());
    }

    for subgraph in &subgraphs {
        println!("  {}", subgraph.display_string());
    }
    Ok(())
}

/// Handles `subgraph remove`.
pub async fn remove(db: &StateDb, name: &str) -> Result<()> {
    persistence::subgraphs::delete_subgraph(db.pool(), name).await?;
    println!("Removed subgraph '{name}' and its queries.");
    Ok(())
}
