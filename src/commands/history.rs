//! History command handlers (list, show, clear).

use crate::error::{ProbeError, Result};
use crate::persistence::{self, HistoryFilter, StateDb};

/// Handles `history list`.
pub async fn list(db: &StateDb, subgraph: Option<&str>, limit: i64) -> Result<()> {
    let filter = HistoryFilter {
        subgraph_name: subgraph.map(String::from),
        limit: Some(limit),
        ..Default::default()
    };

    let entries = persistence::history::list_history(db.pool(), &filter).await?;

    if entries.is_empty() {
        println!("No history entries found.");
        return Ok(());
    }

    for entry in &entries {
        let status_icon = match (&entry.error, entry.passed) {
            (Some(_), _) => "✗",
            (None, Some(false)) => "✗",
            (None, Some(true)) => "✓",
            (None, None) => "·",
        };
        println!(
            "  {} #{} [{}] {} ({} ms)",
            status_icon,
            entry.id,
            entry.created_at,
            entry.subgraph_name,
            entry.execution_time_ms
        );
    }
    Ok(())
}

/// Handles `history show`.
pub async fn show(db: &StateDb, id: i64) -> Result<()> {
    let entry = persistence::history::get_history_entry(db.pool(), id)
        .await?
        .ok_or_else(|| ProbeError::persistence(format!("History entry {id} not found")))?;

    println!("Execution #{} [{}]", entry.id, entry.created_at);
    println!("Subgraph: {}", entry.subgraph_name);

    if !entry.bindings.is_empty() {
        println!("Bindings:");
        let mut names: Vec<_> = entry.bindings.keys().collect();
        names.sort();
        for name in names {
            println!("  {name} = {}", entry.bindings[name]);
        }
    }

    if let Some(error) = &entry.error {
        println!("Error: {error}");
    }

    let result = serde_json::to_string_pretty(&entry.result)
        .unwrap_or_else(|_| entry.result.to_string());
    println!("\n{result}");
    Ok(())
}

/// Handles `history clear`.
pub async fn clear(db: &StateDb) -> Result<()> {
    let deleted = persistence::history::clear_history(db.pool()).await?;
    println!("Cleared {deleted} history entries.");
    Ok(())
}
