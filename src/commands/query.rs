//! Query command handlers (add, list, show, remove, params, check).

use crate::error::{ProbeError, Result};
use crate::persistence::{self, StateDb};
use crate::template::{extract_parameters, validate_query};
use std::path::PathBuf;

/// Handles `query add`.
pub async fn add(
    db: &StateDb,
    name: &str,
    subgraph: &str,
    inline: Option<String>,
    file: Option<PathBuf>,
    validate_file: Option<PathBuf>,
) -> Result<()> {
    let template = super::read_text_input(inline, file)?;
    validate_query(&template).map_err(|e| ProbeError::query(e.to_string()))?;

    if persistence::subgraphs::get_subgraph(db.pool(), subgraph)
        .await?
        .is_none()
    {
        return Err(ProbeError::persistence(format!(
            "Subgraph '{subgraph}' not found"
        )));
    }

    let snippet = match validate_file {
        Some(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
            ProbeError::validation(format!("Failed to read {}: {e}", path.display()))
        })?),
        None => None,
    };

    let id = persistence::queries::create_saved_query(
        db.pool(),
        name,
        subgraph,
        &template,
        snippet.as_deref(),
    )
    .await?;

    let query = persistence::queries::get_saved_query(db.pool(), id)
        .await?
        .ok_or_else(|| ProbeError::internal("Saved query vanished after insert"))?;

    println!(
        "Saved query '{name}' for subgraph '{subgraph}' ({} parameter{}).",
        query.parameters.len(),
        if query.parameters.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Handles `query list`.
pub async fn list(db: &StateDb, subgraph: Option<&str>) -> Result<()> {
    let queries = persistence::queries::list_saved_queries(db.pool(), subgraph).await?;

    if queries.is_empty() {
        println!("No saved queries found.");
        return Ok(());
    }

    for query in &queries {
        let snippet_marker = if query.validation_snippet.is_some() {
            " [validated]"
        } else {
            ""
        };
        println!(
            "  {} @ {} ({} params){}",
            query.name,
            query.subgraph_name,
            query.parameters.len(),
            snippet_marker
        );
    }
    Ok(())
}

/// Handles `query show`.
pub async fn show(db: &StateDb, name: &str, subgraph: Option<&str>) -> Result<()> {
    let query = persistence::queries::get_saved_query_by_name(db.pool(), name, subgraph)
        .await?
        .ok_or_else(|| ProbeError::persistence(format!("Query '{name}' not found")))?;

    println!("Query '{}' @ {}", query.name, query.subgraph_name);
    println!("\n{}\n", query.template.trim_end());

    if query.parameters.is_empty() {
        println!("No parameters.");
    } else {
        println!("Parameters:");
        for param in &query.parameters {
            println!("  ${{{}}}: {}", param.name, param.param_type.as_str());
        }
    }

    if let Some(snippet) = &query.validation_snippet {
        println!("\nValidation snippet:\n{}", snippet.trim_end());
    }
    Ok(())
}

/// Handles `query remove`.
pub async fn remove(db: &StateDb, name: &str, subgraph: &str) -> Result<()> {
    persistence::queries::delete_saved_query_by_name(db.pool(), name, subgraph).await?;
    println!("Removed query '{name}' from subgraph '{subgraph}'.");
    Ok(())
}

/// Handles `params`: extracts and prints a template's parameters.
pub fn params(inline: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let template = super::read_text_input(inline, file)?;
    let parameters = extract_parameters(&template);

    if parameters.is_empty() {
        println!("No parameters found.");
        return Ok(());
    }

    for param in &parameters {
        println!("  ${{{}}}: {}", param.name, param.param_type.as_str());
    }
    Ok(())
}

/// Handles `check`: runs the structural syntax check.
pub fn check(inline: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let template = super::read_text_input(inline, file)?;
    validate_query(&template).map_err(|e| ProbeError::query(e.to_string()))?;
    println!("Query template is valid.");
    Ok(())
}
