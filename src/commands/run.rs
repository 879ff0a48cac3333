//! The `run` command: execute a saved query through the proxy.

use crate::cli::parse_binding;
use crate::config::Config;
use crate::error::{ProbeError, Result};
use crate::persistence::{self, StateDb};
use crate::query::QueryExecutor;
use crate::transport::HttpTransport;
use crate::validation::ValidationOutcome;
use std::collections::HashMap;

/// Handles `run`.
pub async fn run(
    db: &StateDb,
    config: &Config,
    name: &str,
    subgraph: Option<&str>,
    params: &[String],
    proxy_url: Option<String>,
) -> Result<()> {
    let mut bindings = HashMap::new();
    for param in params {
        let (key, value) = parse_binding(param).map_err(ProbeError::query)?;
        bindings.insert(key, value);
    }

    let query = persistence::queries::get_saved_query_by_name(db.pool(), name, subgraph)
        .await?
        .ok_or_else(|| ProbeError::persistence(format!("Query '{name}' not found")))?;

    let subgraph = persistence::subgraphs::get_subgraph(db.pool(), &query.subgraph_name)
        .await?
        .ok_or_else(|| {
            ProbeError::persistence(format!("Subgraph '{}' not found", query.subgraph_name))
        })?;

    let endpoint = proxy_url.unwrap_or_else(|| config.proxy.endpoint_url());
    let transport = HttpTransport::new(endpoint)?;
    let executor = QueryExecutor::new(&transport, Some(db));

    let outcome = executor.execute(&query, &subgraph, &bindings).await?;

    match &outcome.error {
        Some(error) => {
            println!("Execution failed: {error}");
        }
        None => {
            let data = serde_json::to_string_pretty(&outcome.data)
                .unwrap_or_else(|_| outcome.data.to_string());
            println!("{data}");
            println!("\nExecuted in {} ms.", outcome.execution_time_ms);
        }
    }

    if let Some(validation) = &outcome.validation {
        print_validation(validation);
    }

    Ok(())
}

/// Renders a validation outcome, check by check.
fn print_validation(outcome: &ValidationOutcome) {
    let verdict = if outcome.passed { "PASSED" } else { "FAILED" };
    println!("\nValidation {verdict} ({} ms)", outcome.duration_ms);

    for check in &outcome.checks {
        let icon = if check.passed { "✓" } else { "✗" };
        println!("  {icon} {}: {}", check.name, check.message);

        if let Some(vars) = &check.debug_variables {
            for (name, value) in vars {
                println!("      {name} = {value}");
            }
        }
    }
}
