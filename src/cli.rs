//! Command-line argument parsing for subgraph-probe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A command-line workbench for debugging GraphQL subgraph endpoints.
#[derive(Parser, Debug)]
#[command(name = "sgprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage subgraph endpoint configurations
    Subgraph {
        #[command(subcommand)]
        command: SubgraphCommand,
    },

    /// Manage saved query templates
    Query {
        #[command(subcommand)]
        command: QueryCommand,
    },

    /// Extract and print the parameters of a query template
    Params {
        /// Query template text, or "-" to read from stdin
        #[arg(value_name = "TEMPLATE")]
        template: Option<String>,

        /// Read the template from a file instead
        #[arg(short, long, value_name = "PATH", conflicts_with = "template")]
        file: Option<PathBuf>,
    },

    /// Run the structural syntax check on a query template
    Check {
        /// Query template text, or "-" to read from stdin
        #[arg(value_name = "TEMPLATE")]
        template: Option<String>,

        /// Read the template from a file instead
        #[arg(short, long, value_name = "PATH", conflicts_with = "template")]
        file: Option<PathBuf>,
    },

    /// Execute a saved query through the credential proxy
    Run {
        /// Name of the saved query
        #[arg(value_name = "QUERY")]
        name: String,

        /// Subgraph to disambiguate queries with the same name
        #[arg(short, long, value_name = "NAME")]
        subgraph: Option<String>,

        /// Parameter binding, repeatable (name=value)
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Proxy endpoint URL (overrides config)
        #[arg(long, value_name = "URL")]
        proxy_url: Option<String>,
    },

    /// Inspect execution history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Run the credential-holding proxy server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long, value_name = "PORT")]
        port: Option<u16>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubgraphCommand {
    /// Add a subgraph endpoint
    Add {
        /// Name for the subgraph
        name: String,

        /// Endpoint URL
        #[arg(long, value_name = "URL")]
        url: String,

        /// Environment variable holding the API key (resolved by the proxy)
        #[arg(long = "api-key-env", value_name = "VAR")]
        api_key_env_var: String,
    },

    /// List saved subgraphs
    List,

    /// Remove a subgraph and its queries
    Remove {
        /// Name of the subgraph
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Save a query template
    Add {
        /// Name for the query
        name: String,

        /// Subgraph the query targets
        #[arg(short, long, value_name = "NAME")]
        subgraph: String,

        /// Query template text
        #[arg(short, long, value_name = "TEMPLATE", conflicts_with = "file")]
        query: Option<String>,

        /// Read the template from a file instead
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Validation snippet file to attach
        #[arg(long, value_name = "PATH")]
        validate_file: Option<PathBuf>,
    },

    /// List saved queries
    List {
        /// Only queries for this subgraph
        #[arg(short, long, value_name = "NAME")]
        subgraph: Option<String>,
    },

    /// Show a saved query with its parameters
    Show {
        /// Name of the query
        name: String,

        /// Subgraph to disambiguate queries with the same name
        #[arg(short, long, value_name = "NAME")]
        subgraph: Option<String>,
    },

    /// Remove a saved query
    Remove {
        /// Name of the query
        name: String,

        /// Subgraph the query belongs to
        #[arg(short, long, value_name = "NAME")]
        subgraph: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List recent executions
    List {
        /// Only executions against this subgraph
        #[arg(short, long, value_name = "NAME")]
        subgraph: Option<String>,

        /// Maximum entries to show
        #[arg(short, long, value_name = "N", default_value = "20")]
        limit: i64,
    },

    /// Show one execution in full
    Show {
        /// History entry ID
        id: i64,
    },

    /// Delete all history entries
    Clear,
}

impl Cli {
    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}

/// Parses a `name=value` parameter binding.
pub fn parse_binding(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!(
            "Invalid parameter binding '{input}'. Expected name=value"
        )),
    }
}
