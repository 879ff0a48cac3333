//! subgraph-probe - A command-line workbench for debugging GraphQL
//! subgraph endpoints.

use clap::Parser;
use subgraph_probe::cli::{Cli, Command, HistoryCommand, QueryCommand, SubgraphCommand};
use subgraph_probe::commands;
use subgraph_probe::config::Config;
use subgraph_probe::error::Result;
use subgraph_probe::persistence::StateDb;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Credential variables for the proxy may live in a local .env file.
    dotenvy::dotenv().ok();

    // Initialize logging; diagnostics go to stderr so stdout stays clean
    // for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_path();
    let config = Config::load_from_file(&config_path)?;

    match cli.command {
        // Commands that never touch the state database.
        Command::Params { template, file } => commands::query::params(template, file),
        Command::Check { template, file } => commands::query::check(template, file),
        Command::Serve { port } => commands::serve::run(&config, port).await,

        // Everything else operates on local state.
        command => {
            let db = open_state_db(&config).await?;
            let result = dispatch(command, &db, &config).await;
            db.close().await;
            result
        }
    }
}

/// Opens the state database at the configured or default path.
async fn open_state_db(config: &Config) -> Result<StateDb> {
    match &config.storage.state_db {
        Some(path) => {
            info!("Using state database at {}", path.display());
            StateDb::open(path).await
        }
        None => StateDb::open_default().await,
    }
}

async fn dispatch(command: Command, db: &StateDb, config: &Config) -> Result<()> {
    match command {
        Command::Subgraph { command } => match command {
            SubgraphCommand::Add {
                name,
                url,
                api_key_env_var,
            } => commands::subgraph::add(db, &name, &url, &api_key_env_var).await,
            SubgraphCommand::List => commands::subgraph::list(db).await,
            SubgraphCommand::Remove { name } => commands::subgraph::remove(db, &name).await,
        },
        Command::Query { command } => match command {
            QueryCommand::Add {
                name,
                subgraph,
                query,
                file,
                validate_file,
            } => commands::query::add(db, &name, &subgraph, query, file, validate_file).await,
            QueryCommand::List { subgraph } => {
                commands::query::list(db, subgraph.as_deref()).await
            }
            QueryCommand::Show { name, subgraph } => {
                commands::query::show(db, &name, subgraph.as_deref()).await
            }
            QueryCommand::Remove { name, subgraph } => {
                commands::query::remove(db, &name, &subgraph).await
            }
        },
        Command::Run {
            name,
            subgraph,
            params,
            proxy_url,
        } => {
            commands::run::run(db, config, &name, subgraph.as_deref(), &params, proxy_url).await
        }
        Command::History { command } => match command {
            HistoryCommand::List { subgraph, limit } => {
                commands::history::list(db, subgraph.as_deref(), limit).await
            }
            HistoryCommand::Show { id } => commands::history::show(db, id).await,
            HistoryCommand::Clear => commands::history::clear(db).await,
        },
        Command::Params { .. } | Command::Check { .. } | Command::Serve { .. } => {
            unreachable!("handled before the state database is opened")
        }
    }
}
