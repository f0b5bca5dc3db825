// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # agent-progress CLI
//!
//! Command-line front end for the agent-progress tracker. The binary
//! opens the PostgreSQL pool at startup, passes it explicitly into every
//! component, and closes it on exit; there is no lazily-initialized
//! global store handle.
//!
//! ## Commands
//!
//! - `agent-progress workflow create|status|list|show` - workflow tracking
//! - `agent-progress agent create|update|events` - agent tracking
//! - `agent-progress db migrate` - apply schema migrations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use agent_progress_core::infrastructure::db::Database;

mod commands;

use commands::{AgentCommand, DbCommand, WorkflowCommand};

/// agent-progress - track hierarchical agent execution per workflow
#[derive(Parser)]
#[command(name = "agent-progress")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(
        long,
        global = true,
        env = "AGENT_PROGRESS_DATABASE_URL",
        value_name = "URL"
    )]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AGENT_PROGRESS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workflow tracking operations
    #[command(name = "workflow")]
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommand,
    },

    /// Agent tracking operations
    #[command(name = "agent")]
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Database management
    #[command(name = "db")]
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let database_url = cli
        .database_url
        .context("No database URL; pass --database-url or set AGENT_PROGRESS_DATABASE_URL")?;
    let db = Database::new(&database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    debug!("Connected to database");

    let result = match cli.command {
        Commands::Workflow { command } => commands::workflow::handle_command(command, &db).await,
        Commands::Agent { command } => commands::agent::handle_command(command, &db).await,
        Commands::Db { command } => commands::db::handle_command(command, &db).await,
    };

    db.close().await;
    result
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
