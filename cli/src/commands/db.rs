// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Database maintenance commands

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use agent_progress_core::infrastructure::db::Database;

#[derive(Subcommand)]
pub enum DbCommand {
    /// Apply pending schema migrations
    Migrate,
}

pub async fn handle_command(command: DbCommand, db: &Database) -> Result<()> {
    match command {
        DbCommand::Migrate => migrate(db).await,
    }
}

async fn migrate(db: &Database) -> Result<()> {
    sqlx::migrate!("../tracker/core/migrations")
        .run(db.get_pool())
        .await
        .context("Failed to run migrations")?;

    println!("{}", "Migrations applied.".green());
    Ok(())
}
