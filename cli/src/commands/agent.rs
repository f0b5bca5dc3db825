// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent command implementations
//!
//! # Commands
//!
//! - `agent-progress agent create <workflow_id> <name>` - register an agent
//! - `agent-progress agent update <id>` - report status/progress/metadata
//! - `agent-progress agent events <id>` - print the audit timeline

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use uuid::Uuid;

use agent_progress_core::infrastructure::db::Database;
use agent_progress_core::{AgentId, AgentUpdateRequest, WorkflowId};

use super::{colorize_agent_status, parse_agent_status, parse_metadata, tracker};

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Register an agent against a workflow
    Create {
        /// Owning workflow ID
        #[arg(value_name = "WORKFLOW_ID")]
        workflow_id: Uuid,

        /// Agent name
        #[arg(value_name = "NAME")]
        name: String,

        /// Agent type tag (e.g. planner, executor)
        #[arg(long, short = 't', default_value = "worker", value_name = "TYPE")]
        agent_type: String,

        /// Parent agent ID
        #[arg(long, value_name = "AGENT_ID")]
        parent: Option<Uuid>,

        /// Metadata (JSON object)
        #[arg(long, short = 'm', value_name = "JSON")]
        metadata: Option<String>,
    },

    /// Apply a partial update to an agent
    Update {
        /// Agent ID
        #[arg(value_name = "AGENT_ID")]
        id: Uuid,

        /// New status (pending, running, completed, failed)
        #[arg(long, short = 's', value_name = "STATUS")]
        status: Option<String>,

        /// Progress in [0, 100]
        #[arg(long, short = 'p', value_name = "PERCENT")]
        progress: Option<i16>,

        /// Metadata patch (JSON object, merged key-wise)
        #[arg(long, short = 'm', value_name = "JSON")]
        metadata: Option<String>,
    },

    /// Print an agent's event timeline
    Events {
        /// Agent ID
        #[arg(value_name = "AGENT_ID")]
        id: Uuid,
    },
}

pub async fn handle_command(command: AgentCommand, db: &Database) -> Result<()> {
    match command {
        AgentCommand::Create {
            workflow_id,
            name,
            agent_type,
            parent,
            metadata,
        } => create_agent(workflow_id, name, agent_type, parent, metadata, db).await,
        AgentCommand::Update {
            id,
            status,
            progress,
            metadata,
        } => update_agent(id, status, progress, metadata, db).await,
        AgentCommand::Events { id } => list_events(id, db).await,
    }
}

async fn create_agent(
    workflow_id: Uuid,
    name: String,
    agent_type: String,
    parent: Option<Uuid>,
    metadata: Option<String>,
    db: &Database,
) -> Result<()> {
    let metadata = parse_metadata(metadata.as_deref())?;
    let agent = tracker(db)
        .create_agent(
            WorkflowId(workflow_id),
            parent.map(AgentId),
            name,
            agent_type,
            metadata,
        )
        .await?;

    println!("{} {}", "Registered agent".green(), agent.id);
    Ok(())
}

async fn update_agent(
    id: Uuid,
    status: Option<String>,
    progress: Option<i16>,
    metadata: Option<String>,
    db: &Database,
) -> Result<()> {
    let request = AgentUpdateRequest {
        status: status.as_deref().map(parse_agent_status).transpose()?,
        progress,
        metadata_patch: metadata
            .as_deref()
            .map(|m| parse_metadata(Some(m)))
            .transpose()?,
    };

    let agent = tracker(db).update_agent(AgentId(id), request).await?;
    println!(
        "Agent {} is {} at {}%",
        agent.id,
        colorize_agent_status(agent.status),
        agent.progress,
    );
    Ok(())
}

async fn list_events(id: Uuid, db: &Database) -> Result<()> {
    let tracker = tracker(db);
    let agent = tracker.get_agent(AgentId(id)).await?;
    let events = tracker.agent_events(agent.id).await?;

    println!(
        "{} [{}] {}",
        agent.name.bold(),
        agent.agent_type,
        colorize_agent_status(agent.status),
    );

    if events.is_empty() {
        println!("{}", "No events recorded.".yellow());
        return Ok(());
    }

    for event in events {
        println!(
            "{}  {}  {}  {}",
            event.id,
            event.created_at.format("%Y-%m-%d %H:%M:%S"),
            event.event_type.bold(),
            event.payload,
        );
    }
    Ok(())
}
