// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Workflow command implementations
//!
//! # Commands
//!
//! - `agent-progress workflow create <name>` - create a tracking workflow
//! - `agent-progress workflow status <id> <status>` - transition status
//! - `agent-progress workflow list` - list workflows with agent counts
//! - `agent-progress workflow show <id>` - render the agent graph

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use uuid::Uuid;

use agent_progress_core::infrastructure::db::Database;
use agent_progress_core::{
    AgentId, GraphNode, WorkflowFilter, WorkflowGraph, WorkflowId,
};

use super::{colorize_agent_status, colorize_workflow_status, parse_metadata, parse_workflow_status, tracker};

#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Create a new workflow
    Create {
        /// Workflow name
        #[arg(value_name = "NAME")]
        name: String,

        /// Project the workflow belongs to
        #[arg(long, value_name = "PROJECT")]
        project: Option<String>,

        /// Metadata (JSON object)
        #[arg(long, short = 'm', value_name = "JSON")]
        metadata: Option<String>,
    },

    /// Transition workflow status
    Status {
        /// Workflow ID
        #[arg(value_name = "WORKFLOW_ID")]
        id: Uuid,

        /// New status (pending, running, completed, failed)
        #[arg(value_name = "STATUS")]
        status: String,
    },

    /// List workflows with per-status agent counts
    List {
        /// Filter by status
        #[arg(long, short = 's', value_name = "STATUS")]
        status: Option<String>,

        /// Filter by project
        #[arg(long, short = 'p', value_name = "PROJECT")]
        project: Option<String>,
    },

    /// Show a workflow's agent graph
    Show {
        /// Workflow ID
        #[arg(value_name = "WORKFLOW_ID")]
        id: Uuid,

        /// Emit the raw graph as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: WorkflowCommand, db: &Database) -> Result<()> {
    match command {
        WorkflowCommand::Create {
            name,
            project,
            metadata,
        } => create_workflow(name, project, metadata, db).await,
        WorkflowCommand::Status { id, status } => set_status(id, status, db).await,
        WorkflowCommand::List { status, project } => list_workflows(status, project, db).await,
        WorkflowCommand::Show { id, json } => show_workflow(id, json, db).await,
    }
}

async fn create_workflow(
    name: String,
    project: Option<String>,
    metadata: Option<String>,
    db: &Database,
) -> Result<()> {
    let metadata = parse_metadata(metadata.as_deref())?;
    let workflow = tracker(db).create_workflow(name, project, metadata).await?;

    println!("{} {}", "Created workflow".green(), workflow.id);
    Ok(())
}

async fn set_status(id: Uuid, status: String, db: &Database) -> Result<()> {
    let status = parse_workflow_status(&status)?;
    let workflow = tracker(db)
        .set_workflow_status(WorkflowId(id), status)
        .await
        .context("Failed to transition workflow")?;

    println!(
        "Workflow {} is now {}",
        workflow.id,
        colorize_workflow_status(workflow.status)
    );
    Ok(())
}

async fn list_workflows(
    status: Option<String>,
    project: Option<String>,
    db: &Database,
) -> Result<()> {
    let filter = WorkflowFilter {
        status: status.as_deref().map(parse_workflow_status).transpose()?,
        project_name: project,
    };
    let summaries = tracker(db).list_workflows(filter).await?;

    if summaries.is_empty() {
        println!("{}", "No workflows found.".yellow());
        return Ok(());
    }

    for summary in summaries {
        let w = &summary.workflow;
        let counts = &summary.agent_counts;
        println!(
            "{}  {}  {}  agents: {} ({} pending, {} running, {} completed, {} failed)",
            w.id,
            colorize_workflow_status(w.status),
            w.name.bold(),
            counts.total(),
            counts.pending,
            counts.running,
            counts.completed,
            counts.failed,
        );
    }
    Ok(())
}

async fn show_workflow(id: Uuid, json: bool, db: &Database) -> Result<()> {
    let tracker = tracker(db);
    let workflow = tracker.get_workflow(WorkflowId(id)).await?;
    let graph = tracker.workflow_graph(workflow.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        workflow.name.bold(),
        graph.workflow_id,
        colorize_workflow_status(graph.workflow_status)
    );

    if graph.nodes.is_empty() {
        println!("  {}", "no agents".dimmed());
    } else {
        print_forest(&graph);
    }

    for warning in &graph.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    Ok(())
}

/// Render the agent forest root-down, one indented line per agent
fn print_forest(graph: &WorkflowGraph) {
    let nodes: HashMap<AgentId, &GraphNode> = graph.nodes.iter().map(|n| (n.id, n)).collect();
    let children = graph.children_by_parent();

    for root in graph.roots() {
        print_subtree(root, 0, &nodes, &children);
    }
}

fn print_subtree(
    id: AgentId,
    depth: usize,
    nodes: &HashMap<AgentId, &GraphNode>,
    children: &HashMap<AgentId, Vec<AgentId>>,
) {
    let Some(node) = nodes.get(&id) else {
        return;
    };

    println!(
        "{}{} [{}] {} {}% ({})",
        "  ".repeat(depth + 1),
        node.name.bold(),
        node.agent_type,
        colorize_agent_status(node.status),
        node.progress,
        node.id,
    );

    if let Some(child_ids) = children.get(&id) {
        for child in child_ids {
            print_subtree(*child, depth + 1, nodes, children);
        }
    }
}
