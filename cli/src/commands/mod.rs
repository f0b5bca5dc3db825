// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod db;
pub mod workflow;

pub use agent::AgentCommand;
pub use db::DbCommand;
pub use workflow::WorkflowCommand;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use agent_progress_core::infrastructure::db::Database;
use agent_progress_core::infrastructure::repositories::{
    PostgresAgentEventRepository, PostgresAgentRepository, PostgresWorkflowRepository,
};
use agent_progress_core::{AgentStatus, ProgressTracker, WorkflowStatus};

/// Wire a tracker onto the process-owned pool
pub fn tracker(db: &Database) -> ProgressTracker {
    let pool = db.get_pool().clone();
    ProgressTracker::new(
        Arc::new(PostgresWorkflowRepository::new(pool.clone())),
        Arc::new(PostgresAgentRepository::new(pool.clone())),
        Arc::new(PostgresAgentEventRepository::new(pool)),
    )
}

pub fn parse_metadata(raw: Option<&str>) -> Result<HashMap<String, serde_json::Value>> {
    match raw {
        Some(s) => serde_json::from_str(s).context("Metadata must be a JSON object"),
        None => Ok(HashMap::new()),
    }
}

pub fn parse_workflow_status(s: &str) -> Result<WorkflowStatus> {
    WorkflowStatus::parse(s)
        .with_context(|| format!("Unknown status '{}' (pending|running|completed|failed)", s))
}

pub fn parse_agent_status(s: &str) -> Result<AgentStatus> {
    AgentStatus::parse(s)
        .with_context(|| format!("Unknown status '{}' (pending|running|completed|failed)", s))
}

pub fn colorize_agent_status(status: AgentStatus) -> colored::ColoredString {
    match status {
        AgentStatus::Pending => status.as_str().yellow(),
        AgentStatus::Running => status.as_str().cyan(),
        AgentStatus::Completed => status.as_str().green(),
        AgentStatus::Failed => status.as_str().red(),
    }
}

pub fn colorize_workflow_status(status: WorkflowStatus) -> colored::ColoredString {
    match status {
        WorkflowStatus::Pending => status.as_str().yellow(),
        WorkflowStatus::Running => status.as_str().cyan(),
        WorkflowStatus::Completed => status.as_str().green(),
        WorkflowStatus::Failed => status.as_str().red(),
    }
}
