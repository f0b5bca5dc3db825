//! Workflow Domain Model
//!
//! A workflow is a named top-level tracking session grouping a set of
//! related agents. Workflow status is advisory: callers transition it
//! explicitly and the tracker never derives it from agent state.
//!
//! # Architectural Context
//!
//! - **Bounded Context:** Tracking Context
//! - **Aggregate Root:** Workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a Workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub Uuid);

impl WorkflowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status, set explicitly by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(WorkflowStatus::Pending),
            "running" => Some(WorkflowStatus::Running),
            "completed" => Some(WorkflowStatus::Completed),
            "failed" => Some(WorkflowStatus::Failed),
            _ => None,
        }
    }

    /// Terminal statuses stamp `completed_at` on first entry
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow Aggregate Root
///
/// # Invariants
/// - Status is advisory (never derived from agent state)
/// - `started_at` is set at most once, on the first transition to running
/// - `completed_at` is set at most once, on the first terminal transition
/// - Workflows are never deleted by this core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub project_name: Option<String>,
    pub status: WorkflowStatus,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Workflow {
    pub fn new(
        name: impl Into<String>,
        project_name: Option<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: WorkflowId::new(),
            name: name.into(),
            project_name,
            status: WorkflowStatus::Pending,
            metadata,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Apply an explicit status transition with first-transition stamping.
    ///
    /// Entering `running` stamps `started_at` unless already set; entering
    /// a terminal status stamps `completed_at` unless already set.
    /// Re-applying a status is a no-op for the timestamps.
    pub fn apply_status(&mut self, status: WorkflowStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == WorkflowStatus::Running && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }
}

/// Filter for workflow listings
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub status: Option<WorkflowStatus>,
    pub project_name: Option<String>,
}

/// Per-status agent counts attached to a workflow listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatusCounts {
    pub pending: i64,
    pub running: i64,
    pub completed: i64,
    pub failed: i64,
}

impl AgentStatusCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.running + self.completed + self.failed
    }
}

/// Workflow plus its aggregate agent counts, as returned by listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub workflow: Workflow,
    pub agent_counts: AgentStatusCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_id_creation() {
        let id1 = WorkflowId::new();
        let id2 = WorkflowId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_workflow_defaults() {
        let workflow = Workflow::new("deploy-app", None, HashMap::new());
        assert_eq!(workflow.status, WorkflowStatus::Pending);
        assert!(workflow.started_at.is_none());
        assert!(workflow.completed_at.is_none());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            WorkflowStatus::Pending,
            WorkflowStatus::Running,
            WorkflowStatus::Completed,
            WorkflowStatus::Failed,
        ] {
            assert_eq!(WorkflowStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WorkflowStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_apply_status_stamps_once() {
        let mut workflow = Workflow::new("test", None, HashMap::new());

        let t1 = Utc::now();
        workflow.apply_status(WorkflowStatus::Running, t1);
        assert_eq!(workflow.started_at, Some(t1));

        let t2 = t1 + chrono::Duration::seconds(5);
        workflow.apply_status(WorkflowStatus::Running, t2);
        assert_eq!(workflow.started_at, Some(t1));

        workflow.apply_status(WorkflowStatus::Completed, t2);
        assert_eq!(workflow.completed_at, Some(t2));

        let t3 = t2 + chrono::Duration::seconds(5);
        workflow.apply_status(WorkflowStatus::Failed, t3);
        assert_eq!(workflow.completed_at, Some(t2));
    }
}
