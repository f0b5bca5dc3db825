// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent Domain Model
//!
//! An agent is a recorded unit of work belonging to exactly one workflow
//! and at most one parent agent. Parent pointers form a forest per
//! workflow: a parent must exist before a child referencing it can be
//! created, so cycles are structurally impossible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::workflow::WorkflowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent lifecycle status
///
/// `pending` (initial) → `running` → {`completed`, `failed`}. Transitions
/// are not rejected (external callers are authoritative about what
/// happened); the enforced behavior is the timestamp side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Pending => "pending",
            AgentStatus::Running => "running",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AgentStatus::Pending),
            "running" => Some(AgentStatus::Running),
            "completed" => Some(AgentStatus::Completed),
            "failed" => Some(AgentStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Completed | AgentStatus::Failed)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress value constrained to the inclusive range [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(i16);

impl Progress {
    /// Create a new Progress with range validation
    pub fn new(value: i16) -> Result<Self, AgentError> {
        if !(0..=100).contains(&value) {
            return Err(AgentError::ProgressOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent Aggregate Root
///
/// # Invariants
/// - `workflow_id` and `parent_id` are immutable after creation
/// - `progress` always satisfies 0 ≤ progress ≤ 100
/// - `started_at` is set at most once, on the first transition to running
/// - `completed_at` is set at most once, on the first terminal transition
/// - Metadata updates are key-wise merges, never replacement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub workflow_id: WorkflowId,
    pub parent_id: Option<AgentId>,
    pub name: String,
    pub agent_type: String,
    pub status: AgentStatus,
    pub progress: Progress,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Agent {
    pub fn new(
        workflow_id: WorkflowId,
        parent_id: Option<AgentId>,
        name: impl Into<String>,
        agent_type: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: AgentId::new(),
            workflow_id,
            parent_id,
            name: name.into(),
            agent_type: agent_type.into(),
            status: AgentStatus::Pending,
            progress: Progress::zero(),
            metadata,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Apply a partial update with first-transition timestamp stamping.
    ///
    /// This is the single in-process definition of the update semantics;
    /// the PostgreSQL repository expresses the same rules in one SQL
    /// statement. Omitted fields are left untouched, the metadata patch is
    /// a key-wise merge (new values overwrite old values for the same
    /// key), and re-applying a status is a no-op for the timestamps.
    pub fn apply_update(&mut self, update: &AgentUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
            if status == AgentStatus::Running && self.started_at.is_none() {
                self.started_at = Some(now);
            }
            if status.is_terminal() && self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if let Some(patch) = &update.metadata_patch {
            for (key, value) in patch {
                self.metadata.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Partial update request for an agent
///
/// Fields left as `None` are untouched by the update.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub status: Option<AgentStatus>,
    pub progress: Option<Progress>,
    pub metadata_patch: Option<HashMap<String, serde_json::Value>>,
}

impl AgentUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.progress.is_none() && self.metadata_patch.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(i16),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_with_status(status: AgentStatus) -> AgentUpdate {
        AgentUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        for status in [
            AgentStatus::Pending,
            AgentStatus::Running,
            AgentStatus::Completed,
            AgentStatus::Failed,
        ] {
            assert_eq!(AgentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AgentStatus::parse("cancelled"), None);
        assert_eq!(AgentStatus::parse("Running"), None);
    }

    #[test]
    fn test_progress_validation() {
        assert!(Progress::new(0).is_ok());
        assert!(Progress::new(100).is_ok());
        assert!(Progress::new(-1).is_err());
        assert!(Progress::new(101).is_err());
    }

    #[test]
    fn test_new_agent_defaults() {
        let agent = Agent::new(WorkflowId::new(), None, "plan", "planner", HashMap::new());
        assert_eq!(agent.status, AgentStatus::Pending);
        assert_eq!(agent.progress.value(), 0);
        assert!(agent.started_at.is_none());
        assert!(agent.completed_at.is_none());
    }

    #[test]
    fn test_started_at_stamped_once() {
        let mut agent = Agent::new(WorkflowId::new(), None, "plan", "planner", HashMap::new());

        let t1 = Utc::now();
        agent.apply_update(&update_with_status(AgentStatus::Running), t1);
        assert_eq!(agent.started_at, Some(t1));

        let t2 = t1 + chrono::Duration::seconds(10);
        agent.apply_update(&update_with_status(AgentStatus::Running), t2);
        assert_eq!(agent.started_at, Some(t1));
    }

    #[test]
    fn test_completed_at_stamped_once() {
        let mut agent = Agent::new(WorkflowId::new(), None, "plan", "planner", HashMap::new());

        let t1 = Utc::now();
        agent.apply_update(&update_with_status(AgentStatus::Completed), t1);
        assert_eq!(agent.completed_at, Some(t1));

        // Hypothetical later transition must not move the stamp
        let t2 = t1 + chrono::Duration::seconds(10);
        agent.apply_update(&update_with_status(AgentStatus::Failed), t2);
        assert_eq!(agent.completed_at, Some(t1));
    }

    #[test]
    fn test_pending_to_completed_skips_started_at() {
        // Direct pending → completed is allowed; only completed_at fires
        let mut agent = Agent::new(WorkflowId::new(), None, "plan", "planner", HashMap::new());
        agent.apply_update(&update_with_status(AgentStatus::Completed), Utc::now());
        assert!(agent.started_at.is_none());
        assert!(agent.completed_at.is_some());
    }

    #[test]
    fn test_metadata_patch_is_a_merge() {
        let mut agent = Agent::new(WorkflowId::new(), None, "plan", "planner", HashMap::new());

        let mut first = HashMap::new();
        first.insert("a".to_string(), serde_json::json!(1));
        agent.apply_update(
            &AgentUpdate {
                metadata_patch: Some(first),
                ..Default::default()
            },
            Utc::now(),
        );

        let mut second = HashMap::new();
        second.insert("b".to_string(), serde_json::json!(2));
        agent.apply_update(
            &AgentUpdate {
                metadata_patch: Some(second),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(agent.metadata.get("a"), Some(&serde_json::json!(1)));
        assert_eq!(agent.metadata.get("b"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_empty_update_touches_nothing() {
        let mut agent = Agent::new(WorkflowId::new(), None, "plan", "planner", HashMap::new());
        let before = agent.clone();
        agent.apply_update(&AgentUpdate::default(), Utc::now());
        assert_eq!(agent.status, before.status);
        assert_eq!(agent.progress, before.progress);
        assert_eq!(agent.started_at, before.started_at);
    }
}
