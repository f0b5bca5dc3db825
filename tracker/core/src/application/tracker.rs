// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Progress Tracker Application Service
//!
//! The narrow in-process API an external transport exposes to callers:
//! create workflow, transition workflow status, register agents, update
//! agent status/progress/metadata, list workflows, reconstruct the graph,
//! and read an agent's event timeline.
//!
//! Repository handles are passed explicitly at construction; lifecycle of
//! the underlying pool is owned by the process entry point, never by a
//! lazily-initialized singleton.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::application::error::TrackerError;
use crate::application::graph::GraphBuilder;
use crate::application::lifecycle::LifecycleManager;
use crate::application::recorder::EventRecorder;
use crate::domain::agent::{Agent, AgentId, AgentStatus, AgentUpdate, Progress};
use crate::domain::events::AgentEvent;
use crate::domain::graph::WorkflowGraph;
use crate::domain::repository::{AgentEventRepository, AgentRepository, WorkflowRepository};
use crate::domain::workflow::{
    Workflow, WorkflowFilter, WorkflowId, WorkflowStatus, WorkflowSummary,
};

/// Caller-facing request for a partial agent update
///
/// Progress is carried as a raw value here and validated before any write.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdateRequest {
    pub status: Option<AgentStatus>,
    pub progress: Option<i16>,
    pub metadata_patch: Option<HashMap<String, serde_json::Value>>,
}

pub struct ProgressTracker {
    workflows: Arc<dyn WorkflowRepository>,
    agents: Arc<dyn AgentRepository>,
    events: Arc<dyn AgentEventRepository>,
    lifecycle: LifecycleManager,
    recorder: EventRecorder,
    graph: GraphBuilder,
}

impl ProgressTracker {
    pub fn new(
        workflows: Arc<dyn WorkflowRepository>,
        agents: Arc<dyn AgentRepository>,
        events: Arc<dyn AgentEventRepository>,
    ) -> Self {
        let lifecycle = LifecycleManager::new(agents.clone());
        let recorder = EventRecorder::new(events.clone());
        let graph = GraphBuilder::new(workflows.clone(), agents.clone());
        Self {
            workflows,
            agents,
            events,
            lifecycle,
            recorder,
            graph,
        }
    }

    /// Create a workflow with default status `pending`
    pub async fn create_workflow(
        &self,
        name: impl Into<String>,
        project_name: Option<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Workflow, TrackerError> {
        let workflow = Workflow::new(name, project_name, metadata);
        self.workflows.create(&workflow).await?;
        info!("Created workflow {} ({})", workflow.name, workflow.id);
        Ok(workflow)
    }

    /// Explicitly transition a workflow's status.
    ///
    /// Status is advisory and never derived from agent state; the only
    /// engine behavior is the first-transition stamping of
    /// `started_at`/`completed_at`.
    pub async fn set_workflow_status(
        &self,
        id: WorkflowId,
        status: WorkflowStatus,
    ) -> Result<Workflow, TrackerError> {
        self.workflows
            .set_status(id, status)
            .await?
            .ok_or(TrackerError::WorkflowNotFound(id))
    }

    /// List workflows matching the filter, newest first, with per-status
    /// agent counts
    pub async fn list_workflows(
        &self,
        filter: WorkflowFilter,
    ) -> Result<Vec<WorkflowSummary>, TrackerError> {
        Ok(self.workflows.list(filter).await?)
    }

    /// Fetch one workflow
    pub async fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, TrackerError> {
        self.workflows
            .find_by_id(id)
            .await?
            .ok_or(TrackerError::WorkflowNotFound(id))
    }

    /// Register an agent against a workflow.
    ///
    /// Referential integrity is checked before any write: the workflow
    /// must exist, and a supplied parent must resolve to an existing agent
    /// in the same workflow.
    pub async fn create_agent(
        &self,
        workflow_id: WorkflowId,
        parent_id: Option<AgentId>,
        name: impl Into<String>,
        agent_type: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Agent, TrackerError> {
        if self.workflows.find_by_id(workflow_id).await?.is_none() {
            return Err(TrackerError::Validation(format!(
                "workflow {} does not exist",
                workflow_id
            )));
        }

        if let Some(parent_id) = parent_id {
            let parent = self
                .agents
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| {
                    TrackerError::Validation(format!("parent agent {} does not exist", parent_id))
                })?;
            if parent.workflow_id != workflow_id {
                return Err(TrackerError::Validation(format!(
                    "parent agent {} belongs to workflow {}, not {}",
                    parent_id, parent.workflow_id, workflow_id
                )));
            }
        }

        let agent = Agent::new(workflow_id, parent_id, name, agent_type, metadata);
        self.agents.create(&agent).await?;
        info!("Registered agent {} ({}) in workflow {}", agent.name, agent.id, workflow_id);

        self.recorder.agent_created(&agent).await;
        Ok(agent)
    }

    /// Fetch one agent
    pub async fn get_agent(&self, id: AgentId) -> Result<Agent, TrackerError> {
        self.agents
            .find_by_id(id)
            .await?
            .ok_or(TrackerError::AgentNotFound(id))
    }

    /// Apply a partial update to an agent.
    ///
    /// Validate-then-write: an out-of-range progress rejects the whole
    /// update before any mutation is attempted. An accepted status change
    /// is recorded in the audit trail after the update committed.
    pub async fn update_agent(
        &self,
        id: AgentId,
        request: AgentUpdateRequest,
    ) -> Result<Agent, TrackerError> {
        let progress = request.progress.map(Progress::new).transpose()?;
        let update = AgentUpdate {
            status: request.status,
            progress,
            metadata_patch: request.metadata_patch,
        };

        let transition = self.lifecycle.update_agent(id, update).await?;
        if transition.status_changed() {
            self.recorder.status_changed(&transition).await;
        }
        Ok(transition.agent)
    }

    /// Reconstruct the node/edge graph of a workflow's agents
    pub async fn workflow_graph(&self, id: WorkflowId) -> Result<WorkflowGraph, TrackerError> {
        self.graph.workflow_graph(id).await
    }

    /// The append-only event timeline of an agent, in sequence order
    pub async fn agent_events(&self, id: AgentId) -> Result<Vec<AgentEvent>, TrackerError> {
        if self.agents.find_by_id(id).await?.is_none() {
            return Err(TrackerError::AgentNotFound(id));
        }
        Ok(self.events.list_for_agent(id).await?)
    }
}
