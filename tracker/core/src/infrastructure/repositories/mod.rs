// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined
//! in the domain layer.
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! Production implementations backed by PostgreSQL:
//! - **PostgresWorkflowRepository** - workflows + summary listing
//! - **PostgresAgentRepository** - agents with atomic partial updates
//! - **PostgresAgentEventRepository** - append-only audit trail
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for testing and development, applying the
//! same stamping and merge rules in-process via `Agent::apply_update` /
//! `Workflow::apply_status`.

pub mod postgres_agent;
pub mod postgres_event;
pub mod postgres_workflow;

pub use postgres_agent::PostgresAgentRepository;
pub use postgres_event::PostgresAgentEventRepository;
pub use postgres_workflow::PostgresWorkflowRepository;

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::agent::{Agent, AgentId, AgentStatus, AgentUpdate};
use crate::domain::events::AgentEvent;
use crate::domain::repository::{
    AgentEventRepository, AgentRepository, RepositoryError, WorkflowRepository,
};
use crate::domain::workflow::{
    AgentStatusCounts, Workflow, WorkflowFilter, WorkflowId, WorkflowStatus, WorkflowSummary,
};

#[derive(Clone, Default)]
pub struct InMemoryWorkflowRepository {
    workflows: Arc<RwLock<HashMap<WorkflowId, Workflow>>>,
    agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the agent map with an `InMemoryAgentRepository` so listings
    /// can compute per-status counts
    pub fn with_agents(agents: Arc<RwLock<HashMap<AgentId, Agent>>>) -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
            agents,
        }
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn create(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let mut workflows = self.workflows.write().unwrap();
        workflows.insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>, RepositoryError> {
        let workflows = self.workflows.read().unwrap();
        Ok(workflows.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: WorkflowId,
        status: WorkflowStatus,
    ) -> Result<Option<Workflow>, RepositoryError> {
        let mut workflows = self.workflows.write().unwrap();
        Ok(workflows.get_mut(&id).map(|workflow| {
            workflow.apply_status(status, Utc::now());
            workflow.clone()
        }))
    }

    async fn list(&self, filter: WorkflowFilter) -> Result<Vec<WorkflowSummary>, RepositoryError> {
        let workflows = self.workflows.read().unwrap();
        let agents = self.agents.read().unwrap();

        let mut matching: Vec<Workflow> = workflows
            .values()
            .filter(|w| filter.status.map_or(true, |s| w.status == s))
            .filter(|w| {
                filter
                    .project_name
                    .as_deref()
                    .map_or(true, |p| w.project_name.as_deref() == Some(p))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matching
            .into_iter()
            .map(|workflow| {
                let mut counts = AgentStatusCounts::default();
                for agent in agents.values().filter(|a| a.workflow_id == workflow.id) {
                    match agent.status {
                        AgentStatus::Pending => counts.pending += 1,
                        AgentStatus::Running => counts.running += 1,
                        AgentStatus::Completed => counts.completed += 1,
                        AgentStatus::Failed => counts.failed += 1,
                    }
                }
                WorkflowSummary {
                    workflow,
                    agent_counts: counts,
                }
            })
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAgentRepository {
    agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agents(&self) -> Arc<RwLock<HashMap<AgentId, Agent>>> {
        self.agents.clone()
    }
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn create(&self, agent: &Agent) -> Result<(), RepositoryError> {
        let mut agents = self.agents.write().unwrap();
        if let Some(parent_id) = agent.parent_id {
            if !agents.contains_key(&parent_id) {
                return Err(RepositoryError::ForeignKey(format!(
                    "parent agent {} does not exist",
                    parent_id
                )));
            }
        }
        agents.insert(agent.id, agent.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError> {
        let agents = self.agents.read().unwrap();
        Ok(agents.get(&id).cloned())
    }

    async fn update(
        &self,
        id: AgentId,
        update: AgentUpdate,
    ) -> Result<Option<Agent>, RepositoryError> {
        // The write lock spans read-modify-write, matching the atomicity
        // of the single-statement PostgreSQL update.
        let mut agents = self.agents.write().unwrap();
        Ok(agents.get_mut(&id).map(|agent| {
            agent.apply_update(&update, Utc::now());
            agent.clone()
        }))
    }

    async fn list_for_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<Agent>, RepositoryError> {
        let agents = self.agents.read().unwrap();
        let mut matching: Vec<Agent> = agents
            .values()
            .filter(|a| a.workflow_id == workflow_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }
}

#[derive(Clone)]
pub struct InMemoryAgentEventRepository {
    events: Arc<RwLock<Vec<AgentEvent>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryAgentEventRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryAgentEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentEventRepository for InMemoryAgentEventRepository {
    async fn append(
        &self,
        agent_id: AgentId,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<AgentEvent, RepositoryError> {
        let event = AgentEvent {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            agent_id,
            event_type: event_type.to_string(),
            payload,
            created_at: Utc::now(),
        };
        let mut events = self.events.write().unwrap();
        events.push(event.clone());
        Ok(event)
    }

    async fn list_for_agent(&self, agent_id: AgentId) -> Result<Vec<AgentEvent>, RepositoryError> {
        let events = self.events.read().unwrap();
        Ok(events
            .iter()
            .filter(|e| e.agent_id == agent_id)
            .cloned()
            .collect())
    }
}
