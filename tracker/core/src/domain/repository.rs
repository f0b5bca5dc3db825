// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate root, following the DDD
//! Repository pattern: one repository per aggregate, interface defined in
//! the domain layer, implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `WorkflowRepository` | `Workflow` | `InMemoryWorkflowRepository`, `PostgresWorkflowRepository` |
//! | `AgentRepository` | `Agent` | `InMemoryAgentRepository`, `PostgresAgentRepository` |
//! | `AgentEventRepository` | `AgentEvent` | `InMemoryAgentEventRepository`, `PostgresAgentEventRepository` |
//!
//! In-memory implementations are used for development and testing;
//! PostgreSQL implementations for production. All mutations are durable
//! before the call returns; there is no cross-call buffering.

use async_trait::async_trait;

use crate::domain::agent::{Agent, AgentId, AgentUpdate};
use crate::domain::events::AgentEvent;
use crate::domain::workflow::{
    Workflow, WorkflowFilter, WorkflowId, WorkflowStatus, WorkflowSummary,
};

/// Repository interface for Workflow aggregates
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Insert a newly created workflow
    async fn create(&self, workflow: &Workflow) -> Result<(), RepositoryError>;

    /// Find workflow by ID
    async fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>, RepositoryError>;

    /// Explicit caller-driven status transition with first-transition
    /// stamping of `started_at`/`completed_at`; returns the updated
    /// workflow, or None if the id does not resolve
    async fn set_status(
        &self,
        id: WorkflowId,
        status: WorkflowStatus,
    ) -> Result<Option<Workflow>, RepositoryError>;

    /// List workflows matching the filter, most-recently-created first,
    /// each with its per-status agent counts. An empty result is an empty
    /// list, not an error.
    async fn list(&self, filter: WorkflowFilter) -> Result<Vec<WorkflowSummary>, RepositoryError>;
}

/// Repository interface for Agent aggregates
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Insert a newly created agent
    async fn create(&self, agent: &Agent) -> Result<(), RepositoryError>;

    /// Find agent by ID
    async fn find_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError>;

    /// Apply a partial update as a single atomic operation.
    ///
    /// Omitted fields are untouched; the metadata patch is a server-side
    /// key-wise merge so concurrent patches touching disjoint keys both
    /// survive; `started_at`/`completed_at` stamping happens inside the
    /// same operation. Returns the updated snapshot, or None if the id
    /// does not resolve.
    async fn update(
        &self,
        id: AgentId,
        update: AgentUpdate,
    ) -> Result<Option<Agent>, RepositoryError>;

    /// List all agents of a workflow in creation order
    async fn list_for_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<Agent>, RepositoryError>;
}

/// Repository interface for the append-only AgentEvent audit trail
#[async_trait]
pub trait AgentEventRepository: Send + Sync {
    /// Append one event; the store assigns the sequence number
    async fn append(
        &self,
        agent_id: AgentId,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<AgentEvent, RepositoryError>;

    /// List all events of an agent in sequence order
    async fn list_for_agent(&self, agent_id: AgentId) -> Result<Vec<AgentEvent>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Referential integrity violation: {0}")]
    ForeignKey(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepositoryError::ForeignKey(db.to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
