// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # PostgreSQL Agent Repository
//!
//! Production `AgentRepository` implementation backed by the `agents`
//! table via `sqlx`. The partial update is ONE statement: status write,
//! progress write, first-transition timestamp stamping, and the jsonb
//! metadata merge (`metadata || $patch`) all commit together, so two
//! concurrent merges touching disjoint keys both survive and an
//! interrupted request can never leave a half-applied update.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::agent::{Agent, AgentId, AgentStatus, AgentUpdate, Progress};
use crate::domain::repository::{AgentRepository, RepositoryError};
use crate::domain::workflow::WorkflowId;

pub struct PostgresAgentRepository {
    pool: PgPool,
}

impl PostgresAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn agent_from_row(row: &PgRow) -> Result<Agent, RepositoryError> {
        let id: uuid::Uuid = row.get("id");
        let workflow_id: uuid::Uuid = row.get("workflow_id");
        let parent_id: Option<uuid::Uuid> = row.get("parent_id");
        let name: String = row.get("name");
        let agent_type: String = row.get("agent_type");
        let status_str: String = row.get("status");
        let progress: i16 = row.get("progress");
        let metadata_val: serde_json::Value = row.get("metadata");
        let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
        let started_at: Option<chrono::DateTime<chrono::Utc>> = row.get("started_at");
        let completed_at: Option<chrono::DateTime<chrono::Utc>> = row.get("completed_at");

        // The CHECK constraint keeps stored statuses well-formed
        let status = AgentStatus::parse(&status_str)
            .ok_or_else(|| RepositoryError::Database(format!("Bad stored status: {}", status_str)))?;

        // The CHECK constraint keeps stored progress in range
        let progress = Progress::new(progress)
            .map_err(|e| RepositoryError::Database(format!("Bad stored progress: {}", e)))?;

        let metadata = serde_json::from_value(metadata_val)
            .map_err(|e| RepositoryError::Serialization(format!("Bad agent metadata: {}", e)))?;

        Ok(Agent {
            id: AgentId(id),
            workflow_id: WorkflowId(workflow_id),
            parent_id: parent_id.map(AgentId),
            name,
            agent_type,
            status,
            progress,
            metadata,
            created_at,
            started_at,
            completed_at,
        })
    }
}

#[async_trait]
impl AgentRepository for PostgresAgentRepository {
    async fn create(&self, agent: &Agent) -> Result<(), RepositoryError> {
        let metadata_json = serde_json::to_value(&agent.metadata)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO agents (
                id, workflow_id, parent_id, name, agent_type,
                status, progress, metadata, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(agent.id.0)
        .bind(agent.workflow_id.0)
        .bind(agent.parent_id.map(|p| p.0))
        .bind(&agent.name)
        .bind(&agent.agent_type)
        .bind(agent.status.as_str())
        .bind(agent.progress.value())
        .bind(metadata_json)
        .bind(agent.created_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, workflow_id, parent_id, name, agent_type,
                   status, progress, metadata, created_at, started_at, completed_at
            FROM agents
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::agent_from_row(&r)).transpose()
    }

    async fn update(
        &self,
        id: AgentId,
        update: AgentUpdate,
    ) -> Result<Option<Agent>, RepositoryError> {
        let status = update.status.map(|s| s.as_str().to_string());
        let progress = update.progress.map(|p| p.value());
        let metadata_patch = update
            .metadata_patch
            .map(|patch| serde_json::to_value(patch))
            .transpose()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let row = sqlx::query(
            r#"
            UPDATE agents SET
                status = COALESCE($2::text, status),
                progress = COALESCE($3::smallint, progress),
                metadata = CASE
                    WHEN $4::jsonb IS NULL THEN metadata
                    ELSE metadata || $4::jsonb
                END,
                started_at = CASE
                    WHEN $2::text = 'running' THEN COALESCE(started_at, NOW())
                    ELSE started_at
                END,
                completed_at = CASE
                    WHEN $2::text IN ('completed', 'failed') THEN COALESCE(completed_at, NOW())
                    ELSE completed_at
                END
            WHERE id = $1
            RETURNING id, workflow_id, parent_id, name, agent_type,
                      status, progress, metadata, created_at, started_at, completed_at
            "#,
        )
        .bind(id.0)
        .bind(status)
        .bind(progress)
        .bind(metadata_patch)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::agent_from_row(&r)).transpose()
    }

    async fn list_for_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<Agent>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, workflow_id, parent_id, name, agent_type,
                   status, progress, metadata, created_at, started_at, completed_at
            FROM agents
            WHERE workflow_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workflow_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::agent_from_row).collect()
    }
}
