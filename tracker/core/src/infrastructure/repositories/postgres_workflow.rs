// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # PostgreSQL Workflow Repository
//!
//! Production `WorkflowRepository` implementation backed by the
//! `workflows` table via `sqlx`. The listing query aggregates per-status
//! agent counts server-side with FILTER clauses so the summary is one
//! round trip.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::repository::{RepositoryError, WorkflowRepository};
use crate::domain::workflow::{
    AgentStatusCounts, Workflow, WorkflowFilter, WorkflowId, WorkflowStatus, WorkflowSummary,
};

pub struct PostgresWorkflowRepository {
    pool: PgPool,
}

impl PostgresWorkflowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn workflow_from_row(row: &PgRow) -> Result<Workflow, RepositoryError> {
        let id: uuid::Uuid = row.get("id");
        let name: String = row.get("name");
        let project_name: Option<String> = row.get("project_name");
        let status_str: String = row.get("status");
        let metadata_val: serde_json::Value = row.get("metadata");
        let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
        let started_at: Option<chrono::DateTime<chrono::Utc>> = row.get("started_at");
        let completed_at: Option<chrono::DateTime<chrono::Utc>> = row.get("completed_at");

        // The CHECK constraint keeps stored statuses well-formed
        let status = WorkflowStatus::parse(&status_str)
            .ok_or_else(|| RepositoryError::Database(format!("Bad stored status: {}", status_str)))?;

        let metadata = serde_json::from_value(metadata_val)
            .map_err(|e| RepositoryError::Serialization(format!("Bad workflow metadata: {}", e)))?;

        Ok(Workflow {
            id: WorkflowId(id),
            name,
            project_name,
            status,
            metadata,
            created_at,
            started_at,
            completed_at,
        })
    }
}

#[async_trait]
impl WorkflowRepository for PostgresWorkflowRepository {
    async fn create(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let metadata_json = serde_json::to_value(&workflow.metadata)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO workflows (id, name, project_name, status, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(workflow.id.0)
        .bind(&workflow.name)
        .bind(&workflow.project_name)
        .bind(workflow.status.as_str())
        .bind(metadata_json)
        .bind(workflow.created_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, project_name, status, metadata, created_at, started_at, completed_at
            FROM workflows
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::workflow_from_row(&r)).transpose()
    }

    async fn set_status(
        &self,
        id: WorkflowId,
        status: WorkflowStatus,
    ) -> Result<Option<Workflow>, RepositoryError> {
        // First-transition stamping happens in the same statement as the
        // status write so concurrent transitions cannot double-stamp.
        let row = sqlx::query(
            r#"
            UPDATE workflows SET
                status = $2,
                started_at = CASE
                    WHEN $2 = 'running' THEN COALESCE(started_at, NOW())
                    ELSE started_at
                END,
                completed_at = CASE
                    WHEN $2 IN ('completed', 'failed') THEN COALESCE(completed_at, NOW())
                    ELSE completed_at
                END
            WHERE id = $1
            RETURNING id, name, project_name, status, metadata, created_at, started_at, completed_at
            "#,
        )
        .bind(id.0)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::workflow_from_row(&r)).transpose()
    }

    async fn list(&self, filter: WorkflowFilter) -> Result<Vec<WorkflowSummary>, RepositoryError> {
        let status_filter = filter.status.map(|s| s.as_str().to_string());

        let rows = sqlx::query(
            r#"
            SELECT
                w.id, w.name, w.project_name, w.status, w.metadata,
                w.created_at, w.started_at, w.completed_at,
                COUNT(a.id) FILTER (WHERE a.status = 'pending')   AS pending_agents,
                COUNT(a.id) FILTER (WHERE a.status = 'running')   AS running_agents,
                COUNT(a.id) FILTER (WHERE a.status = 'completed') AS completed_agents,
                COUNT(a.id) FILTER (WHERE a.status = 'failed')    AS failed_agents
            FROM workflows w
            LEFT JOIN agents a ON a.workflow_id = w.id
            WHERE ($1::text IS NULL OR w.status = $1)
              AND ($2::text IS NULL OR w.project_name = $2)
            GROUP BY w.id
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(status_filter)
        .bind(filter.project_name)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let workflow = Self::workflow_from_row(&row)?;
            let agent_counts = AgentStatusCounts {
                pending: row.get("pending_agents"),
                running: row.get("running_agents"),
                completed: row.get("completed_agents"),
                failed: row.get("failed_agents"),
            };
            summaries.push(WorkflowSummary {
                workflow,
                agent_counts,
            });
        }
        Ok(summaries)
    }
}
