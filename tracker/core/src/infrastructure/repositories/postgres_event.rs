// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # PostgreSQL Agent Event Repository
//!
//! Append-only audit trail backed by the `agent_events` table. The
//! BIGSERIAL primary key is the per-store sequence; per-agent ordering
//! needs no cross-agent coordination.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::agent::AgentId;
use crate::domain::events::AgentEvent;
use crate::domain::repository::{AgentEventRepository, RepositoryError};

pub struct PostgresAgentEventRepository {
    pool: PgPool,
}

impl PostgresAgentEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn event_from_row(row: &PgRow) -> AgentEvent {
        AgentEvent {
            id: row.get("id"),
            agent_id: AgentId(row.get("agent_id")),
            event_type: row.get("event_type"),
            payload: row.get("payload"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl AgentEventRepository for PostgresAgentEventRepository {
    async fn append(
        &self,
        agent_id: AgentId,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<AgentEvent, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO agent_events (agent_id, event_type, payload)
            VALUES ($1, $2, $3)
            RETURNING id, agent_id, event_type, payload, created_at
            "#,
        )
        .bind(agent_id.0)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(Self::event_from_row(&row))
    }

    async fn list_for_agent(&self, agent_id: AgentId) -> Result<Vec<AgentEvent>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_id, event_type, payload, created_at
            FROM agent_events
            WHERE agent_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(agent_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.iter().map(Self::event_from_row).collect())
    }
}
