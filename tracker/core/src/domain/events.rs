// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent Event Audit Records
//!
//! One immutable event per lifecycle-significant action on an agent
//! (creation and every accepted status change). Events are never mutated
//! or deleted; the per-agent sequence is sufficient to reconstruct the
//! agent's history without joining against its current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::{AgentId, AgentStatus};

/// Append-only audit record for a single agent lifecycle action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Monotonically increasing sequence number assigned by the store
    pub id: i64,
    pub agent_id: AgentId,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Well-known event type tags
pub mod event_type {
    use super::AgentStatus;

    pub const CREATED: &str = "created";

    /// Event type for a status transition, e.g. "status_running"
    pub fn status_change(status: AgentStatus) -> String {
        format!("status_{}", status.as_str())
    }
}
