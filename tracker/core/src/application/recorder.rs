// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Event Recorder
//!
//! Appends one immutable audit record per lifecycle-significant action.
//! Recording happens after the underlying state change has been durably
//! applied, and a recorder failure must never roll back a state change
//! that already succeeded: events are best-effort audit, not a commit
//! gate. Failures are logged and swallowed.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::application::lifecycle::AgentTransition;
use crate::domain::agent::Agent;
use crate::domain::events::event_type;
use crate::domain::repository::AgentEventRepository;

pub struct EventRecorder {
    events: Arc<dyn AgentEventRepository>,
}

impl EventRecorder {
    pub fn new(events: Arc<dyn AgentEventRepository>) -> Self {
        Self { events }
    }

    /// Record agent creation
    pub async fn agent_created(&self, agent: &Agent) {
        let payload = json!({
            "name": agent.name,
            "agent_type": agent.agent_type,
            "parent_id": agent.parent_id,
            "workflow_id": agent.workflow_id,
        });

        if let Err(e) = self
            .events
            .append(agent.id, event_type::CREATED, payload)
            .await
        {
            warn!("Failed to record creation event for agent {}: {}", agent.id, e);
        }
    }

    /// Record an accepted status transition.
    ///
    /// The payload carries the previous and new status so the timeline is
    /// self-describing without joining against the agent's current state.
    pub async fn status_changed(&self, transition: &AgentTransition) {
        let agent = &transition.agent;
        let payload = json!({
            "previous_status": transition.previous_status,
            "new_status": agent.status,
            "progress": agent.progress,
        });

        if let Err(e) = self
            .events
            .append(agent.id, &event_type::status_change(agent.status), payload)
            .await
        {
            warn!("Failed to record status event for agent {}: {}", agent.id, e);
        }
    }
}
