// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent Lifecycle Manager
//!
//! Enforces the update protocol on top of the raw repository primitive:
//! validate-then-write (a progress value outside [0, 100] is rejected
//! before any mutation is attempted), not-found surfaced as a typed
//! error, and the previous→new status pair captured for the audit trail.
//!
//! The manager does not reject transitions such as pending → completed:
//! external callers are authoritative about what happened. The enforced
//! behavior is the timestamp side effect, applied atomically inside the
//! repository's single update operation.

use std::sync::Arc;

use crate::application::error::TrackerError;
use crate::domain::agent::{Agent, AgentId, AgentStatus, AgentUpdate};
use crate::domain::repository::AgentRepository;

/// Outcome of an accepted agent update
#[derive(Debug, Clone)]
pub struct AgentTransition {
    /// Status before the update was applied
    pub previous_status: AgentStatus,
    /// Agent snapshot after the update
    pub agent: Agent,
}

impl AgentTransition {
    /// Whether the update changed the agent's status
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.agent.status
    }
}

pub struct LifecycleManager {
    agents: Arc<dyn AgentRepository>,
}

impl LifecycleManager {
    pub fn new(agents: Arc<dyn AgentRepository>) -> Self {
        Self { agents }
    }

    /// Apply a partial update to an agent.
    ///
    /// The previous status is read before the write so the transition is
    /// self-describing for the event recorder. Under concurrent writers
    /// the previous status is best-effort (last write wins per the
    /// ordering model); the stamping itself is race-free because it
    /// happens inside the repository's atomic update.
    pub async fn update_agent(
        &self,
        id: AgentId,
        update: AgentUpdate,
    ) -> Result<AgentTransition, TrackerError> {
        let previous = self
            .agents
            .find_by_id(id)
            .await?
            .ok_or(TrackerError::AgentNotFound(id))?;

        // An empty update is a no-op; skip the write
        if update.is_empty() {
            let previous_status = previous.status;
            return Ok(AgentTransition {
                previous_status,
                agent: previous,
            });
        }

        let agent = self
            .agents
            .update(id, update)
            .await?
            .ok_or(TrackerError::AgentNotFound(id))?;

        Ok(AgentTransition {
            previous_status: previous.status,
            agent,
        })
    }
}
