// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Tracker error taxonomy.
//!
//! Validation and not-found conditions are resolved entirely within this
//! crate and returned as typed results; storage failures propagate as-is
//! with no retry in the core (retry policy, if any, belongs to the
//! caller).

use crate::domain::agent::{AgentError, AgentId};
use crate::domain::repository::RepositoryError;
use crate::domain::workflow::WorkflowId;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl From<AgentError> for TrackerError {
    fn from(err: AgentError) -> Self {
        TrackerError::Validation(err.to_string())
    }
}
