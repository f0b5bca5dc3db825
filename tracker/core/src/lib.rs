// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # agent-progress-core
//!
//! Core domain, lifecycle rules, audit trail, and graph reconstruction
//! for the agent-progress tracker: a concurrency-safe progress ledger for
//! hierarchically related units of work ("agents") grouped into named
//! workflows, with the parent/child graph reconstructed by projection for
//! inspection and visualization.
//!
//! Layered the usual way: `domain` (entities, value objects, repository
//! contracts), `application` (tracker service, lifecycle manager, event
//! recorder, graph builder), `infrastructure` (PostgreSQL and in-memory
//! repositories, pool wrapper).

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::error::TrackerError;
pub use application::tracker::{AgentUpdateRequest, ProgressTracker};
pub use domain::agent::{Agent, AgentId, AgentStatus, AgentUpdate, Progress};
pub use domain::events::AgentEvent;
pub use domain::graph::{GraphEdge, GraphNode, IntegrityWarning, WorkflowGraph};
pub use domain::workflow::{
    AgentStatusCounts, Workflow, WorkflowFilter, WorkflowId, WorkflowStatus, WorkflowSummary,
};
