// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Workflow Graph Reconstruction
//!
//! Projects a workflow's agents into a node/edge structure in O(n): one
//! pass over the agents, one edge per non-null parent pointer. No
//! traversal or cycle detection is needed because a parent must already
//! exist before a child referencing it can be created.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::application::error::TrackerError;
use crate::domain::graph::{GraphEdge, GraphNode, IntegrityWarning, WorkflowGraph};
use crate::domain::repository::{AgentRepository, WorkflowRepository};
use crate::domain::workflow::WorkflowId;

pub struct GraphBuilder {
    workflows: Arc<dyn WorkflowRepository>,
    agents: Arc<dyn AgentRepository>,
}

impl GraphBuilder {
    pub fn new(workflows: Arc<dyn WorkflowRepository>, agents: Arc<dyn AgentRepository>) -> Self {
        Self { workflows, agents }
    }

    /// Reconstruct the graph for a workflow.
    ///
    /// Fails fast with not-found if the workflow does not exist. A parent
    /// reference that does not resolve within the fetched set is surfaced
    /// as an integrity warning alongside the partial graph rather than
    /// silently dropped, so callers can tell the tree is incomplete.
    pub async fn workflow_graph(&self, id: WorkflowId) -> Result<WorkflowGraph, TrackerError> {
        let workflow = self
            .workflows
            .find_by_id(id)
            .await?
            .ok_or(TrackerError::WorkflowNotFound(id))?;

        let agents = self.agents.list_for_workflow(id).await?;

        let known: HashSet<_> = agents.iter().map(|a| a.id).collect();

        let mut edges = Vec::new();
        let mut warnings = Vec::new();
        for agent in &agents {
            if let Some(parent_id) = agent.parent_id {
                if !known.contains(&parent_id) {
                    let warning = IntegrityWarning::DanglingParent {
                        agent_id: agent.id,
                        parent_id,
                    };
                    warn!("Integrity warning in workflow {}: {}", id, warning);
                    warnings.push(warning);
                }
                edges.push(GraphEdge {
                    source: parent_id,
                    target: agent.id,
                });
            }
        }

        Ok(WorkflowGraph {
            workflow_id: workflow.id,
            workflow_status: workflow.status,
            nodes: agents.into_iter().map(GraphNode::from).collect(),
            edges,
            warnings,
        })
    }
}
