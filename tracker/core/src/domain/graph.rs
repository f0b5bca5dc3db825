//! Workflow Graph Value Objects
//!
//! The reconstructed parent/child structure of a workflow's agents: one
//! node per agent, one `{source: parent, target: child}` edge per agent
//! with a parent. Reconstruction is a projection of stored parent
//! pointers, not a graph search; see `application::graph`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::agent::{Agent, AgentId, AgentStatus, Progress};
use crate::domain::workflow::{WorkflowId, WorkflowStatus};

/// One node per agent, carrying everything a renderer needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: AgentId,
    pub name: String,
    pub agent_type: String,
    pub status: AgentStatus,
    pub progress: Progress,
    pub parent_id: Option<AgentId>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Agent> for GraphNode {
    fn from(agent: Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name,
            agent_type: agent.agent_type,
            status: agent.status,
            progress: agent.progress,
            parent_id: agent.parent_id,
            metadata: agent.metadata,
            created_at: agent.created_at,
            started_at: agent.started_at,
            completed_at: agent.completed_at,
        }
    }
}

/// Directed edge, parent → child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: AgentId,
    pub target: AgentId,
}

/// Non-fatal data-integrity finding reported alongside the graph
///
/// A dangling parent reference cannot happen while creation-time
/// referential integrity holds, but reconstruction still checks so that a
/// relaxed store never renders a silently incomplete tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    DanglingParent { agent_id: AgentId, parent_id: AgentId },
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityWarning::DanglingParent { agent_id, parent_id } => write!(
                f,
                "agent {} references parent {} which is not in this workflow",
                agent_id, parent_id
            ),
        }
    }
}

/// A workflow's agents projected into a renderable node/edge structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub workflow_id: WorkflowId,
    pub workflow_status: WorkflowStatus,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub warnings: Vec<IntegrityWarning>,
}

impl WorkflowGraph {
    /// Ids of the parentless agents, the roots of the rendered forest
    pub fn roots(&self) -> Vec<AgentId> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Child ids grouped by parent id, in node order
    pub fn children_by_parent(&self) -> HashMap<AgentId, Vec<AgentId>> {
        let mut children: HashMap<AgentId, Vec<AgentId>> = HashMap::new();
        for edge in &self.edges {
            children.entry(edge.source).or_default().push(edge.target);
        }
        children
    }
}
