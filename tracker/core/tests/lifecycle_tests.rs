// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! Lifecycle and update-protocol tests, run against the in-memory
//! repositories through the full `ProgressTracker` service:
//! validate-then-write progress rejection, first-transition timestamp
//! stamping, metadata merge semantics under concurrent callers, and
//! not-found / referential-integrity failure modes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use agent_progress_core::domain::repository::{
    AgentEventRepository, AgentRepository, RepositoryError, WorkflowRepository,
};
use agent_progress_core::infrastructure::repositories::{
    InMemoryAgentEventRepository, InMemoryAgentRepository, InMemoryWorkflowRepository,
};
use agent_progress_core::{
    AgentEvent, AgentId, AgentStatus, AgentUpdateRequest, ProgressTracker, TrackerError,
    WorkflowId,
};

fn tracker() -> ProgressTracker {
    let agents = InMemoryAgentRepository::new();
    let workflows = InMemoryWorkflowRepository::with_agents(agents.agents());
    let events = InMemoryAgentEventRepository::new();

    let workflows: Arc<dyn WorkflowRepository> = Arc::new(workflows);
    let agents: Arc<dyn AgentRepository> = Arc::new(agents);
    let events: Arc<dyn AgentEventRepository> = Arc::new(events);
    ProgressTracker::new(workflows, agents, events)
}

fn status_update(status: AgentStatus) -> AgentUpdateRequest {
    AgentUpdateRequest {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn progress_out_of_range_is_rejected_without_mutation() {
    let tracker = tracker();
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();
    let agent = tracker
        .create_agent(workflow.id, None, "plan", "planner", HashMap::new())
        .await
        .unwrap();

    let result = tracker
        .update_agent(
            agent.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Running),
                progress: Some(101),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(TrackerError::Validation(_))));

    // The whole update was rejected: progress AND status are unchanged
    let unchanged = tracker.get_agent(agent.id).await.unwrap();
    assert_eq!(unchanged.progress.value(), 0);
    assert_eq!(unchanged.status, AgentStatus::Pending);
    assert!(unchanged.started_at.is_none());

    let negative = tracker
        .update_agent(
            agent.id,
            AgentUpdateRequest {
                progress: Some(-5),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(negative, Err(TrackerError::Validation(_))));
}

#[tokio::test]
async fn started_at_is_stamped_once_across_repeated_running_updates() {
    let tracker = tracker();
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();
    let agent = tracker
        .create_agent(workflow.id, None, "plan", "planner", HashMap::new())
        .await
        .unwrap();

    let first = tracker
        .update_agent(agent.id, status_update(AgentStatus::Running))
        .await
        .unwrap();
    let started_at = first.started_at.expect("started_at stamped");

    let second = tracker
        .update_agent(agent.id, status_update(AgentStatus::Running))
        .await
        .unwrap();
    assert_eq!(second.started_at, Some(started_at));
    assert!(second.completed_at.is_none());
}

#[tokio::test]
async fn completed_at_is_stamped_once_and_never_overwritten() {
    let tracker = tracker();
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();
    let agent = tracker
        .create_agent(workflow.id, None, "apply", "executor", HashMap::new())
        .await
        .unwrap();

    let completed = tracker
        .update_agent(agent.id, status_update(AgentStatus::Completed))
        .await
        .unwrap();
    let completed_at = completed.completed_at.expect("completed_at stamped");

    // A later (hypothetical) transition must not move the stamp
    let failed = tracker
        .update_agent(agent.id, status_update(AgentStatus::Failed))
        .await
        .unwrap();
    assert_eq!(failed.completed_at, Some(completed_at));
    assert_eq!(failed.status, AgentStatus::Failed);
}

#[tokio::test]
async fn metadata_merge_preserves_disjoint_keys_under_concurrency() {
    let tracker = Arc::new(tracker());
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();
    let agent = tracker
        .create_agent(workflow.id, None, "plan", "planner", HashMap::new())
        .await
        .unwrap();

    let patch = |key: &str, value: i64| {
        let mut map = HashMap::new();
        map.insert(key.to_string(), serde_json::json!(value));
        AgentUpdateRequest {
            metadata_patch: Some(map),
            ..Default::default()
        }
    };

    let a = {
        let tracker = tracker.clone();
        let id = agent.id;
        tokio::spawn(async move { tracker.update_agent(id, patch("a", 1)).await })
    };
    let b = {
        let tracker = tracker.clone();
        let id = agent.id;
        tokio::spawn(async move { tracker.update_agent(id, patch("b", 2)).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // Both keys survive regardless of interleaving
    let merged = tracker.get_agent(agent.id).await.unwrap();
    assert_eq!(merged.metadata.get("a"), Some(&serde_json::json!(1)));
    assert_eq!(merged.metadata.get("b"), Some(&serde_json::json!(2)));
}

/// Event store that rejects every append, standing in for an unavailable
/// audit table
struct FailingEventRepository;

#[async_trait]
impl AgentEventRepository for FailingEventRepository {
    async fn append(
        &self,
        _agent_id: AgentId,
        _event_type: &str,
        _payload: serde_json::Value,
    ) -> Result<AgentEvent, RepositoryError> {
        Err(RepositoryError::Database("event store unavailable".to_string()))
    }

    async fn list_for_agent(
        &self,
        _agent_id: AgentId,
    ) -> Result<Vec<AgentEvent>, RepositoryError> {
        Err(RepositoryError::Database("event store unavailable".to_string()))
    }
}

#[tokio::test]
async fn recorder_failure_never_fails_the_mutation() {
    let agents = InMemoryAgentRepository::new();
    let workflows = InMemoryWorkflowRepository::with_agents(agents.agents());
    let tracker = ProgressTracker::new(
        Arc::new(workflows),
        Arc::new(agents),
        Arc::new(FailingEventRepository),
    );

    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();
    let agent = tracker
        .create_agent(workflow.id, None, "plan", "planner", HashMap::new())
        .await
        .unwrap();

    let updated = tracker
        .update_agent(agent.id, status_update(AgentStatus::Running))
        .await
        .unwrap();
    assert_eq!(updated.status, AgentStatus::Running);
    assert!(updated.started_at.is_some());

    // The state change survived the recorder failure
    let fetched = tracker.get_agent(agent.id).await.unwrap();
    assert_eq!(fetched.status, AgentStatus::Running);
}

#[tokio::test]
async fn update_of_unknown_agent_is_not_found() {
    let tracker = tracker();
    let result = tracker
        .update_agent(AgentId::new(), status_update(AgentStatus::Running))
        .await;
    assert!(matches!(result, Err(TrackerError::AgentNotFound(_))));
}

#[tokio::test]
async fn create_agent_rejects_unknown_workflow() {
    let tracker = tracker();
    let result = tracker
        .create_agent(WorkflowId::new(), None, "plan", "planner", HashMap::new())
        .await;
    assert!(matches!(result, Err(TrackerError::Validation(_))));
}

#[tokio::test]
async fn create_agent_rejects_unknown_parent_without_creating() {
    let tracker = tracker();
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();

    let result = tracker
        .create_agent(
            workflow.id,
            Some(AgentId::new()),
            "child",
            "executor",
            HashMap::new(),
        )
        .await;
    assert!(matches!(result, Err(TrackerError::Validation(_))));

    // No agent was created
    let graph = tracker.workflow_graph(workflow.id).await.unwrap();
    assert!(graph.nodes.is_empty());
}

#[tokio::test]
async fn create_agent_rejects_parent_from_another_workflow() {
    let tracker = tracker();
    let wf_a = tracker
        .create_workflow("a", None, HashMap::new())
        .await
        .unwrap();
    let wf_b = tracker
        .create_workflow("b", None, HashMap::new())
        .await
        .unwrap();
    let parent = tracker
        .create_agent(wf_a.id, None, "root", "planner", HashMap::new())
        .await
        .unwrap();

    let result = tracker
        .create_agent(wf_b.id, Some(parent.id), "child", "executor", HashMap::new())
        .await;
    assert!(matches!(result, Err(TrackerError::Validation(_))));
}

#[tokio::test]
async fn partial_update_leaves_omitted_fields_untouched() {
    let tracker = tracker();
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();
    let agent = tracker
        .create_agent(workflow.id, None, "plan", "planner", HashMap::new())
        .await
        .unwrap();

    tracker
        .update_agent(agent.id, status_update(AgentStatus::Running))
        .await
        .unwrap();

    let progress_only = tracker
        .update_agent(
            agent.id,
            AgentUpdateRequest {
                progress: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(progress_only.status, AgentStatus::Running);
    assert_eq!(progress_only.progress.value(), 40);
}
