// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end tracker scenarios: the full create-workflow → register
//! agents → report progress → reconstruct graph path, workflow listings
//! with per-status agent counts, and the per-agent audit timeline.

use std::collections::HashMap;
use std::sync::Arc;

use agent_progress_core::infrastructure::repositories::{
    InMemoryAgentEventRepository, InMemoryAgentRepository, InMemoryWorkflowRepository,
};
use agent_progress_core::{
    AgentId, AgentStatus, AgentUpdateRequest, GraphEdge, ProgressTracker, TrackerError,
    WorkflowFilter, WorkflowStatus,
};

fn tracker() -> ProgressTracker {
    let agents = InMemoryAgentRepository::new();
    let workflows = InMemoryWorkflowRepository::with_agents(agents.agents());
    let events = InMemoryAgentEventRepository::new();
    ProgressTracker::new(Arc::new(workflows), Arc::new(agents), Arc::new(events))
}

#[tokio::test]
async fn deploy_app_scenario() {
    let tracker = tracker();

    let workflow = tracker
        .create_workflow("deploy-app", None, HashMap::new())
        .await
        .unwrap();
    assert_eq!(workflow.status, WorkflowStatus::Pending);

    let plan = tracker
        .create_agent(workflow.id, None, "plan", "planner", HashMap::new())
        .await
        .unwrap();
    let apply = tracker
        .create_agent(workflow.id, Some(plan.id), "apply", "executor", HashMap::new())
        .await
        .unwrap();

    tracker
        .update_agent(
            plan.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Completed),
                progress: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    tracker
        .update_agent(
            apply.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Running),
                progress: Some(50),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let graph = tracker.workflow_graph(workflow.id).await.unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(
        graph.edges[0],
        GraphEdge {
            source: plan.id,
            target: apply.id
        }
    );

    let plan_node = graph.nodes.iter().find(|n| n.id == plan.id).unwrap();
    let apply_node = graph.nodes.iter().find(|n| n.id == apply.id).unwrap();
    assert!(plan_node.completed_at.is_some());
    assert_eq!(plan_node.progress.value(), 100);
    assert!(apply_node.started_at.is_some());
    assert!(apply_node.completed_at.is_none());
    assert_eq!(apply_node.progress.value(), 50);
}

#[tokio::test]
async fn list_workflows_filters_by_status_newest_first() {
    let tracker = tracker();

    let first = tracker
        .create_workflow("first", None, HashMap::new())
        .await
        .unwrap();
    // In-memory timestamps are close; nudge ordering apart
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = tracker
        .create_workflow("second", None, HashMap::new())
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let third = tracker
        .create_workflow("third", None, HashMap::new())
        .await
        .unwrap();

    tracker
        .set_workflow_status(first.id, WorkflowStatus::Completed)
        .await
        .unwrap();
    tracker
        .set_workflow_status(third.id, WorkflowStatus::Completed)
        .await
        .unwrap();

    let completed = tracker
        .list_workflows(WorkflowFilter {
            status: Some(WorkflowStatus::Completed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(completed.len(), 2);
    assert_eq!(completed[0].workflow.id, third.id);
    assert_eq!(completed[1].workflow.id, first.id);
    assert!(completed
        .iter()
        .all(|s| s.workflow.status == WorkflowStatus::Completed));

    // No match is an empty list, not an error
    let _ = second;
    let failed = tracker
        .list_workflows(WorkflowFilter {
            status: Some(WorkflowStatus::Failed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(failed.is_empty());
}

#[tokio::test]
async fn list_workflows_carries_agent_counts_and_project_filter() {
    let tracker = tracker();

    let workflow = tracker
        .create_workflow("indexed", Some("search".to_string()), HashMap::new())
        .await
        .unwrap();
    tracker
        .create_workflow("unrelated", Some("billing".to_string()), HashMap::new())
        .await
        .unwrap();

    let root = tracker
        .create_agent(workflow.id, None, "root", "planner", HashMap::new())
        .await
        .unwrap();
    let child = tracker
        .create_agent(workflow.id, Some(root.id), "child", "executor", HashMap::new())
        .await
        .unwrap();
    tracker
        .update_agent(
            child.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Running),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let summaries = tracker
        .list_workflows(WorkflowFilter {
            project_name: Some("search".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.workflow.id, workflow.id);
    assert_eq!(summary.agent_counts.pending, 1);
    assert_eq!(summary.agent_counts.running, 1);
    assert_eq!(summary.agent_counts.total(), 2);
}

#[tokio::test]
async fn workflow_status_transition_stamps_timestamps_once() {
    let tracker = tracker();
    let workflow = tracker
        .create_workflow("wf", None, HashMap::new())
        .await
        .unwrap();

    let running = tracker
        .set_workflow_status(workflow.id, WorkflowStatus::Running)
        .await
        .unwrap();
    let started_at = running.started_at.expect("started_at stamped");

    let completed = tracker
        .set_workflow_status(workflow.id, WorkflowStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.started_at, Some(started_at));
    assert!(completed.completed_at.is_some());
}

#[tokio::test]
async fn agent_timeline_records_creation_and_status_changes() {
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
        .update_agent(
            agent.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Running),
                progress: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Re-applying the same status is not a transition; no event
    tracker
        .update_agent(
            agent.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Running),
                progress: Some(60),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    tracker
        .update_agent(
            agent.id,
            AgentUpdateRequest {
                status: Some(AgentStatus::Completed),
                progress: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let events = tracker.agent_events(agent.id).await.unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["created", "status_running", "status_completed"]);

    // The status-change payload is self-describing
    let running = &events[1];
    assert_eq!(running.payload["previous_status"], "pending");
    assert_eq!(running.payload["new_status"], "running");

    // Sequence numbers are strictly increasing
    assert!(events.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn timeline_of_unknown_agent_is_not_found() {
    let tracker = tracker();
    let result = tracker.agent_events(AgentId::new()).await;
    assert!(matches!(result, Err(TrackerError::AgentNotFound(_))));
}
