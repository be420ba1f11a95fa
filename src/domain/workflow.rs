//! Workflows live in the external automation engine; this module holds what
//! the hub knows about them locally.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{ExecutionId, ExecutionStatus, ProfileId, TriggerKind};

/// Node of a workflow graph as reported by the engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

/// Workflow listed in the automation hub.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub trigger: TriggerKind,
}

/// Classifies a workflow by the first trigger-like node in its graph.
pub fn classify_trigger(nodes: &[WorkflowNode]) -> TriggerKind {
    let Some(node_type) = nodes
        .iter()
        .map(|node| node.node_type.to_ascii_lowercase())
        .find(|t| t.contains("trigger") || t.contains("webhook") || t.contains("cron"))
    else {
        return TriggerKind::Manual;
    };

    if node_type.contains("chattrigger") {
        TriggerKind::Chat
    } else if node_type.contains("webhook") {
        TriggerKind::Webhook
    } else if node_type.contains("schedule") || node_type.contains("cron") {
        TriggerKind::Schedule
    } else if node_type.contains("manualtrigger") {
        TriggerKind::Manual
    } else {
        TriggerKind::Event
    }
}

/// Per-node outcome inside an execution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeResult {
    pub node: String,
    pub status: String,
    pub started_at: Option<String>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

/// Locally tracked execution of an engine workflow.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkflowExecution {
    pub id: ExecutionId,
    pub workflow_id: String,
    pub workflow_name: String,
    pub trigger_kind: TriggerKind,
    /// Execution id assigned by the engine.
    pub external_id: Option<String>,
    pub status: ExecutionStatus,
    pub payload: Value,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub triggered_by: ProfileId,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewWorkflowExecution {
    pub workflow_id: String,
    pub workflow_name: String,
    pub trigger_kind: TriggerKind,
    pub external_id: Option<String>,
    pub status: ExecutionStatus,
    pub payload: Value,
    pub error: Option<String>,
    pub triggered_by: ProfileId,
}

/// Status refresh applied after polling the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionUpdate {
    pub status: ExecutionStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub finished_at: Option<NaiveDateTime>,
}

/// Maps the engine's status vocabulary onto local states.
pub fn map_engine_status(status: &str) -> ExecutionStatus {
    match status.to_ascii_lowercase().as_str() {
        "success" | "succeeded" => ExecutionStatus::Succeeded,
        "error" | "failed" | "crashed" => ExecutionStatus::Failed,
        "canceled" | "cancelled" | "stopped" => ExecutionStatus::Canceled,
        "waiting" => ExecutionStatus::Waiting,
        _ => ExecutionStatus::Running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_type: &str) -> WorkflowNode {
        WorkflowNode {
            name: node_type.to_string(),
            node_type: node_type.to_string(),
        }
    }

    #[test]
    fn classifies_common_trigger_nodes() {
        assert_eq!(
            classify_trigger(&[node("n8n-nodes-base.webhook"), node("n8n-nodes-base.set")]),
            TriggerKind::Webhook
        );
        assert_eq!(
            classify_trigger(&[node("n8n-nodes-base.scheduleTrigger")]),
            TriggerKind::Schedule
        );
        assert_eq!(classify_trigger(&[node("n8n-nodes-base.cron")]), TriggerKind::Schedule);
        assert_eq!(
            classify_trigger(&[node("@n8n/n8n-nodes-langchain.chatTrigger")]),
            TriggerKind::Chat
        );
        assert_eq!(
            classify_trigger(&[node("n8n-nodes-base.manualTrigger")]),
            TriggerKind::Manual
        );
        assert_eq!(
            classify_trigger(&[node("n8n-nodes-base.gmailTrigger")]),
            TriggerKind::Event
        );
    }

    #[test]
    fn workflows_without_trigger_are_manual() {
        assert_eq!(classify_trigger(&[node("n8n-nodes-base.set")]), TriggerKind::Manual);
        assert_eq!(classify_trigger(&[]), TriggerKind::Manual);
    }

    #[test]
    fn engine_statuses_map_to_local_states() {
        assert_eq!(map_engine_status("success"), ExecutionStatus::Succeeded);
        assert_eq!(map_engine_status("crashed"), ExecutionStatus::Failed);
        assert_eq!(map_engine_status("canceled"), ExecutionStatus::Canceled);
        assert_eq!(map_engine_status("waiting"), ExecutionStatus::Waiting);
        assert_eq!(map_engine_status("new"), ExecutionStatus::Running);
    }
}
