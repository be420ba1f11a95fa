//! Client for the external workflow engine.
//!
//! The hub never runs workflows itself. It lists them, starts executions,
//! polls their state and proxies agent chat through [`WorkflowEngine`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::ExecutionStatus;
use crate::domain::workflow::{NodeResult, WorkflowNode, map_engine_status};

pub mod http;

pub use http::HttpWorkflowEngine;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow engine request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("workflow engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected workflow engine response: {0}")]
    InvalidResponse(String),

    #[error("invalid workflow engine url: {0}")]
    InvalidUrl(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Workflow definition as listed by the engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineWorkflow {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
}

/// Snapshot of an execution as reported by the engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineExecution {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub finished: bool,
    pub stopped_at: Option<String>,
    pub data: Option<Value>,
}

impl EngineExecution {
    pub fn local_status(&self) -> ExecutionStatus {
        if self.status.is_empty() && self.finished {
            return ExecutionStatus::Succeeded;
        }
        map_engine_status(&self.status)
    }

    pub fn stopped_at(&self) -> Option<NaiveDateTime> {
        self.stopped_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.naive_utc())
    }

    /// Error message of the failed node, if any.
    pub fn error_message(&self) -> Option<String> {
        self.data
            .as_ref()?
            .pointer("/resultData/error/message")?
            .as_str()
            .map(str::to_string)
    }

    /// Flattens `resultData.runData` into one entry per node run.
    pub fn node_results(&self) -> Vec<NodeResult> {
        let Some(Value::Object(run_data)) = self
            .data
            .as_ref()
            .and_then(|data| data.pointer("/resultData/runData"))
        else {
            return Vec::new();
        };

        let mut results: Vec<NodeResult> = run_data
            .iter()
            .flat_map(|(node, runs)| {
                runs.as_array()
                    .into_iter()
                    .flatten()
                    .map(move |run| node_result(node, run))
            })
            .collect();
        results.sort_by_key(|result| result.started_at.clone());
        results
    }
}

fn node_result(node: &str, run: &Value) -> NodeResult {
    let error = run
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string);
    let status = run
        .get("executionStatus")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| if error.is_some() { "error" } else { "success" }.to_string());

    NodeResult {
        node: node.to_string(),
        status,
        started_at: run
            .get("startTime")
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_millis)
            .map(|at| at.to_rfc3339()),
        duration_ms: run.get("executionTime").and_then(Value::as_u64),
        error,
    }
}

/// Engines report ids as strings or numbers depending on the version.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg_attr(feature = "test-mocks", mockall::automock)]
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    async fn list_workflows(&self) -> WorkflowResult<Vec<EngineWorkflow>>;

    /// Starts an execution and returns the engine's execution id.
    async fn run_workflow(&self, workflow_id: &str, payload: &Value) -> WorkflowResult<String>;

    async fn get_execution(&self, execution_id: &str) -> WorkflowResult<EngineExecution>;

    async fn stop_execution(&self, execution_id: &str) -> WorkflowResult<()>;

    /// Sends one message to a chat-triggered agent workflow and returns its reply.
    async fn chat(
        &self,
        workflow_id: &str,
        session_id: &str,
        message: &str,
    ) -> WorkflowResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn execution_ids_accept_numbers() {
        let execution: EngineExecution = serde_json::from_value(json!({
            "id": 1042,
            "status": "success",
            "finished": true,
            "stoppedAt": "2025-03-01T10:00:05.000Z"
        }))
        .unwrap();

        assert_eq!(execution.id, "1042");
        assert_eq!(execution.local_status(), ExecutionStatus::Succeeded);
        assert!(execution.stopped_at().is_some());
    }

    #[test]
    fn node_results_are_flattened_in_start_order() {
        let execution: EngineExecution = serde_json::from_value(json!({
            "id": "7",
            "status": "error",
            "data": {
                "resultData": {
                    "error": { "message": "HTTP 500" },
                    "runData": {
                        "Send mail": [
                            { "startTime": 1740823202000i64, "executionTime": 80,
                              "error": { "message": "HTTP 500" } }
                        ],
                        "Webhook": [
                            { "startTime": 1740823201000i64, "executionTime": 3,
                              "executionStatus": "success" }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        let nodes = execution.node_results();

        assert_eq!(execution.local_status(), ExecutionStatus::Failed);
        assert_eq!(execution.error_message().as_deref(), Some("HTTP 500"));
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].node, "Webhook");
        assert_eq!(nodes[1].status, "error");
        assert_eq!(nodes[1].duration_ms, Some(80));
    }
}
