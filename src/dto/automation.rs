use serde::{Deserialize, Serialize};

use crate::domain::workflow::{NodeResult, WorkflowExecution, WorkflowSummary};
use crate::pagination::Paginated;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub workflow_id: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AutomationPageData {
    pub workflows: Vec<WorkflowSummary>,
    /// Set when the engine could not be reached; the page still renders history.
    pub engine_error: Option<String>,
    pub active: Vec<WorkflowExecution>,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct HistoryPageData {
    pub executions: Paginated<WorkflowExecution>,
    pub workflow_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionView {
    pub execution: WorkflowExecution,
    pub nodes: Vec<NodeResult>,
}

#[derive(Debug, Serialize)]
pub struct AgentReply {
    pub session_id: String,
    pub reply: String,
}
