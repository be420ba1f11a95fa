//! Diesel models for locally tracked workflow executions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{ExecutionId, ProfileId, TypeConstraintError};
use crate::domain::workflow::{
    ExecutionUpdate as DomainExecutionUpdate, NewWorkflowExecution as DomainNewWorkflowExecution,
    WorkflowExecution as DomainWorkflowExecution,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::workflow_executions)]
pub struct WorkflowExecution {
    pub id: i32,
    pub workflow_id: String,
    pub workflow_name: String,
    pub trigger_kind: String,
    pub external_id: Option<String>,
    pub status: String,
    pub payload: String, // JSON text
    pub result: Option<String>,
    pub error: Option<String>,
    pub triggered_by: i32,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::workflow_executions)]
pub struct NewWorkflowExecution<'a> {
    pub workflow_id: &'a str,
    pub workflow_name: &'a str,
    pub trigger_kind: &'a str,
    pub external_id: Option<&'a str>,
    pub status: &'a str,
    pub payload: String,
    pub error: Option<&'a str>,
    pub triggered_by: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::workflow_executions)]
pub struct ExecutionUpdate<'a> {
    pub status: &'a str,
    pub result: Option<String>,
    pub error: Option<&'a str>,
    pub finished_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<WorkflowExecution> for DomainWorkflowExecution {
    type Error = TypeConstraintError;

    fn try_from(execution: WorkflowExecution) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str(&execution.payload).unwrap_or_default();
        let result = execution
            .result
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());

        Ok(Self {
            id: ExecutionId::new(execution.id)?,
            workflow_id: execution.workflow_id,
            workflow_name: execution.workflow_name,
            trigger_kind: execution.trigger_kind.parse()?,
            external_id: execution.external_id,
            status: execution.status.parse()?,
            payload,
            result,
            error: execution.error,
            triggered_by: ProfileId::new(execution.triggered_by)?,
            started_at: execution.started_at,
            finished_at: execution.finished_at,
            updated_at: execution.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewWorkflowExecution> for NewWorkflowExecution<'a> {
    fn from(execution: &'a DomainNewWorkflowExecution) -> Self {
        Self {
            workflow_id: execution.workflow_id.as_str(),
            workflow_name: execution.workflow_name.as_str(),
            trigger_kind: execution.trigger_kind.as_str(),
            external_id: execution.external_id.as_deref(),
            status: execution.status.as_str(),
            payload: execution.payload.to_string(),
            error: execution.error.as_deref(),
            triggered_by: execution.triggered_by.get(),
        }
    }
}

impl<'a> ExecutionUpdate<'a> {
    pub fn from_domain(update: &'a DomainExecutionUpdate, updated_at: NaiveDateTime) -> Self {
        Self {
            status: update.status.as_str(),
            result: update.result.as_ref().map(|value| value.to_string()),
            error: update.error.as_deref(),
            finished_at: update.finished_at,
            updated_at,
        }
    }
}
