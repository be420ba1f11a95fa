use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::{ExecutionId, ExecutionStatus};
use crate::domain::workflow::{ExecutionUpdate, NewWorkflowExecution, WorkflowExecution};
use crate::models::workflow_execution::{
    ExecutionUpdate as DbExecutionUpdate, NewWorkflowExecution as DbNewWorkflowExecution,
    WorkflowExecution as DbWorkflowExecution,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, ExecutionListQuery, WorkflowExecutionReader, WorkflowExecutionWriter,
    into_domain, status_counts,
};

impl WorkflowExecutionReader for DieselRepository {
    fn get_execution_by_id(&self, id: ExecutionId) -> RepositoryResult<Option<WorkflowExecution>> {
        use crate::schema::workflow_executions;

        let mut conn = self.conn()?;

        let execution = workflow_executions::table
            .find(id.get())
            .first::<DbWorkflowExecution>(&mut conn)
            .optional()?;

        execution
            .map(WorkflowExecution::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_executions(
        &self,
        query: ExecutionListQuery,
    ) -> RepositoryResult<(usize, Vec<WorkflowExecution>)> {
        use crate::schema::workflow_executions;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = workflow_executions::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(workflow_id) = &query.workflow_id {
                items = items.filter(workflow_executions::workflow_id.eq(workflow_id.clone()));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_executions = items
            .order(workflow_executions::started_at.desc())
            .then_order_by(workflow_executions::id.desc())
            .load::<DbWorkflowExecution>(&mut conn)?;

        Ok((total, into_domain(db_executions)?))
    }

    fn list_active_executions(&self) -> RepositoryResult<Vec<WorkflowExecution>> {
        use crate::schema::workflow_executions;

        let mut conn = self.conn()?;

        let active: Vec<&str> = ExecutionStatus::ALL
            .iter()
            .filter(|status| !status.is_terminal())
            .map(|status| status.as_str())
            .collect();

        let db_executions = workflow_executions::table
            .filter(workflow_executions::status.eq_any(active))
            .order(workflow_executions::started_at.desc())
            .load::<DbWorkflowExecution>(&mut conn)?;

        into_domain(db_executions)
    }

    fn count_executions_by_status(&self) -> RepositoryResult<Vec<(ExecutionStatus, usize)>> {
        use crate::schema::workflow_executions;
        use diesel::dsl::count_star;

        let mut conn = self.conn()?;

        let rows = workflow_executions::table
            .group_by(workflow_executions::status)
            .select((workflow_executions::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;

        Ok(status_counts(rows))
    }
}

impl WorkflowExecutionWriter for DieselRepository {
    fn create_execution(
        &self,
        execution: &NewWorkflowExecution,
    ) -> RepositoryResult<WorkflowExecution> {
        use crate::schema::workflow_executions;

        let mut conn = self.conn()?;

        let db_new_execution: DbNewWorkflowExecution = execution.into();

        let db_execution = diesel::insert_into(workflow_executions::table)
            .values(&db_new_execution)
            .get_result::<DbWorkflowExecution>(&mut conn)?;

        WorkflowExecution::try_from(db_execution).map_err(RepositoryError::from)
    }

    fn update_execution(
        &self,
        id: ExecutionId,
        update: &ExecutionUpdate,
    ) -> RepositoryResult<WorkflowExecution> {
        use crate::schema::workflow_executions;

        let mut conn = self.conn()?;

        let changes = DbExecutionUpdate::from_domain(update, Utc::now().naive_utc());

        let db_execution = diesel::update(workflow_executions::table.find(id.get()))
            .set(&changes)
            .get_result::<DbWorkflowExecution>(&mut conn)?;

        WorkflowExecution::try_from(db_execution).map_err(RepositoryError::from)
    }
}
