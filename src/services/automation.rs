//! Automation hub: workflows run in the external engine, executions are
//! mirrored locally so history survives engine restarts.

use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::domain::types::{ExecutionId, ExecutionStatus, TriggerKind};
use crate::domain::user_profile::UserProfile;
use crate::domain::workflow::{
    ExecutionUpdate, NewWorkflowExecution, NodeResult, WorkflowExecution, WorkflowSummary,
    classify_trigger,
};
use crate::dto::automation::{
    AgentReply, AutomationPageData, ExecutionView, HistoryPageData, HistoryQuery,
};
use crate::forms::FormError;
use crate::forms::automation::{AgentChatForm, TriggerWorkflowForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ExecutionListQuery, WorkflowExecutionReader, WorkflowExecutionWriter};
use crate::services::access::ensure_staff;
use crate::services::{ServiceError, ServiceResult, log_failure};
use crate::workflow::{EngineExecution, EngineWorkflow, WorkflowEngine};

fn summarize(workflow: EngineWorkflow) -> WorkflowSummary {
    WorkflowSummary {
        trigger: classify_trigger(&workflow.nodes),
        id: workflow.id,
        name: workflow.name,
        active: workflow.active,
    }
}

/// Node results stored under `result.nodes` by [`execution_update`].
pub fn stored_nodes(execution: &WorkflowExecution) -> Vec<NodeResult> {
    execution
        .result
        .as_ref()
        .and_then(|result| result.get("nodes"))
        .and_then(|nodes| serde_json::from_value(nodes.clone()).ok())
        .unwrap_or_default()
}

/// Builds the local update from an engine snapshot. Terminal executions
/// without a stop time are stamped with the current time.
pub fn execution_update(snapshot: &EngineExecution) -> ExecutionUpdate {
    let status = snapshot.local_status();
    let result = serde_json::to_value(snapshot.node_results())
        .ok()
        .map(|nodes| json!({ "nodes": nodes }));
    let finished_at = status
        .is_terminal()
        .then(|| snapshot.stopped_at().unwrap_or_else(|| Utc::now().naive_utc()));

    ExecutionUpdate {
        status,
        result,
        error: snapshot.error_message(),
        finished_at,
    }
}

/// Lists engine workflows plus running executions. An unreachable engine
/// leaves the workflow list empty instead of failing the page.
pub async fn load_automation_page<R, E>(
    repo: &R,
    engine: &E,
    actor: &UserProfile,
    poll_interval_secs: u64,
) -> ServiceResult<AutomationPageData>
where
    R: WorkflowExecutionReader + ?Sized,
    E: WorkflowEngine + ?Sized,
{
    ensure_staff(actor)?;

    let (workflows, engine_error) = match engine.list_workflows().await {
        Ok(workflows) => (workflows.into_iter().map(summarize).collect(), None),
        Err(err) => {
            log::warn!("Failed to list workflows: {err}");
            (Vec::new(), Some(err.to_string()))
        }
    };

    let active = repo
        .list_active_executions()
        .map_err(log_failure("Failed to list active executions"))?;

    Ok(AutomationPageData {
        workflows,
        engine_error,
        active,
        poll_interval_secs,
    })
}

/// Starts a workflow and records the execution. A failed start is still
/// recorded, as `failed`, before the error is returned.
pub async fn trigger_workflow<R, E>(
    repo: &R,
    engine: &E,
    actor: &UserProfile,
    form: TriggerWorkflowForm,
) -> ServiceResult<WorkflowExecution>
where
    R: WorkflowExecutionWriter + ?Sized,
    E: WorkflowEngine + ?Sized,
{
    ensure_staff(actor)?;

    form.validate().map_err(FormError::from)?;
    let payload = form.payload()?;

    let workflow = engine
        .list_workflows()
        .await
        .map_err(log_failure("Failed to list workflows"))?
        .into_iter()
        .map(summarize)
        .find(|workflow| workflow.id == form.workflow_id)
        .ok_or(ServiceError::NotFound)?;

    let started = engine.run_workflow(&workflow.id, &payload).await;

    let new_execution = |status, external_id, error| NewWorkflowExecution {
        workflow_id: workflow.id.clone(),
        workflow_name: workflow.name.clone(),
        trigger_kind: workflow.trigger,
        external_id,
        status,
        payload: payload.clone(),
        error,
        triggered_by: actor.id,
    };

    match started {
        Ok(external_id) => {
            let execution = repo
                .create_execution(&new_execution(ExecutionStatus::Running, Some(external_id), None))
                .map_err(log_failure("Failed to record execution"))?;
            log::info!(
                "{} started workflow {} as execution {}",
                actor.email,
                workflow.name,
                execution.id
            );
            Ok(execution)
        }
        Err(err) => {
            log::error!("Failed to start workflow {}: {err}", workflow.id);
            repo.create_execution(&new_execution(
                ExecutionStatus::Failed,
                None,
                Some(err.to_string()),
            ))
            .map_err(log_failure("Failed to record execution"))?;
            Err(err.into())
        }
    }
}

/// Polls the engine for one execution and stores the result.
pub async fn sync_execution<R, E>(
    repo: &R,
    engine: &E,
    execution: &WorkflowExecution,
) -> ServiceResult<WorkflowExecution>
where
    R: WorkflowExecutionWriter + ?Sized,
    E: WorkflowEngine + ?Sized,
{
    let Some(external_id) = execution.external_id.as_deref() else {
        return Ok(execution.clone());
    };

    let snapshot = engine
        .get_execution(external_id)
        .await
        .map_err(log_failure("Failed to fetch execution"))?;

    repo.update_execution(execution.id, &execution_update(&snapshot))
        .map_err(log_failure("Failed to update execution"))
        .map_err(ServiceError::from)
}

fn load_execution<R>(repo: &R, execution_id: i32) -> ServiceResult<WorkflowExecution>
where
    R: WorkflowExecutionReader + ?Sized,
{
    repo.get_execution_by_id(ExecutionId::new(execution_id)?)
        .map_err(log_failure("Failed to load execution"))?
        .ok_or(ServiceError::NotFound)
}

/// Returns the execution with node results, refreshing it first while it
/// is still running.
pub async fn refresh_execution<R, E>(
    repo: &R,
    engine: &E,
    actor: &UserProfile,
    execution_id: i32,
) -> ServiceResult<ExecutionView>
where
    R: WorkflowExecutionReader + WorkflowExecutionWriter + ?Sized,
    E: WorkflowEngine + ?Sized,
{
    ensure_staff(actor)?;

    let mut execution = load_execution(repo, execution_id)?;
    if !execution.status.is_terminal() {
        execution = sync_execution(repo, engine, &execution).await?;
    }

    let nodes = stored_nodes(&execution);
    Ok(ExecutionView { execution, nodes })
}

pub async fn stop_execution<R, E>(
    repo: &R,
    engine: &E,
    actor: &UserProfile,
    execution_id: i32,
) -> ServiceResult<WorkflowExecution>
where
    R: WorkflowExecutionReader + WorkflowExecutionWriter + ?Sized,
    E: WorkflowEngine + ?Sized,
{
    ensure_staff(actor)?;

    let execution = load_execution(repo, execution_id)?;
    let external_id = match (&execution.external_id, execution.status.is_terminal()) {
        (Some(external_id), false) => external_id.clone(),
        _ => {
            return Err(ServiceError::Conflict(format!(
                "Execution {} is not running",
                execution.id
            )));
        }
    };

    engine
        .stop_execution(&external_id)
        .await
        .map_err(log_failure("Failed to stop execution"))?;

    let update = ExecutionUpdate {
        status: ExecutionStatus::Canceled,
        result: execution.result.clone(),
        error: execution.error.clone(),
        finished_at: Some(Utc::now().naive_utc()),
    };

    let stopped = repo
        .update_execution(execution.id, &update)
        .map_err(log_failure("Failed to update execution"))?;

    log::info!("{} stopped execution {}", actor.email, stopped.id);

    Ok(stopped)
}

pub fn list_history<R>(
    repo: &R,
    actor: &UserProfile,
    query: HistoryQuery,
) -> ServiceResult<HistoryPageData>
where
    R: WorkflowExecutionReader + ?Sized,
{
    ensure_staff(actor)?;

    let page = query.page.unwrap_or(1).max(1);
    let workflow_id = query
        .workflow_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let mut list_query = ExecutionListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(id) = &workflow_id {
        list_query = list_query.workflow(id.clone());
    }

    let (total, executions) = repo
        .list_executions(list_query)
        .map_err(log_failure("Failed to list executions"))?;

    Ok(HistoryPageData {
        executions: Paginated::from_total(executions, page, total, DEFAULT_ITEMS_PER_PAGE),
        workflow_id,
    })
}

/// Running and waiting executions, polled by the live monitor.
pub fn list_active<R>(repo: &R, actor: &UserProfile) -> ServiceResult<Vec<WorkflowExecution>>
where
    R: WorkflowExecutionReader + ?Sized,
{
    ensure_staff(actor)?;

    repo.list_active_executions()
        .map_err(log_failure("Failed to list active executions"))
        .map_err(ServiceError::from)
}

pub async fn chat_with_agent<E>(
    engine: &E,
    actor: &UserProfile,
    form: AgentChatForm,
) -> ServiceResult<AgentReply>
where
    E: WorkflowEngine + ?Sized,
{
    ensure_staff(actor)?;

    form.validate().map_err(FormError::from)?;

    let workflow = engine
        .list_workflows()
        .await
        .map_err(log_failure("Failed to list workflows"))?
        .into_iter()
        .map(summarize)
        .find(|workflow| workflow.id == form.workflow_id)
        .ok_or(ServiceError::NotFound)?;

    if workflow.trigger != TriggerKind::Chat {
        return Err(ServiceError::Form(format!(
            "Workflow {} is not a chat agent",
            workflow.name
        )));
    }

    let reply = engine
        .chat(&workflow.id, &form.session_id, form.message.trim())
        .await
        .map_err(log_failure("Agent chat failed"))?;

    Ok(AgentReply {
        session_id: form.session_id,
        reply,
    })
}

/// Refreshes every non-terminal execution. Individual failures are logged
/// and skipped. Returns how many executions were updated.
pub async fn sync_active_executions<R, E>(repo: &R, engine: &E) -> ServiceResult<usize>
where
    R: WorkflowExecutionReader + WorkflowExecutionWriter + ?Sized,
    E: WorkflowEngine + ?Sized,
{
    let active = repo
        .list_active_executions()
        .map_err(log_failure("Failed to list active executions"))?;

    let mut updated = 0;
    for execution in active.iter().filter(|e| e.external_id.is_some()) {
        match sync_execution(repo, engine, execution).await {
            Ok(_) => updated += 1,
            Err(err) => log::warn!("Skipping execution {}: {err}", execution.id),
        }
    }

    Ok(updated)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::ProfileId;
    use crate::domain::workflow::WorkflowNode;
    use crate::repository::mock::MockRepository;
    use crate::services::access::fixtures;
    use crate::workflow::{MockWorkflowEngine, WorkflowError};

    fn workflow() -> EngineWorkflow {
        EngineWorkflow {
            id: "wf-1".into(),
            name: "Welcome mail".into(),
            active: true,
            nodes: vec![WorkflowNode {
                name: "Webhook".into(),
                node_type: "n8n-nodes-base.webhook".into(),
            }],
        }
    }

    fn execution(status: ExecutionStatus, external_id: Option<&str>) -> WorkflowExecution {
        let now = Utc::now().naive_utc();
        WorkflowExecution {
            id: ExecutionId::new(5).unwrap(),
            workflow_id: "wf-1".into(),
            workflow_name: "Welcome mail".into(),
            trigger_kind: TriggerKind::Webhook,
            external_id: external_id.map(str::to_string),
            status,
            payload: json!({}),
            result: None,
            error: None,
            triggered_by: ProfileId::new(1).unwrap(),
            started_at: now,
            finished_at: None,
            updated_at: now,
        }
    }

    fn apply(update: &ExecutionUpdate) -> WorkflowExecution {
        let mut updated = execution(update.status, Some("900"));
        updated.result = update.result.clone();
        updated.error = update.error.clone();
        updated.finished_at = update.finished_at;
        updated
    }

    fn trigger_form() -> TriggerWorkflowForm {
        TriggerWorkflowForm {
            workflow_id: "wf-1".into(),
            payload: Some(r#"{"customer": 3}"#.into()),
        }
    }

    #[actix_web::test]
    async fn unreachable_engine_still_renders_page() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_list_workflows().returning(|| {
            Err(WorkflowError::InvalidResponse("connection refused".into()))
        });
        let mut repo = MockRepository::new();
        repo.expect_list_active_executions()
            .returning(|| Ok(vec![execution(ExecutionStatus::Running, Some("900"))]));

        let data = load_automation_page(&repo, &engine, &fixtures::employee(), 10)
            .await
            .unwrap();

        assert!(data.workflows.is_empty());
        assert!(data.engine_error.is_some());
        assert_eq!(data.active.len(), 1);
    }

    #[actix_web::test]
    async fn triggering_records_a_running_execution() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_list_workflows().returning(|| Ok(vec![workflow()]));
        engine
            .expect_run_workflow()
            .withf(|id, payload| id == "wf-1" && payload["customer"] == 3)
            .returning(|_, _| Ok("900".into()));
        let mut repo = MockRepository::new();
        repo.expect_create_execution()
            .withf(|new| {
                new.status == ExecutionStatus::Running
                    && new.external_id.as_deref() == Some("900")
                    && new.trigger_kind == TriggerKind::Webhook
            })
            .returning(|_| Ok(execution(ExecutionStatus::Running, Some("900"))));

        let started = trigger_workflow(&repo, &engine, &fixtures::admin(), trigger_form())
            .await
            .unwrap();

        assert_eq!(started.status, ExecutionStatus::Running);
    }

    #[actix_web::test]
    async fn failed_start_is_recorded_and_reported_upstream() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_list_workflows().returning(|| Ok(vec![workflow()]));
        engine.expect_run_workflow().returning(|_, _| {
            Err(WorkflowError::Status {
                status: 500,
                body: "boom".into(),
            })
        });
        let mut repo = MockRepository::new();
        repo.expect_create_execution()
            .withf(|new| new.status == ExecutionStatus::Failed && new.error.is_some())
            .times(1)
            .returning(|_| Ok(execution(ExecutionStatus::Failed, None)));

        let result = trigger_workflow(&repo, &engine, &fixtures::admin(), trigger_form()).await;

        assert!(matches!(result, Err(ServiceError::Upstream(_))));
    }

    #[actix_web::test]
    async fn customers_cannot_trigger_workflows() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_list_workflows().times(0);
        let repo = MockRepository::new();

        let result =
            trigger_workflow(&repo, &engine, &fixtures::customer(), trigger_form()).await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn refresh_stores_terminal_status_and_nodes() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_get_execution().returning(|id| {
            Ok(EngineExecution {
                id: id.to_string(),
                status: "success".into(),
                finished: true,
                stopped_at: None,
                data: Some(json!({
                    "resultData": { "runData": {
                        "Webhook": [{ "startTime": 1740823201000i64, "executionTime": 3 }]
                    }}
                })),
            })
        });
        let mut repo = MockRepository::new();
        repo.expect_get_execution_by_id()
            .returning(|_| Ok(Some(execution(ExecutionStatus::Running, Some("900")))));
        repo.expect_update_execution()
            .withf(|_, update| {
                update.status == ExecutionStatus::Succeeded && update.finished_at.is_some()
            })
            .returning(|_, update| Ok(apply(update)));

        let view = refresh_execution(&repo, &engine, &fixtures::employee(), 5)
            .await
            .unwrap();

        assert_eq!(view.execution.status, ExecutionStatus::Succeeded);
        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].node, "Webhook");
    }

    #[actix_web::test]
    async fn finished_executions_are_not_polled() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_get_execution().times(0);
        let mut repo = MockRepository::new();
        repo.expect_get_execution_by_id()
            .returning(|_| Ok(Some(execution(ExecutionStatus::Failed, Some("900")))));

        let view = refresh_execution(&repo, &engine, &fixtures::admin(), 5)
            .await
            .unwrap();

        assert_eq!(view.execution.status, ExecutionStatus::Failed);
    }

    #[actix_web::test]
    async fn stopping_a_finished_execution_conflicts() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_stop_execution().times(0);
        let mut repo = MockRepository::new();
        repo.expect_get_execution_by_id()
            .returning(|_| Ok(Some(execution(ExecutionStatus::Succeeded, Some("900")))));

        let result = stop_execution(&repo, &engine, &fixtures::admin(), 5).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[actix_web::test]
    async fn stopping_marks_execution_canceled() {
        let mut engine = MockWorkflowEngine::new();
        engine
            .expect_stop_execution()
            .withf(|id| id == "900")
            .returning(|_| Ok(()));
        let mut repo = MockRepository::new();
        repo.expect_get_execution_by_id()
            .returning(|_| Ok(Some(execution(ExecutionStatus::Running, Some("900")))));
        repo.expect_update_execution()
            .returning(|_, update| Ok(apply(update)));

        let stopped = stop_execution(&repo, &engine, &fixtures::employee(), 5)
            .await
            .unwrap();

        assert_eq!(stopped.status, ExecutionStatus::Canceled);
        assert!(stopped.finished_at.is_some());
    }

    fn agent() -> EngineWorkflow {
        EngineWorkflow {
            id: "agent".into(),
            name: "Support agent".into(),
            active: true,
            nodes: vec![WorkflowNode {
                name: "Chat".into(),
                node_type: "@n8n/n8n-nodes-langchain.chatTrigger".into(),
            }],
        }
    }

    fn chat_form(workflow_id: &str) -> AgentChatForm {
        AgentChatForm {
            workflow_id: workflow_id.into(),
            session_id: "s-1".into(),
            message: "Hi".into(),
        }
    }

    #[actix_web::test]
    async fn agent_chat_rejects_unknown_workflows() {
        let mut engine = MockWorkflowEngine::new();
        engine
            .expect_list_workflows()
            .returning(|| Ok(vec![workflow(), agent()]));
        engine.expect_chat().times(0);

        let result = chat_with_agent(
            &engine,
            &fixtures::employee(),
            chat_form("../api/v1/executions/5/stop"),
        )
        .await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[actix_web::test]
    async fn agent_chat_requires_chat_trigger() {
        let mut engine = MockWorkflowEngine::new();
        engine
            .expect_list_workflows()
            .returning(|| Ok(vec![workflow(), agent()]));
        engine.expect_chat().times(0);

        let result = chat_with_agent(&engine, &fixtures::employee(), chat_form("wf-1")).await;

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[actix_web::test]
    async fn agent_chat_returns_reply() {
        let mut engine = MockWorkflowEngine::new();
        engine
            .expect_list_workflows()
            .returning(|| Ok(vec![workflow(), agent()]));
        engine
            .expect_chat()
            .withf(|wf, session, message| wf == "agent" && session == "s-1" && message == "Hi")
            .returning(|_, _, _| Ok("Hello!".into()));

        let form = AgentChatForm {
            workflow_id: "agent".into(),
            session_id: "s-1".into(),
            message: " Hi ".into(),
        };
        let reply = chat_with_agent(&engine, &fixtures::employee(), form)
            .await
            .unwrap();

        assert_eq!(reply.reply, "Hello!");
        assert_eq!(reply.session_id, "s-1");
    }

    #[actix_web::test]
    async fn sync_skips_failures_and_counts_updates() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_get_execution().returning(|id| {
            if id == "901" {
                Err(WorkflowError::InvalidResponse("gone".into()))
            } else {
                Ok(EngineExecution {
                    id: id.to_string(),
                    status: "running".into(),
                    finished: false,
                    stopped_at: None,
                    data: None,
                })
            }
        });
        let mut repo = MockRepository::new();
        repo.expect_list_active_executions().returning(|| {
            Ok(vec![
                execution(ExecutionStatus::Running, Some("900")),
                execution(ExecutionStatus::Running, Some("901")),
                execution(ExecutionStatus::Running, None),
            ])
        });
        repo.expect_update_execution()
            .times(1)
            .returning(|_, update| Ok(apply(update)));

        let updated = sync_active_executions(&repo, &engine).await.unwrap();

        assert_eq!(updated, 1);
    }
}
