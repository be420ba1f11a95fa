//! JSON endpoints under `/api/v1`, all answering with the envelope.

use actix_web::{HttpResponse, Scope, get, post, web};

use crate::auth::CurrentUser;
use crate::domain::contact_request::ContactRequest;
use crate::domain::workflow::WorkflowExecution;
use crate::dto::automation::{AgentReply, ExecutionView};
use crate::dto::customers::{CustomerIndexQuery, CustomersPageData};
use crate::dto::dashboard::DashboardStats;
use crate::dto::tasks::{TaskIndexQuery, TasksPageData};
use crate::envelope::{ApiError, ApiErrorCode, ApiResult, ApiSuccess};
use crate::forms::automation::{AgentChatForm, TriggerWorkflowForm};
use crate::forms::contact_requests::{API_SOURCE, ContactRequestForm};
use crate::repository::DieselRepository;
use crate::services::{
    automation as automation_service, contact_requests as requests_service,
    customers as customers_service, dashboard as dashboard_service, tasks as tasks_service,
};
use crate::workflow::HttpWorkflowEngine;

#[get("/v1/dashboard/stats")]
pub async fn api_v1_dashboard_stats(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult<DashboardStats> {
    let stats = dashboard_service::load_dashboard(repo.get_ref(), current.profile())?;
    Ok(ApiSuccess::new(stats))
}

/// Public intake endpoint; no session required.
#[post("/v1/contact-requests")]
pub async fn api_v1_submit_contact_request(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactRequestForm>,
) -> ApiResult<ContactRequest> {
    let request = requests_service::submit_contact_request(repo.get_ref(), form, API_SOURCE)?;
    Ok(ApiSuccess::new(request))
}

#[get("/v1/customers")]
pub async fn api_v1_customers(
    current: CurrentUser,
    params: web::Query<CustomerIndexQuery>,
    repo: web::Data<DieselRepository>,
) -> ApiResult<CustomersPageData> {
    let data =
        customers_service::list_customers(repo.get_ref(), current.profile(), params.into_inner())?;
    Ok(ApiSuccess::new(data))
}

#[get("/v1/tasks")]
pub async fn api_v1_tasks(
    current: CurrentUser,
    params: web::Query<TaskIndexQuery>,
    repo: web::Data<DieselRepository>,
) -> ApiResult<TasksPageData> {
    let data = tasks_service::list_tasks(repo.get_ref(), current.profile(), params.into_inner())?;
    Ok(ApiSuccess::new(data))
}

/// Polled by the live execution monitor.
#[get("/v1/automation/executions/active")]
pub async fn api_v1_active_executions(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult<Vec<WorkflowExecution>> {
    let active = automation_service::list_active(repo.get_ref(), current.profile())?;
    Ok(ApiSuccess::new(active))
}

#[get("/v1/automation/executions/{execution_id}")]
pub async fn api_v1_execution(
    execution_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<HttpWorkflowEngine>,
) -> ApiResult<ExecutionView> {
    let view = automation_service::refresh_execution(
        repo.get_ref(),
        engine.get_ref(),
        current.profile(),
        execution_id.into_inner(),
    )
    .await?;
    Ok(ApiSuccess::new(view))
}

#[post("/v1/automation/executions")]
pub async fn api_v1_trigger_workflow(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<HttpWorkflowEngine>,
    web::Json(form): web::Json<TriggerWorkflowForm>,
) -> ApiResult<WorkflowExecution> {
    let execution = automation_service::trigger_workflow(
        repo.get_ref(),
        engine.get_ref(),
        current.profile(),
        form,
    )
    .await?;
    Ok(ApiSuccess::new(execution))
}

#[post("/v1/automation/chat")]
pub async fn api_v1_agent_chat(
    current: CurrentUser,
    engine: web::Data<HttpWorkflowEngine>,
    web::Json(form): web::Json<AgentChatForm>,
) -> ApiResult<AgentReply> {
    let reply =
        automation_service::chat_with_agent(engine.get_ref(), current.profile(), form).await?;
    Ok(ApiSuccess::new(reply))
}

fn validation_error(err: impl std::fmt::Display) -> actix_web::Error {
    ApiError::new(ApiErrorCode::ValidationError, err.to_string()).into()
}

async fn api_not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::new(ApiErrorCode::NotFound, "Not found"))
}

/// The `/api` scope. Extractor failures and unknown paths answer with the
/// error envelope instead of actix's plain-text defaults.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(|err, _| validation_error(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| validation_error(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| {
            ApiError::new(ApiErrorCode::NotFound, err.to_string()).into()
        }))
        .service(api_v1_submit_contact_request)
        .service(api_v1_dashboard_stats)
        .service(api_v1_customers)
        .service(api_v1_tasks)
        .service(api_v1_active_executions)
        .service(api_v1_execution)
        .service(api_v1_trigger_workflow)
        .service(api_v1_agent_chat)
        .default_service(web::to(api_not_found))
}
