//! Automation hub pages.

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::dto::automation::HistoryQuery;
use crate::forms::automation::TriggerWorkflowForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error_redirect, redirect, render_template};
use crate::services::{ServiceError, automation as automation_service};
use crate::workflow::HttpWorkflowEngine;

#[get("/automation")]
pub async fn show_automation(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<HttpWorkflowEngine>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match automation_service::load_automation_page(
        repo.get_ref(),
        engine.get_ref(),
        user,
        server_config.workflow.poll_interval_secs,
    )
    .await
    {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "automation",
                &server_config.auth_service_url,
            );
            context.insert("workflows", &data.workflows);
            context.insert("engine_error", &data.engine_error);
            context.insert("active", &data.active);
            context.insert("poll_interval_secs", &data.poll_interval_secs);
            render_template(&tera, "automation/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to load automation hub: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/automation/trigger")]
pub async fn trigger_workflow(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<HttpWorkflowEngine>,
    web::Form(form): web::Form<TriggerWorkflowForm>,
) -> impl Responder {
    match automation_service::trigger_workflow(
        repo.get_ref(),
        engine.get_ref(),
        current.profile(),
        form,
    )
    .await
    {
        Ok(execution) => {
            FlashMessage::success(format!("{} started.", execution.workflow_name)).send();
            redirect(&format!("/automation/executions/{}", execution.id))
        }
        Err(err) => flash_error_redirect(err, "/automation", "Failed to start workflow"),
    }
}

#[get("/automation/history")]
pub async fn show_history(
    current: CurrentUser,
    params: web::Query<HistoryQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match automation_service::list_history(repo.get_ref(), user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "automation",
                &server_config.auth_service_url,
            );
            context.insert("executions", &data.executions);
            context.insert("workflow_id", &data.workflow_id);
            render_template(&tera, "automation/history.html", &context)
        }
        Err(err) => flash_error_redirect(err, "/automation", "Failed to load history"),
    }
}

#[get("/automation/executions/{execution_id}")]
pub async fn show_execution(
    execution_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<HttpWorkflowEngine>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match automation_service::refresh_execution(
        repo.get_ref(),
        engine.get_ref(),
        user,
        execution_id.into_inner(),
    )
    .await
    {
        Ok(view) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "automation",
                &server_config.auth_service_url,
            );
            context.insert("execution", &view.execution);
            context.insert("nodes", &view.nodes);
            context.insert("poll_interval_secs", &server_config.workflow.poll_interval_secs);
            render_template(&tera, "automation/execution.html", &context)
        }
        Err(err) => flash_error_redirect(err, "/automation/history", "Failed to load execution"),
    }
}

#[post("/automation/executions/{execution_id}/stop")]
pub async fn stop_execution(
    execution_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<HttpWorkflowEngine>,
) -> impl Responder {
    let execution_id = execution_id.into_inner();
    let back = format!("/automation/executions/{execution_id}");

    match automation_service::stop_execution(
        repo.get_ref(),
        engine.get_ref(),
        current.profile(),
        execution_id,
    )
    .await
    {
        Ok(_) => {
            FlashMessage::success("Execution stopped.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to stop execution"),
    }
}
