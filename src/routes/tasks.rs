//! Ticket pages for customers and staff.

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::dto::tasks::TaskIndexQuery;
use crate::forms::tasks::{AssignTaskForm, NewTaskForm, TaskCommentForm, TaskStatusForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error_redirect, redirect, render_template};
use crate::services::{ServiceError, tasks as tasks_service};

#[get("/tasks")]
pub async fn list_tasks(
    current: CurrentUser,
    params: web::Query<TaskIndexQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match tasks_service::list_tasks(repo.get_ref(), user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "tasks",
                &server_config.auth_service_url,
            );
            context.insert("tasks", &data.tasks);
            context.insert("counts", &data.counts);
            context.insert("status", &data.status);
            render_template(&tera, "tasks/index.html", &context)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/tasks")
        }
        Err(err) => {
            log::error!("Failed to list tasks: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/tasks/add")]
pub async fn add_task(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<NewTaskForm>,
) -> impl Responder {
    match tasks_service::create_task(repo.get_ref(), current.profile(), form) {
        Ok(task) => {
            FlashMessage::success("Ticket created.").send();
            redirect(&format!("/tasks/{}", task.id))
        }
        Err(err) => flash_error_redirect(err, "/tasks", "Failed to create ticket"),
    }
}

#[get("/tasks/{task_id}")]
pub async fn show_task(
    task_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match tasks_service::show_task(repo.get_ref(), user, task_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "tasks",
                &server_config.auth_service_url,
            );
            context.insert("task", &data.task);
            context.insert("customer", &data.customer);
            context.insert("comments", &data.comments);
            context.insert("next_statuses", &data.next_statuses);
            context.insert("staff", &data.staff);
            context.insert("can_take", &data.can_take);
            render_template(&tera, "tasks/show.html", &context)
        }
        Err(err) => flash_error_redirect(err, "/tasks", "Failed to load ticket"),
    }
}

#[post("/tasks/{task_id}/status")]
pub async fn change_task_status(
    task_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TaskStatusForm>,
) -> impl Responder {
    let task_id = task_id.into_inner();
    let back = format!("/tasks/{task_id}");

    match tasks_service::change_task_status(repo.get_ref(), current.profile(), task_id, form) {
        Ok(task) => {
            FlashMessage::success(format!("Ticket marked {}.", task.status)).send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to update ticket"),
    }
}

#[post("/tasks/{task_id}/assign")]
pub async fn assign_task(
    task_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AssignTaskForm>,
) -> impl Responder {
    let task_id = task_id.into_inner();
    let back = format!("/tasks/{task_id}");

    match tasks_service::assign_task(repo.get_ref(), current.profile(), task_id, form) {
        Ok(_) => {
            FlashMessage::success("Ticket assigned.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to assign ticket"),
    }
}

#[post("/tasks/{task_id}/take")]
pub async fn take_task(
    task_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let task_id = task_id.into_inner();
    let back = format!("/tasks/{task_id}");

    match tasks_service::take_task(repo.get_ref(), current.profile(), task_id) {
        Ok(_) => {
            FlashMessage::success("Ticket assigned to you.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to take ticket"),
    }
}

#[post("/tasks/{task_id}/comment")]
pub async fn comment_task(
    task_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TaskCommentForm>,
) -> impl Responder {
    let task_id = task_id.into_inner();
    let back = format!("/tasks/{task_id}");

    match tasks_service::comment_task(repo.get_ref(), current.profile(), task_id, form) {
        Ok(_) => {
            FlashMessage::success("Comment added.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to add comment"),
    }
}
