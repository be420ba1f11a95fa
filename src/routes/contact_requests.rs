//! Contact-request triage pages.

use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::dto::contact_requests::RequestIndexQuery;
use crate::forms::contact_requests::{AssignRequestForm, RequestStatusForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error_redirect, redirect, render_template};
use crate::services::{ServiceError, contact_requests as requests_service};

#[get("/requests")]
pub async fn list_requests(
    current: CurrentUser,
    params: web::Query<RequestIndexQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match requests_service::list_contact_requests(repo.get_ref(), user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "requests",
                &server_config.auth_service_url,
            );
            context.insert("requests", &data.requests);
            context.insert("counts", &data.counts);
            context.insert("status", &data.status);
            context.insert("staff", &data.staff);
            render_template(&tera, "requests/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/requests")
        }
        Err(err) => {
            log::error!("Failed to list contact requests: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/requests/export.csv")]
pub async fn export_requests(
    current: CurrentUser,
    params: web::Query<RequestIndexQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match requests_service::export_contact_requests_csv(
        repo.get_ref(),
        current.profile(),
        params.into_inner().status,
    ) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contact-requests.csv\"",
            ))
            .body(csv),
        Err(err) => flash_error_redirect(err, "/requests", "Failed to export requests"),
    }
}

#[get("/requests/{request_id}")]
pub async fn show_request(
    request_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match requests_service::get_contact_request(repo.get_ref(), user, request_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "requests",
                &server_config.auth_service_url,
            );
            context.insert("request", &data.request);
            context.insert("staff", &data.staff);
            render_template(&tera, "requests/show.html", &context)
        }
        Err(err) => flash_error_redirect(err, "/requests", "Failed to load request"),
    }
}

#[post("/requests/{request_id}/status")]
pub async fn change_request_status(
    request_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<RequestStatusForm>,
) -> impl Responder {
    let request_id = request_id.into_inner();
    let back = format!("/requests/{request_id}");

    match requests_service::change_request_status(repo.get_ref(), current.profile(), request_id, form)
    {
        Ok(request) => {
            FlashMessage::success(format!("Request marked {}.", request.status)).send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to update request"),
    }
}

#[post("/requests/{request_id}/assign")]
pub async fn assign_request(
    request_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AssignRequestForm>,
) -> impl Responder {
    let request_id = request_id.into_inner();
    let back = format!("/requests/{request_id}");

    match requests_service::assign_contact_request(repo.get_ref(), current.profile(), request_id, form)
    {
        Ok(_) => {
            FlashMessage::success("Request assigned.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to assign request"),
    }
}

#[post("/requests/{request_id}/convert")]
pub async fn convert_request(
    request_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let request_id = request_id.into_inner();

    match requests_service::convert_contact_request(repo.get_ref(), current.profile(), request_id) {
        Ok(converted) => {
            FlashMessage::success("Request converted to a customer.").send();
            // Employees only see customers assigned to them.
            if current.profile().is_admin() {
                redirect(&format!("/customers/{}", converted.customer.id))
            } else {
                redirect(&format!("/requests/{request_id}"))
            }
        }
        Err(err) => flash_error_redirect(
            err,
            &format!("/requests/{request_id}"),
            "Failed to convert request",
        ),
    }
}
