//! HTML and JSON route handlers.

use actix_web::http::header;
use actix_web::{HttpResponse, http::StatusCode};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::domain::user_profile::UserProfile;
use crate::services::ServiceError;

pub mod api;
pub mod auth;
pub mod automation;
pub mod contact_requests;
pub mod customers;
pub mod landing_pages;
pub mod legal;
pub mod main;
pub mod tasks;
pub mod users;

/// Maps flash levels to Bootstrap alert classes.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context shared by every page: alerts, the signed-in profile and the
/// active navigation entry.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    current_user: Option<&UserProfile>,
    current_page: &str,
    auth_service_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &current_user);
    context.insert("current_page", current_page);
    context.insert("home_url", auth_service_url);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Same as [`render_template`] with an explicit status, used for 404 pages.
pub fn render_template_with_status(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Flashes the error and redirects. Permission errors go to `/na`.
pub fn flash_error_redirect(err: ServiceError, back: &str, context: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error("Not found.").send();
            redirect(back)
        }
        ServiceError::Form(message)
        | ServiceError::TypeConstraint(message)
        | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send();
            redirect(back)
        }
        ServiceError::Upstream(message) => {
            log::warn!("{context}: {message}");
            FlashMessage::error(format!("Automation engine error: {message}")).send();
            redirect(back)
        }
        ServiceError::Internal(message) => {
            log::error!("{context}: {message}");
            FlashMessage::error(format!("{context}.")).send();
            redirect(back)
        }
    }
}
