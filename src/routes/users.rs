use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::domain::types::Role;
use crate::forms::users::RoleForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error_redirect, redirect, render_template};
use crate::services::{ServiceError, users as users_service};

#[get("/users")]
pub async fn list_users(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match users_service::list_users(repo.get_ref(), user) {
        Ok(profiles) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "users",
                &server_config.auth_service_url,
            );
            context.insert("profiles", &profiles);
            context.insert("roles", Role::ALL);
            render_template(&tera, "users/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list users: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/users/{profile_id}/role")]
pub async fn change_role(
    profile_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<RoleForm>,
) -> impl Responder {
    match users_service::change_role(repo.get_ref(), current.profile(), *profile_id, form) {
        Ok(profile) => {
            FlashMessage::success(format!("{} is now {}.", profile.email, profile.role)).send();
            redirect("/users")
        }
        Err(err) => flash_error_redirect(err, "/users", "Failed to change role"),
    }
}
