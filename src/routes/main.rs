use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::auth::CurrentUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, render_template};
use crate::services::dashboard as dashboard_service;

#[get("/")]
pub async fn show_index(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match dashboard_service::load_dashboard(repo.get_ref(), user) {
        Ok(stats) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "index",
                &server_config.auth_service_url,
            );
            context.insert("stats", &stats);
            render_template(&tera, "main/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
