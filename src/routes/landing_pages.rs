//! Landing page generator and the public pages it serves.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::forms::contact_requests::ContactRequestForm;
use crate::forms::landing_pages::LandingPageForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, flash_error_redirect, redirect, render_template, render_template_with_status,
};
use crate::services::{ServiceError, landing_pages as landing_service};

#[get("/landing-pages")]
pub async fn list_landing_pages(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match landing_service::list_landing_pages(repo.get_ref(), user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "landing_pages",
                &server_config.auth_service_url,
            );
            context.insert("pages", &data.pages);
            render_template(&tera, "landing_pages/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list landing pages: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/landing-pages/generate")]
pub async fn generate_landing_page(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<LandingPageForm>,
) -> impl Responder {
    match landing_service::generate_landing_page(repo.get_ref(), current.profile(), form) {
        Ok(page) => {
            FlashMessage::success(format!("Draft /p/{} created.", page.slug)).send();
            redirect("/landing-pages")
        }
        Err(err) => flash_error_redirect(err, "/landing-pages", "Failed to generate page"),
    }
}

async fn set_published(
    page_id: i32,
    current: &CurrentUser,
    repo: &DieselRepository,
    published: bool,
) -> HttpResponse {
    match landing_service::set_landing_page_published(repo, current.profile(), page_id, published)
    {
        Ok(page) => {
            let message = if page.published {
                format!("/p/{} is live.", page.slug)
            } else {
                format!("/p/{} is now a draft.", page.slug)
            };
            FlashMessage::success(message).send();
            redirect("/landing-pages")
        }
        Err(err) => flash_error_redirect(err, "/landing-pages", "Failed to update page"),
    }
}

#[post("/landing-pages/{page_id}/publish")]
pub async fn publish_landing_page(
    page_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    set_published(*page_id, &current, repo.get_ref(), true).await
}

#[post("/landing-pages/{page_id}/unpublish")]
pub async fn unpublish_landing_page(
    page_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    set_published(*page_id, &current, repo.get_ref(), false).await
}

#[post("/landing-pages/{page_id}/delete")]
pub async fn delete_landing_page(
    page_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match landing_service::delete_landing_page(repo.get_ref(), current.profile(), *page_id) {
        Ok(()) => {
            FlashMessage::success("Page deleted.").send();
            redirect("/landing-pages")
        }
        Err(err) => flash_error_redirect(err, "/landing-pages", "Failed to delete page"),
    }
}

fn public_not_found(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    server_config: &ServerConfig,
) -> HttpResponse {
    let context = base_context(flash_messages, None, "", &server_config.auth_service_url);
    render_template_with_status(tera, "main/not_found.html", &context, StatusCode::NOT_FOUND)
}

#[get("/p/{slug}")]
pub async fn show_public_page(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match landing_service::load_public_page(repo.get_ref(), &slug) {
        Ok(page) => {
            let mut context =
                base_context(&flash_messages, None, "", &server_config.auth_service_url);
            context.insert("page", &page);
            render_template(&tera, "landing_pages/public.html", &context)
        }
        Err(ServiceError::NotFound) => public_not_found(&tera, &flash_messages, &server_config),
        Err(err) => {
            log::error!("Failed to load landing page {slug}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/p/{slug}/contact")]
pub async fn submit_public_contact(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ContactRequestForm>,
) -> impl Responder {
    let back = format!("/p/{slug}#contact");

    match landing_service::submit_landing_contact(repo.get_ref(), &slug, form) {
        Ok(_) => {
            FlashMessage::success("Thank you! We will get back to you shortly.").send();
            redirect(&back)
        }
        Err(ServiceError::NotFound) => public_not_found(&tera, &flash_messages, &server_config),
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&back)
        }
        Err(err) => {
            log::error!("Failed to store landing contact for {slug}: {err}");
            FlashMessage::error("Something went wrong, please try again.").send();
            redirect(&back)
        }
    }
}
