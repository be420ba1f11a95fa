//! Public legal pages and their editor.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::forms::legal::LegalDocumentForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, flash_error_redirect, redirect, render_template, render_template_with_status,
};
use crate::services::{ServiceError, legal as legal_service};

#[get("/legal/{kind}")]
pub async fn show_legal_document(
    kind: web::Path<String>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, None, "legal", &server_config.auth_service_url);

    match legal_service::load_legal_document(repo.get_ref(), &kind) {
        Ok(document) => {
            context.insert("document", &document);
            render_template(&tera, "legal/show.html", &context)
        }
        Err(ServiceError::NotFound) => {
            render_template_with_status(&tera, "main/not_found.html", &context, StatusCode::NOT_FOUND)
        }
        Err(err) => {
            log::error!("Failed to load legal document {kind}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/legal")]
pub async fn legal_index(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();
    if !user.is_admin() {
        FlashMessage::error("Insufficient permissions.").send();
        return redirect("/na");
    }

    match legal_service::list_legal_documents(repo.get_ref()) {
        Ok(entries) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "legal",
                &server_config.auth_service_url,
            );
            context.insert("entries", &entries);
            render_template(&tera, "legal/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list legal documents: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/legal/{kind}/edit")]
pub async fn edit_legal_document(
    kind: web::Path<String>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match legal_service::load_legal_editor(repo.get_ref(), user, &kind) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "legal",
                &server_config.auth_service_url,
            );
            context.insert("editor", &data);
            render_template(&tera, "legal/edit.html", &context)
        }
        Err(err) => flash_error_redirect(err, "/legal", "Failed to open editor"),
    }
}

#[post("/legal/{kind}/edit")]
pub async fn save_legal_document(
    kind: web::Path<String>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<LegalDocumentForm>,
) -> impl Responder {
    let back = format!("/legal/{kind}/edit");

    match legal_service::save_legal_document(repo.get_ref(), current.profile(), &kind, form) {
        Ok(document) => {
            FlashMessage::success(format!("{} saved.", document.title)).send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to save document"),
    }
}
