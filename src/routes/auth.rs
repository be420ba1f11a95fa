//! Sign-in handshake with the hosted auth provider.

use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use reqwest::Url;
use serde::Deserialize;
use tera::Tera;

use crate::auth::decode_token;
use crate::models::config::ServerConfig;
use crate::routes::{base_context, redirect, render_template};

#[derive(Deserialize)]
struct CallbackQuery {
    token: String,
}

/// Callback address as seen by the browser, port included.
fn callback_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}/auth/callback", info.scheme(), info.host())
}

/// Sign-in page of the auth provider with `next` pointing back at `callback`.
pub fn signin_location(auth_service_url: &str, next: &str) -> Option<String> {
    match Url::parse_with_params(auth_service_url, &[("next", next)]) {
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            log::error!("Invalid auth_service_url '{auth_service_url}': {err}");
            None
        }
    }
}

#[get("/auth/signin")]
pub async fn signin(req: HttpRequest, server_config: web::Data<ServerConfig>) -> HttpResponse {
    match signin_location(&server_config.auth_service_url, &callback_url(&req)) {
        Some(location) => redirect(&location),
        None => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/auth/callback")]
pub async fn callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = decode_token(&query.token, &server_config.secret) {
        log::warn!("Sign-in callback rejected: {err}");
        FlashMessage::error("Sign-in failed.").send();
        return redirect("/na");
    }

    match Identity::login(&req.extensions(), query.token.clone()) {
        Ok(_) => redirect("/"),
        Err(err) => {
            log::error!("Failed to store identity: {err}");
            FlashMessage::error("Sign-in failed.").send();
            redirect("/na")
        }
    }
}

#[post("/logout")]
pub async fn logout(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    redirect("/")
}

#[get("/na")]
pub async fn not_assigned(
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(
        &flash_messages,
        None,
        "na",
        &server_config.auth_service_url,
    );
    render_template(&tera, "main/not_assigned.html", &context)
}

/// Plain 404 for anything outside the known routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("Not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_location_encodes_the_callback() {
        let location = signin_location(
            "https://auth.example.com/signin",
            "http://hub.local:8080/auth/callback",
        )
        .unwrap();
        assert_eq!(
            location,
            "https://auth.example.com/signin?next=http%3A%2F%2Fhub.local%3A8080%2Fauth%2Fcallback"
        );
    }

    #[test]
    fn existing_query_parameters_are_kept() {
        let location = signin_location("https://auth.example.com/signin?app=hub", "/cb").unwrap();
        assert_eq!(location, "https://auth.example.com/signin?app=hub&next=%2Fcb");
    }

    #[test]
    fn invalid_auth_service_url_yields_none() {
        assert!(signin_location("not a url", "/cb").is_none());
    }
}
