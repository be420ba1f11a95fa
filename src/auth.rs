//! Session tokens and the request extractors built on them.
//!
//! The hosted auth provider signs an HS256 JWT with the shared secret. The
//! token arrives either as a bearer `Authorization` header (API clients) or
//! as the identity stored in the session cookie after `/auth/callback`.

use actix_identity::Identity;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::user_profile::UserProfile;
use crate::envelope::ApiError;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::access::resolve_profile;

pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

pub fn encode_token(
    user: &AuthenticatedUser,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        user,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| {
            log::error!("ServerConfig is not registered as app data");
            ApiError::internal()
        })?;

    let token = match bearer_token(req) {
        Some(token) => token,
        None => Identity::from_request(req, &mut Payload::None)
            .into_inner()
            .ok()
            .and_then(|identity| identity.id().ok())
            .ok_or_else(ApiError::unauthorized)?,
    };

    decode_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ApiError::unauthorized()
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Profile of the signed-in caller, created on first sight.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl CurrentUser {
    pub fn profile(&self) -> &UserProfile {
        &self.0
    }
}

fn current_user(req: &HttpRequest) -> Result<CurrentUser, ApiError> {
    let user = authenticate(req)?;

    let (Some(repo), Some(config)) = (
        req.app_data::<web::Data<DieselRepository>>(),
        req.app_data::<web::Data<ServerConfig>>(),
    ) else {
        log::error!("Repository or ServerConfig is not registered as app data");
        return Err(ApiError::internal());
    };

    resolve_profile(repo.get_ref(), &user, &config.admin_emails)
        .map(CurrentUser)
        .map_err(ApiError::from)
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(current_user(req))
    }
}
