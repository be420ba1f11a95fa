//! JSON envelope shared by every `/api` endpoint.
//!
//! Success bodies look like `{"success": true, "data": ...}` and failures like
//! `{"success": false, "error": {"code": "...", "message": "..."}}`.

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

/// Successful API response wrapping `data`.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> Responder for ApiSuccess<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::Ok().json(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UpstreamError,
    InternalError,
}

impl ApiErrorCode {
    pub const fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ApiErrorCode::ValidationError => "VALIDATION_ERROR",
            ApiErrorCode::Unauthorized => "UNAUTHORIZED",
            ApiErrorCode::Forbidden => "FORBIDDEN",
            ApiErrorCode::NotFound => "NOT_FOUND",
            ApiErrorCode::Conflict => "CONFLICT",
            ApiErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ApiErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Failed API response. Also used as the rejection of the auth extractors.
#[derive(Debug, Clone, Serialize, Error)]
#[error("{}: {message}", code.as_str())]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(ApiErrorCode::Unauthorized, "Authentication required")
    }

    pub fn internal() -> Self {
        Self::new(ApiErrorCode::InternalError, "Internal server error")
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a ApiError,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.status()
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self,
        })
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized => {
                ApiError::new(ApiErrorCode::Forbidden, "Insufficient permissions")
            }
            ServiceError::NotFound => ApiError::new(ApiErrorCode::NotFound, "Not found"),
            ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
                ApiError::new(ApiErrorCode::ValidationError, message)
            }
            ServiceError::Conflict(message) => ApiError::new(ApiErrorCode::Conflict, message),
            ServiceError::Upstream(message) => {
                ApiError::new(ApiErrorCode::UpstreamError, message)
            }
            ServiceError::Internal(message) => {
                log::error!("Internal error: {message}");
                ApiError::internal()
            }
        }
    }
}

/// Result type for JSON handlers.
pub type ApiResult<T> = Result<ApiSuccess<T>, ApiError>;
