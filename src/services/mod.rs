//! Business logic shared by HTML routes and the JSON API.
//!
//! Service functions are generic over the repository traits they need so they
//! can be exercised against [`crate::repository::mock::MockRepository`].

use thiserror::Error;

use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::workflow::WorkflowError;

pub mod access;
pub mod automation;
pub mod contact_requests;
pub mod customers;
pub mod dashboard;
pub mod landing_pages;
pub mod legal;
pub mod tasks;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller's role does not allow the operation.
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// User input was rejected; the message is shown to the user.
    #[error("{0}")]
    Form(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("workflow engine error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

impl From<WorkflowError> for ServiceError {
    fn from(err: WorkflowError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

/// Logs a repository failure and hands it back for propagation.
pub(crate) fn log_failure<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> E {
    move |err| {
        log::error!("{context}: {err}");
        err
    }
}
