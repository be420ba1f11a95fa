//! Form definitions backing the HTML routes and JSON endpoints.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod automation;
pub mod contact_requests;
pub mod customers;
pub mod landing_pages;
pub mod legal;
pub mod tasks;
pub mod users;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid identifier")]
    InvalidId,

    #[error("invalid status")]
    InvalidStatus,

    #[error("invalid priority")]
    InvalidPriority,

    #[error("invalid role")]
    InvalidRole,

    #[error("invalid date, expected YYYY-MM-DD")]
    InvalidDate,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("required field is empty")]
    Empty,

    #[error("invalid CSV: {0}")]
    Csv(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::NonPositiveId => FormError::InvalidId,
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::EmptyString => FormError::Empty,
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::InvalidSlug => FormError::InvalidName,
            TypeConstraintError::InvalidValue(value) => FormError::InvalidPayload(value),
        }
    }
}

/// Parses an optional identifier where an empty string means "none".
pub(crate) fn parse_optional_id(value: Option<&str>) -> Result<Option<i32>, FormError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(Some)
            .ok_or(FormError::InvalidId),
    }
}

/// Trims the value and drops it when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_ids_treat_blank_as_none() {
        assert_eq!(parse_optional_id(None).unwrap(), None);
        assert_eq!(parse_optional_id(Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_id(Some("7")).unwrap(), Some(7));
        assert!(parse_optional_id(Some("-1")).is_err());
        assert!(parse_optional_id(Some("abc")).is_err());
    }
}
