use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ContactRequestId, CustomerId, CustomerName, EmailAddress, PhoneNumber, TypeConstraintError,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: CustomerName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
    /// Contact request this customer was converted from, if any.
    pub source_request_id: Option<ContactRequestId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn optional_email(value: Option<String>) -> Result<Option<EmailAddress>, TypeConstraintError> {
    optional_text(value).map(EmailAddress::new).transpose()
}

fn optional_phone(value: Option<String>) -> Result<Option<PhoneNumber>, TypeConstraintError> {
    optional_text(value).map(PhoneNumber::new).transpose()
}

#[derive(Clone, Debug)]
pub struct NewCustomer {
    pub name: CustomerName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub source_request_id: Option<ContactRequestId>,
}

impl NewCustomer {
    /// Validates raw values; blank optional fields are treated as absent.
    pub fn try_new(
        name: impl Into<String>,
        email: Option<String>,
        phone: Option<String>,
        company: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            name: CustomerName::new(name)?,
            email: optional_email(email)?,
            phone: optional_phone(phone)?,
            company: optional_text(company),
            notes: optional_text(notes),
            source_request_id: None,
        })
    }

    #[must_use]
    pub fn with_source_request(mut self, request_id: ContactRequestId) -> Self {
        self.source_request_id = Some(request_id);
        self
    }
}

#[derive(Clone, Debug)]
pub struct UpdateCustomer {
    pub name: CustomerName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl UpdateCustomer {
    pub fn try_new(
        name: impl Into<String>,
        email: Option<String>,
        phone: Option<String>,
        company: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            name: CustomerName::new(name)?,
            email: optional_email(email)?,
            phone: optional_phone(phone)?,
            company: optional_text(company),
            notes: optional_text(notes),
        })
    }
}
