//! Diesel models for contact requests.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::contact_request::{
    ContactRequest as DomainContactRequest, NewContactRequest as DomainNewContactRequest,
};
use crate::domain::types::{
    ContactRequestId, ContactRequestStatus, CustomerId, EmailAddress, PersonName, PhoneNumber,
    ProfileId, SanitizedText, Subject, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::contact_requests)]
pub struct ContactRequest {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub source: String,
    pub status: String,
    pub assignee_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub responded_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::contact_requests)]
pub struct NewContactRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub subject: &'a str,
    pub message: &'a str,
    pub source: &'a str,
    pub status: &'a str,
}

impl TryFrom<ContactRequest> for DomainContactRequest {
    type Error = TypeConstraintError;

    fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContactRequestId::new(request.id)?,
            name: PersonName::new(request.name)?,
            email: EmailAddress::new(request.email)?,
            phone: request.phone.map(PhoneNumber::new).transpose()?,
            company: request.company,
            subject: Subject::new(request.subject)?,
            message: SanitizedText::from_trusted(request.message),
            source: request.source,
            status: request.status.parse()?,
            assignee_id: request.assignee_id.map(ProfileId::new).transpose()?,
            customer_id: request.customer_id.map(CustomerId::new).transpose()?,
            created_at: request.created_at,
            updated_at: request.updated_at,
            responded_at: request.responded_at,
        })
    }
}

impl<'a> From<&'a DomainNewContactRequest> for NewContactRequest<'a> {
    fn from(request: &'a DomainNewContactRequest) -> Self {
        Self {
            name: request.name.as_str(),
            email: request.email.as_str(),
            phone: request.phone.as_ref().map(PhoneNumber::as_str),
            company: request.company.as_deref(),
            subject: request.subject.as_str(),
            message: request.message.as_str(),
            source: request.source.as_str(),
            status: ContactRequestStatus::New.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn new_requests_are_inserted_as_new() {
        let domain = DomainNewContactRequest::try_new(
            "Jane",
            "jane@example.com",
            Some("+14155552671".to_string()),
            None,
            "Pricing",
            "How much?",
            "api",
        )
        .expect("valid request");

        let insertable: NewContactRequest = (&domain).into();

        assert_eq!(insertable.status, "new");
        assert_eq!(insertable.phone, Some("+14155552671"));
        assert_eq!(insertable.source, "api");
    }

    #[test]
    fn unknown_status_fails_conversion() {
        let now = Utc::now().naive_utc();
        let db = ContactRequest {
            id: 1,
            name: "Jane".into(),
            email: "jane@example.com".into(),
            phone: None,
            company: None,
            subject: "Pricing".into(),
            message: "How much?".into(),
            source: "api".into(),
            status: "pending".into(),
            assignee_id: None,
            customer_id: None,
            created_at: now,
            updated_at: now,
            responded_at: None,
        };

        assert!(DomainContactRequest::try_from(db).is_err());
    }
}
