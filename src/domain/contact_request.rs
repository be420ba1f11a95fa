//! Inbound inquiries and the rules for moving them through triage.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ContactRequestId, ContactRequestStatus, CustomerId, EmailAddress, PersonName, PhoneNumber,
    ProfileId, Role, SanitizedText, Subject, TypeConstraintError,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactRequest {
    pub id: ContactRequestId,
    pub name: PersonName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub subject: Subject,
    pub message: SanitizedText,
    /// Where the request came from, e.g. `api` or `landing:{slug}`.
    pub source: String,
    pub status: ContactRequestStatus,
    pub assignee_id: Option<ProfileId>,
    pub customer_id: Option<CustomerId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub responded_at: Option<NaiveDateTime>,
}

impl ContactRequest {
    /// A request can be converted once, and never after it was archived.
    pub fn can_convert(&self) -> bool {
        !matches!(
            self.status,
            ContactRequestStatus::Converted | ContactRequestStatus::Archived
        ) && self.customer_id.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct NewContactRequest {
    pub name: PersonName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub subject: Subject,
    pub message: SanitizedText,
    pub source: String,
}

impl NewContactRequest {
    pub fn try_new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
        company: Option<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, TypeConstraintError> {
        let phone = phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PhoneNumber::new)
            .transpose()?;
        let company = company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self {
            name: PersonName::new(name)?,
            email: EmailAddress::new(email)?,
            phone,
            company,
            subject: Subject::new(subject)?,
            message: SanitizedText::new(message)?,
            source: source.into(),
        })
    }
}

/// Why a requested status change is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenied {
    /// The request already has the requested status.
    Unchanged,
    /// `converted` is only reachable through conversion.
    RequiresConversion,
    /// The caller's role may not perform this change.
    Forbidden,
    /// The change is not a valid step from the current status.
    Invalid,
}

/// Decides whether `role` may move a request from `from` to `to`.
pub fn check_transition(
    role: Role,
    from: ContactRequestStatus,
    to: ContactRequestStatus,
) -> Result<(), TransitionDenied> {
    use ContactRequestStatus::*;

    if from == to {
        return Err(TransitionDenied::Unchanged);
    }
    if to == Converted {
        return Err(TransitionDenied::RequiresConversion);
    }
    if !role.is_staff() {
        return Err(TransitionDenied::Forbidden);
    }

    match (from, to) {
        (New, InProgress) | (New | InProgress, Responded) | (Responded, InProgress) => Ok(()),
        (_, Archived) | (Archived, New) => {
            if role == Role::Admin {
                Ok(())
            } else {
                Err(TransitionDenied::Forbidden)
            }
        }
        _ => Err(TransitionDenied::Invalid),
    }
}
