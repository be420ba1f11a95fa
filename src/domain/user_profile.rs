use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, PersonName, ProfileId, Role, TypeConstraintError};

/// Application-side record of an authenticated person and their role.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: ProfileId,
    pub subject: String,
    pub email: EmailAddress,
    pub name: PersonName,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl UserProfile {
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Data required to register a profile the first time a subject signs in.
#[derive(Clone, Debug)]
pub struct NewUserProfile {
    pub subject: String,
    pub email: EmailAddress,
    pub name: PersonName,
    pub role: Role,
}

impl NewUserProfile {
    /// Validates raw identity values coming from the session token.
    pub fn try_new(
        subject: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Result<Self, TypeConstraintError> {
        let subject = subject.into().trim().to_string();
        if subject.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        let email = EmailAddress::new(email)?;
        let name = name.into();
        // Fall back to the mailbox name when the provider sends no display name.
        let name = if name.trim().is_empty() {
            PersonName::new(email.as_str().split('@').next().unwrap_or_default())?
        } else {
            PersonName::new(name)?
        };
        Ok(Self {
            subject,
            email,
            name,
            role,
        })
    }
}
