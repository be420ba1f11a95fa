//! Diesel models for user profiles.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{EmailAddress, PersonName, ProfileId, TypeConstraintError};
use crate::domain::user_profile::{NewUserProfile as DomainNewUserProfile, UserProfile as DomainUserProfile};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::user_profiles)]
/// Diesel model for [`crate::domain::user_profile::UserProfile`].
pub struct UserProfile {
    pub id: i32,
    pub subject: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::user_profiles)]
/// Insertable form of [`UserProfile`].
pub struct NewUserProfile<'a> {
    pub subject: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
}

impl TryFrom<UserProfile> for DomainUserProfile {
    type Error = TypeConstraintError;

    fn try_from(profile: UserProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProfileId::new(profile.id)?,
            subject: profile.subject,
            email: EmailAddress::new(profile.email)?,
            name: PersonName::new(profile.name)?,
            role: profile.role.parse()?,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUserProfile> for NewUserProfile<'a> {
    fn from(profile: &'a DomainNewUserProfile) -> Self {
        Self {
            subject: profile.subject.as_str(),
            email: profile.email.as_str(),
            name: profile.name.as_str(),
            role: profile.role.as_str(),
        }
    }
}
