//! Profile resolution and role checks.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::Role;
use crate::domain::user_profile::{NewUserProfile, UserProfile};
use crate::repository::errors::RepositoryError;
use crate::repository::{UserProfileReader, UserProfileWriter};
use crate::services::{ServiceError, ServiceResult, log_failure};

/// Roles allowed to work the CRM, triage requests and run automations.
pub const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Employee];

/// Loads the profile for the token subject, creating it on first sight.
///
/// New profiles get [`Role::Customer`] unless the email is listed in
/// `admin_emails`.
pub fn resolve_profile<R>(
    repo: &R,
    user: &AuthenticatedUser,
    admin_emails: &[String],
) -> ServiceResult<UserProfile>
where
    R: UserProfileReader + UserProfileWriter + ?Sized,
{
    if let Some(profile) = repo
        .get_profile_by_subject(&user.sub)
        .map_err(log_failure("Failed to load profile"))?
    {
        return Ok(profile);
    }

    let role = if admin_emails
        .iter()
        .any(|email| email.trim().eq_ignore_ascii_case(user.email.trim()))
    {
        Role::Admin
    } else {
        Role::Customer
    };

    let new_profile = NewUserProfile::try_new(&user.sub, &user.email, &user.name, role)?;

    let profile = match repo.create_profile(&new_profile) {
        Ok(profile) => profile,
        // A concurrent first request for the same subject won the insert.
        Err(RepositoryError::Conflict(message)) => {
            return repo
                .get_profile_by_subject(&user.sub)
                .map_err(log_failure("Failed to load profile"))?
                .ok_or(ServiceError::Conflict(message));
        }
        Err(err) => return Err(log_failure("Failed to create profile")(err).into()),
    };

    log::info!("Created {} profile for {}", profile.role, profile.email);

    Ok(profile)
}

/// Fails with [`ServiceError::Unauthorized`] unless the profile holds one of `roles`.
pub fn ensure_role(profile: &UserProfile, roles: &[Role]) -> ServiceResult<()> {
    if profile.has_role(roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

pub fn ensure_staff(profile: &UserProfile) -> ServiceResult<()> {
    ensure_role(profile, STAFF_ROLES)
}

pub fn ensure_admin(profile: &UserProfile) -> ServiceResult<()> {
    ensure_role(profile, &[Role::Admin])
}
