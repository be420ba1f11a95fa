//! Profile administration.

use crate::domain::user_profile::UserProfile;
use crate::domain::types::ProfileId;
use crate::forms::users::RoleForm;
use crate::repository::{UserProfileReader, UserProfileWriter};
use crate::services::access::ensure_admin;
use crate::services::{ServiceError, ServiceResult, log_failure};

pub fn list_users<R>(repo: &R, actor: &UserProfile) -> ServiceResult<Vec<UserProfile>>
where
    R: UserProfileReader + ?Sized,
{
    ensure_admin(actor)?;

    repo.list_profiles()
        .map_err(log_failure("Failed to list profiles"))
        .map_err(ServiceError::from)
}

/// Changes a profile's role. Admins cannot change their own role, which
/// keeps at least one admin around.
pub fn change_role<R>(
    repo: &R,
    actor: &UserProfile,
    profile_id: i32,
    form: RoleForm,
) -> ServiceResult<UserProfile>
where
    R: UserProfileReader + UserProfileWriter + ?Sized,
{
    ensure_admin(actor)?;

    let role = form.role()?;
    let profile_id = ProfileId::new(profile_id)?;

    if profile_id == actor.id {
        return Err(ServiceError::Form(
            "You cannot change your own role".to_string(),
        ));
    }

    let profile = repo
        .get_profile_by_id(profile_id)
        .map_err(log_failure("Failed to load profile"))?
        .ok_or(ServiceError::NotFound)?;

    let updated = repo
        .update_profile_role(profile.id, role)
        .map_err(log_failure("Failed to update role"))?;

    log::info!(
        "{} changed role of {} from {} to {}",
        actor.email,
        updated.email,
        profile.role,
        updated.role
    );

    Ok(updated)
}
