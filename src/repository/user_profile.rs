use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::{ProfileId, Role};
use crate::domain::user_profile::{NewUserProfile, UserProfile};
use crate::models::user_profile::{
    NewUserProfile as DbNewUserProfile, UserProfile as DbUserProfile,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserProfileReader, UserProfileWriter, into_domain};

impl UserProfileReader for DieselRepository {
    fn get_profile_by_id(&self, id: ProfileId) -> RepositoryResult<Option<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profile = user_profiles::table
            .find(id.get())
            .first::<DbUserProfile>(&mut conn)
            .optional()?;

        profile
            .map(UserProfile::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_profile_by_subject(&self, subject: &str) -> RepositoryResult<Option<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profile = user_profiles::table
            .filter(user_profiles::subject.eq(subject))
            .first::<DbUserProfile>(&mut conn)
            .optional()?;

        profile
            .map(UserProfile::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_profiles(&self) -> RepositoryResult<Vec<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profiles = user_profiles::table
            .order(user_profiles::name.asc())
            .load::<DbUserProfile>(&mut conn)?;

        into_domain(profiles)
    }

    fn list_staff(&self) -> RepositoryResult<Vec<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profiles = user_profiles::table
            .filter(user_profiles::role.eq_any([Role::Admin.as_str(), Role::Employee.as_str()]))
            .order(user_profiles::name.asc())
            .load::<DbUserProfile>(&mut conn)?;

        into_domain(profiles)
    }
}

impl UserProfileWriter for DieselRepository {
    fn create_profile(&self, new_profile: &NewUserProfile) -> RepositoryResult<UserProfile> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let db_new_profile: DbNewUserProfile = new_profile.into();

        // Concurrent first requests of the same user race on the unique
        // subject; the loser reads back the winner's row.
        let inserted = diesel::insert_into(user_profiles::table)
            .values(&db_new_profile)
            .on_conflict(user_profiles::subject)
            .do_nothing()
            .execute(&mut conn)?;

        if inserted == 0 {
            log::info!("Profile for {} already exists", new_profile.subject);
        }

        let db_profile = user_profiles::table
            .filter(user_profiles::subject.eq(&new_profile.subject))
            .first::<DbUserProfile>(&mut conn)?;

        UserProfile::try_from(db_profile).map_err(RepositoryError::from)
    }

    fn update_profile_role(&self, id: ProfileId, role: Role) -> RepositoryResult<UserProfile> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let db_profile = diesel::update(user_profiles::table.find(id.get()))
            .set((
                user_profiles::role.eq(role.as_str()),
                user_profiles::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbUserProfile>(&mut conn)?;

        UserProfile::try_from(db_profile).map_err(RepositoryError::from)
    }
}
