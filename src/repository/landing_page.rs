use chrono::Utc;
use diesel::prelude::*;

use crate::domain::landing_page::{LandingPage, NewLandingPage};
use crate::domain::types::{LandingPageId, Slug};
use crate::models::landing_page::{
    LandingPage as DbLandingPage, NewLandingPage as DbNewLandingPage,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, LandingPageReader, LandingPageWriter, into_domain};

impl LandingPageReader for DieselRepository {
    fn get_landing_page_by_id(&self, id: LandingPageId) -> RepositoryResult<Option<LandingPage>> {
        use crate::schema::landing_pages;

        let mut conn = self.conn()?;

        let page = landing_pages::table
            .find(id.get())
            .first::<DbLandingPage>(&mut conn)
            .optional()?;

        page.map(LandingPage::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_landing_page_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<LandingPage>> {
        use crate::schema::landing_pages;

        let mut conn = self.conn()?;

        let page = landing_pages::table
            .filter(landing_pages::slug.eq(slug.as_str()))
            .first::<DbLandingPage>(&mut conn)
            .optional()?;

        page.map(LandingPage::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_landing_pages(&self) -> RepositoryResult<Vec<LandingPage>> {
        use crate::schema::landing_pages;

        let mut conn = self.conn()?;

        let pages = landing_pages::table
            .order(landing_pages::created_at.desc())
            .then_order_by(landing_pages::id.desc())
            .load::<DbLandingPage>(&mut conn)?;

        into_domain(pages)
    }
}

impl LandingPageWriter for DieselRepository {
    fn create_landing_page(&self, new_page: &NewLandingPage) -> RepositoryResult<LandingPage> {
        use crate::schema::landing_pages;

        let mut conn = self.conn()?;

        let db_new_page = DbNewLandingPage::try_from(new_page)?;

        let db_page = diesel::insert_into(landing_pages::table)
            .values(&db_new_page)
            .get_result::<DbLandingPage>(&mut conn)?;

        LandingPage::try_from(db_page).map_err(RepositoryError::from)
    }

    fn set_landing_page_published(
        &self,
        id: LandingPageId,
        published: bool,
    ) -> RepositoryResult<LandingPage> {
        use crate::schema::landing_pages;

        let mut conn = self.conn()?;

        let db_page = diesel::update(landing_pages::table.find(id.get()))
            .set((
                landing_pages::published.eq(published),
                landing_pages::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbLandingPage>(&mut conn)?;

        LandingPage::try_from(db_page).map_err(RepositoryError::from)
    }

    fn delete_landing_page(&self, id: LandingPageId) -> RepositoryResult<()> {
        use crate::schema::landing_pages;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(landing_pages::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
