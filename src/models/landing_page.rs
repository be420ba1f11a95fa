//! Diesel models for generated landing pages.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::landing_page::{
    LandingPage as DomainLandingPage, LandingSection, NewLandingPage as DomainNewLandingPage,
};
use crate::domain::types::{LandingPageId, ProfileId, Slug, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::landing_pages)]
pub struct LandingPage {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub headline: String,
    pub subheadline: Option<String>,
    /// Sections serialized as a JSON array.
    pub sections: String,
    pub cta_label: String,
    pub theme: String,
    pub published: bool,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::landing_pages)]
pub struct NewLandingPage<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub headline: &'a str,
    pub subheadline: Option<&'a str>,
    pub sections: String,
    pub cta_label: &'a str,
    pub theme: &'a str,
    pub published: bool,
    pub created_by: i32,
}

impl TryFrom<LandingPage> for DomainLandingPage {
    type Error = TypeConstraintError;

    fn try_from(page: LandingPage) -> Result<Self, Self::Error> {
        let sections: Vec<LandingSection> = serde_json::from_str(&page.sections)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("sections: {e}")))?;

        Ok(Self {
            id: LandingPageId::new(page.id)?,
            slug: Slug::new(page.slug)?,
            title: page.title,
            headline: page.headline,
            subheadline: page.subheadline,
            sections,
            cta_label: page.cta_label,
            theme: page.theme.parse()?,
            published: page.published,
            created_by: ProfileId::new(page.created_by)?,
            created_at: page.created_at,
            updated_at: page.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewLandingPage> for NewLandingPage<'a> {
    type Error = TypeConstraintError;

    fn try_from(page: &'a DomainNewLandingPage) -> Result<Self, Self::Error> {
        let sections = serde_json::to_string(&page.sections)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("sections: {e}")))?;

        Ok(Self {
            slug: page.slug.as_str(),
            title: page.title.as_str(),
            headline: page.headline.as_str(),
            subheadline: page.subheadline.as_deref(),
            sections,
            cta_label: page.cta_label.as_str(),
            theme: page.theme.as_str(),
            published: false,
            created_by: page.created_by.get(),
        })
    }
}
