use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::legal_document::{
    LegalDocument as DomainLegalDocument, UpsertLegalDocument as DomainUpsertLegalDocument,
};
use crate::domain::types::{ProfileId, SanitizedText, TypeConstraintError};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::legal_documents)]
pub struct LegalDocument {
    pub kind: String,
    pub title: String,
    pub body: String,
    pub updated_by: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::legal_documents)]
pub struct UpsertLegalDocument<'a> {
    pub kind: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub updated_by: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<LegalDocument> for DomainLegalDocument {
    type Error = TypeConstraintError;

    fn try_from(document: LegalDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: document.kind.parse()?,
            title: document.title,
            body: SanitizedText::from_trusted(document.body),
            updated_by: document.updated_by.map(ProfileId::new).transpose()?,
            updated_at: document.updated_at,
        })
    }
}

impl<'a> UpsertLegalDocument<'a> {
    pub fn from_domain(document: &'a DomainUpsertLegalDocument, updated_at: NaiveDateTime) -> Self {
        Self {
            kind: document.kind.as_str(),
            title: document.title.as_str(),
            body: document.body.as_str(),
            updated_by: Some(document.updated_by.get()),
            updated_at,
        }
    }
}
