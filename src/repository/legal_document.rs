use chrono::Utc;
use diesel::prelude::*;

use crate::domain::legal_document::{LegalDocument, UpsertLegalDocument};
use crate::domain::types::LegalDocumentKind;
use crate::models::legal_document::{
    LegalDocument as DbLegalDocument, UpsertLegalDocument as DbUpsertLegalDocument,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, LegalDocumentReader, LegalDocumentWriter, into_domain};

impl LegalDocumentReader for DieselRepository {
    fn get_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> RepositoryResult<Option<LegalDocument>> {
        use crate::schema::legal_documents;

        let mut conn = self.conn()?;

        let document = legal_documents::table
            .find(kind.as_str())
            .first::<DbLegalDocument>(&mut conn)
            .optional()?;

        document
            .map(LegalDocument::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_legal_documents(&self) -> RepositoryResult<Vec<LegalDocument>> {
        use crate::schema::legal_documents;

        let mut conn = self.conn()?;

        let documents = legal_documents::table
            .order(legal_documents::kind.asc())
            .load::<DbLegalDocument>(&mut conn)?;

        into_domain(documents)
    }
}

impl LegalDocumentWriter for DieselRepository {
    fn upsert_legal_document(
        &self,
        document: &UpsertLegalDocument,
    ) -> RepositoryResult<LegalDocument> {
        use crate::schema::legal_documents;

        let mut conn = self.conn()?;

        let row = DbUpsertLegalDocument::from_domain(document, Utc::now().naive_utc());

        let db_document = diesel::insert_into(legal_documents::table)
            .values(&row)
            .on_conflict(legal_documents::kind)
            .do_update()
            .set(&row)
            .get_result::<DbLegalDocument>(&mut conn)?;

        LegalDocument::try_from(db_document).map_err(RepositoryError::from)
    }
}
