use serde::Deserialize;
use validator::Validate;

use crate::domain::legal_document::UpsertLegalDocument;
use crate::domain::types::{LegalDocumentKind, ProfileId, SanitizedText};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct LegalDocumentForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
}

impl LegalDocumentForm {
    pub fn into_upsert(
        self,
        kind: LegalDocumentKind,
        updated_by: ProfileId,
    ) -> Result<UpsertLegalDocument, FormError> {
        self.validate()?;
        Ok(UpsertLegalDocument {
            kind,
            title: self.title.trim().to_string(),
            body: SanitizedText::new(self.body)?,
            updated_by,
        })
    }
}
