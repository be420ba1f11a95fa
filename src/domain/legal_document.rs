use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{LegalDocumentKind, ProfileId, SanitizedText};

/// Public legal page such as the privacy policy or terms of service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LegalDocument {
    pub kind: LegalDocumentKind,
    pub title: String,
    pub body: SanitizedText,
    pub updated_by: Option<ProfileId>,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct UpsertLegalDocument {
    pub kind: LegalDocumentKind,
    pub title: String,
    pub body: SanitizedText,
    pub updated_by: ProfileId,
}

impl LegalDocumentKind {
    /// Title used when an admin opens an empty editor.
    pub const fn default_title(self) -> &'static str {
        match self {
            LegalDocumentKind::Privacy => "Privacy Policy",
            LegalDocumentKind::Terms => "Terms of Service",
            LegalDocumentKind::Imprint => "Imprint",
            LegalDocumentKind::Cookies => "Cookie Policy",
        }
    }
}
