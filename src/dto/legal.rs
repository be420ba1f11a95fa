use serde::Serialize;

use crate::domain::types::LegalDocumentKind;

/// Editor state for one legal page; empty body when not written yet.
#[derive(Debug, Serialize)]
pub struct LegalEditorData {
    pub kind: LegalDocumentKind,
    pub title: String,
    pub body: String,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct LegalIndexEntry {
    pub kind: LegalDocumentKind,
    pub title: String,
    pub exists: bool,
}
