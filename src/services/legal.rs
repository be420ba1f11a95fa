//! Public legal pages and their admin editor.

use crate::domain::legal_document::LegalDocument;
use crate::domain::types::LegalDocumentKind;
use crate::domain::user_profile::UserProfile;
use crate::dto::legal::{LegalEditorData, LegalIndexEntry};
use crate::forms::legal::LegalDocumentForm;
use crate::repository::{LegalDocumentReader, LegalDocumentWriter};
use crate::services::access::ensure_admin;
use crate::services::{ServiceError, ServiceResult, log_failure};

fn parse_kind(kind: &str) -> ServiceResult<LegalDocumentKind> {
    kind.parse().map_err(|_| ServiceError::NotFound)
}

/// Loads a published legal page. Unknown kinds and unwritten pages are not found.
pub fn load_legal_document<R>(repo: &R, kind: &str) -> ServiceResult<LegalDocument>
where
    R: LegalDocumentReader + ?Sized,
{
    let kind = parse_kind(kind)?;

    repo.get_legal_document(kind)
        .map_err(log_failure("Failed to load legal document"))?
        .ok_or(ServiceError::NotFound)
}

/// One entry per known kind, marking which ones have been written.
pub fn list_legal_documents<R>(repo: &R) -> ServiceResult<Vec<LegalIndexEntry>>
where
    R: LegalDocumentReader + ?Sized,
{
    let documents = repo
        .list_legal_documents()
        .map_err(log_failure("Failed to list legal documents"))?;

    Ok(LegalDocumentKind::ALL
        .iter()
        .map(|kind| match documents.iter().find(|doc| doc.kind == *kind) {
            Some(doc) => LegalIndexEntry {
                kind: *kind,
                title: doc.title.clone(),
                exists: true,
            },
            None => LegalIndexEntry {
                kind: *kind,
                title: kind.default_title().to_string(),
                exists: false,
            },
        })
        .collect())
}

pub fn load_legal_editor<R>(
    repo: &R,
    actor: &UserProfile,
    kind: &str,
) -> ServiceResult<LegalEditorData>
where
    R: LegalDocumentReader + ?Sized,
{
    ensure_admin(actor)?;

    let kind = parse_kind(kind)?;
    let existing = repo
        .get_legal_document(kind)
        .map_err(log_failure("Failed to load legal document"))?;

    Ok(match existing {
        Some(doc) => LegalEditorData {
            kind,
            title: doc.title,
            body: doc.body.into_inner(),
            exists: true,
        },
        None => LegalEditorData {
            kind,
            title: kind.default_title().to_string(),
            body: String::new(),
            exists: false,
        },
    })
}

pub fn save_legal_document<R>(
    repo: &R,
    actor: &UserProfile,
    kind: &str,
    form: LegalDocumentForm,
) -> ServiceResult<LegalDocument>
where
    R: LegalDocumentWriter + ?Sized,
{
    ensure_admin(actor)?;

    let kind = parse_kind(kind)?;
    let document = form.into_upsert(kind, actor.id)?;

    let saved = repo
        .upsert_legal_document(&document)
        .map_err(log_failure("Failed to save legal document"))?;

    log::info!("{} updated the {} page", actor.email, saved.kind);

    Ok(saved)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{ProfileId, SanitizedText};
    use crate::repository::mock::MockRepository;
    use crate::services::access::fixtures;
    use chrono::Utc;

    fn privacy() -> LegalDocument {
        LegalDocument {
            kind: LegalDocumentKind::Privacy,
            title: "Privacy".into(),
            body: SanitizedText::new("<p>We keep little.</p>").unwrap(),
            updated_by: Some(ProfileId::new(1).unwrap()),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn unknown_kinds_are_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_legal_document().times(0);

        assert!(matches!(
            load_legal_document(&repo, "gdpr"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn unwritten_pages_are_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_legal_document().returning(|_| Ok(None));

        assert!(matches!(
            load_legal_document(&repo, "terms"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn index_lists_every_kind() {
        let mut repo = MockRepository::new();
        repo.expect_list_legal_documents()
            .returning(|| Ok(vec![privacy()]));

        let entries = list_legal_documents(&repo).unwrap();

        assert_eq!(entries.len(), LegalDocumentKind::ALL.len());
        assert!(entries[0].exists);
        assert_eq!(entries[1].title, "Terms of Service");
        assert!(!entries[1].exists);
    }

    #[test]
    fn editor_prefills_default_title() {
        let mut repo = MockRepository::new();
        repo.expect_get_legal_document().returning(|_| Ok(None));

        let data = load_legal_editor(&repo, &fixtures::admin(), "imprint").unwrap();

        assert_eq!(data.title, "Imprint");
        assert!(!data.exists);
    }

    #[test]
    fn only_admins_save_and_bodies_are_sanitized() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_legal_document()
            .withf(|doc| !doc.body.as_str().contains("<script>"))
            .times(1)
            .returning(|_| Ok(privacy()));

        let form = || LegalDocumentForm {
            title: "Privacy".into(),
            body: "<p>ok</p><script>alert(1)</script>".into(),
        };

        assert!(matches!(
            save_legal_document(&repo, &fixtures::employee(), "privacy", form()),
            Err(ServiceError::Unauthorized)
        ));
        assert!(save_legal_document(&repo, &fixtures::admin(), "privacy", form()).is_ok());
    }
}
