//! Landing page generator and the public pages it produces.

use crate::domain::contact_request::ContactRequest;
use crate::domain::landing_page::{LandingBrief, LandingPage};
use crate::domain::types::{LandingPageId, Slug};
use crate::domain::user_profile::UserProfile;
use crate::dto::landing_pages::LandingPagesData;
use crate::forms::contact_requests::ContactRequestForm;
use crate::forms::landing_pages::LandingPageForm;
use crate::repository::{ContactRequestWriter, LandingPageReader, LandingPageWriter};
use crate::services::access::ensure_staff;
use crate::services::contact_requests::submit_contact_request;
use crate::services::{ServiceError, ServiceResult, log_failure};

const SLUG_SUFFIX_LEN: usize = 4;

fn slug_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..SLUG_SUFFIX_LEN].to_string()
}

pub fn list_landing_pages<R>(repo: &R, actor: &UserProfile) -> ServiceResult<LandingPagesData>
where
    R: LandingPageReader + ?Sized,
{
    ensure_staff(actor)?;

    let pages = repo
        .list_landing_pages()
        .map_err(log_failure("Failed to list landing pages"))?;

    Ok(LandingPagesData { pages })
}

/// Builds and stores a draft page from the generator form.
pub fn generate_landing_page<R>(
    repo: &R,
    actor: &UserProfile,
    form: LandingPageForm,
) -> ServiceResult<LandingPage>
where
    R: LandingPageWriter + ?Sized,
{
    ensure_staff(actor)?;

    let brief = LandingBrief::try_from(form)?;
    let new_page = brief.generate(actor.id, &slug_suffix())?;

    let page = repo
        .create_landing_page(&new_page)
        .map_err(log_failure("Failed to create landing page"))?;

    log::info!("{} generated landing page {}", actor.email, page.slug);

    Ok(page)
}

pub fn set_landing_page_published<R>(
    repo: &R,
    actor: &UserProfile,
    page_id: i32,
    published: bool,
) -> ServiceResult<LandingPage>
where
    R: LandingPageWriter + ?Sized,
{
    ensure_staff(actor)?;

    repo.set_landing_page_published(LandingPageId::new(page_id)?, published)
        .map_err(log_failure("Failed to update landing page"))
        .map_err(ServiceError::from)
}

pub fn delete_landing_page<R>(repo: &R, actor: &UserProfile, page_id: i32) -> ServiceResult<()>
where
    R: LandingPageWriter + ?Sized,
{
    ensure_staff(actor)?;

    repo.delete_landing_page(LandingPageId::new(page_id)?)
        .map_err(log_failure("Failed to delete landing page"))?;

    Ok(())
}

/// Loads a page for anonymous visitors. Drafts and unknown slugs are not found.
pub fn load_public_page<R>(repo: &R, slug: &str) -> ServiceResult<LandingPage>
where
    R: LandingPageReader + ?Sized,
{
    let slug = Slug::new(slug).map_err(|_| ServiceError::NotFound)?;

    repo.get_landing_page_by_slug(&slug)
        .map_err(log_failure("Failed to load landing page"))?
        .filter(|page| page.published)
        .ok_or(ServiceError::NotFound)
}

/// Stores a contact request submitted through a published page.
pub fn submit_landing_contact<R>(
    repo: &R,
    slug: &str,
    form: ContactRequestForm,
) -> ServiceResult<(LandingPage, ContactRequest)>
where
    R: LandingPageReader + ContactRequestWriter + ?Sized,
{
    let page = load_public_page(repo, slug)?;
    let request = submit_contact_request(repo, form, &page.request_source())?;
    Ok((page, request))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{
        ContactRequestId, ContactRequestStatus, EmailAddress, LandingTheme, PersonName,
        ProfileId, SanitizedText, Subject,
    };
    use crate::repository::mock::MockRepository;
    use crate::services::access::fixtures;
    use chrono::Utc;

    fn page(published: bool) -> LandingPage {
        let now = Utc::now().naive_utc();
        LandingPage {
            id: LandingPageId::new(4).unwrap(),
            slug: Slug::new("nordic-cleaning-ab12").unwrap(),
            title: "Nordic Cleaning".into(),
            headline: "Nordic Cleaning: Office cleaning".into(),
            subheadline: None,
            sections: Vec::new(),
            cta_label: "Get in touch".into(),
            theme: LandingTheme::Light,
            published,
            created_by: ProfileId::new(1).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn contact_form() -> ContactRequestForm {
        ContactRequestForm {
            name: "Jane Roe".into(),
            email: "jane@example.com".into(),
            phone: None,
            company: None,
            subject: "Quote".into(),
            message: "Weekly cleaning please".into(),
        }
    }

    #[test]
    fn suffix_has_four_characters() {
        let suffix = slug_suffix();
        assert_eq!(suffix.len(), SLUG_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn customers_cannot_generate_pages() {
        let mut repo = MockRepository::new();
        repo.expect_create_landing_page().times(0);

        let form = LandingPageForm {
            business_name: "Nordic Cleaning".into(),
            tagline: None,
            services: "Office cleaning".into(),
            cta_label: None,
            theme: None,
        };

        assert!(matches!(
            generate_landing_page(&repo, &fixtures::customer(), form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn generated_pages_start_as_drafts_with_suffix() {
        let mut repo = MockRepository::new();
        repo.expect_create_landing_page()
            .withf(|new| new.slug.as_str().starts_with("nordic-cleaning-") && new.sections.len() == 2)
            .returning(|_| Ok(page(false)));

        let form = LandingPageForm {
            business_name: "Nordic Cleaning".into(),
            tagline: Some("Spotless".into()),
            services: "Office cleaning\n\nWindows".into(),
            cta_label: None,
            theme: Some("dark".into()),
        };

        let created = generate_landing_page(&repo, &fixtures::employee(), form).unwrap();
        assert!(!created.published);
    }

    #[test]
    fn drafts_are_not_public() {
        let mut repo = MockRepository::new();
        repo.expect_get_landing_page_by_slug()
            .returning(|_| Ok(Some(page(false))));

        assert!(matches!(
            load_public_page(&repo, "nordic-cleaning-ab12"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn malformed_slugs_are_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_landing_page_by_slug().times(0);

        assert!(matches!(
            load_public_page(&repo, "../etc"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn landing_contact_is_tagged_with_the_slug() {
        let mut repo = MockRepository::new();
        repo.expect_get_landing_page_by_slug()
            .returning(|_| Ok(Some(page(true))));
        repo.expect_create_contact_request()
            .withf(|new| new.source == "landing:nordic-cleaning-ab12")
            .returning(|new| {
                let now = Utc::now().naive_utc();
                Ok(ContactRequest {
                    id: ContactRequestId::new(1).unwrap(),
                    name: PersonName::new(new.name.as_str()).unwrap(),
                    email: EmailAddress::new(new.email.as_str()).unwrap(),
                    phone: None,
                    company: None,
                    subject: Subject::new(new.subject.as_str()).unwrap(),
                    message: SanitizedText::new(new.message.as_str()).unwrap(),
                    source: new.source.clone(),
                    status: ContactRequestStatus::New,
                    assignee_id: None,
                    customer_id: None,
                    created_at: now,
                    updated_at: now,
                    responded_at: None,
                })
            });

        let (_, request) =
            submit_landing_contact(&repo, "nordic-cleaning-ab12", contact_form()).unwrap();

        assert_eq!(request.source, "landing:nordic-cleaning-ab12");
    }
}
