//! Contact-request intake and triage.

use chrono::Utc;

use crate::domain::contact_request::{ContactRequest, TransitionDenied, check_transition};
use crate::domain::customer::NewCustomer;
use crate::domain::types::{ContactRequestId, ContactRequestStatus};
use crate::domain::user_profile::UserProfile;
use crate::dto::StatusCount;
use crate::dto::contact_requests::{
    ConvertedRequest, RequestIndexQuery, RequestPageData, RequestsPageData,
};
use crate::forms::FormError;
use crate::forms::contact_requests::{AssignRequestForm, ContactRequestForm, RequestStatusForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ContactRequestListQuery, ContactRequestReader, ContactRequestWriter, CustomerReader,
    UserProfileReader,
};
use crate::services::access::{ensure_admin, ensure_staff};
use crate::services::{ServiceError, ServiceResult, log_failure};

/// Stores a request coming from a public surface. No authentication needed.
pub fn submit_contact_request<R>(
    repo: &R,
    form: ContactRequestForm,
    source: &str,
) -> ServiceResult<ContactRequest>
where
    R: ContactRequestWriter + ?Sized,
{
    let new_request = form.into_new_request(source)?;

    let request = repo
        .create_contact_request(&new_request)
        .map_err(log_failure("Failed to store contact request"))?;

    log::info!("Contact request {} received from {}", request.id, request.source);

    Ok(request)
}

fn parse_status_filter(status: Option<String>) -> ServiceResult<Option<ContactRequestStatus>> {
    status
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<ContactRequestStatus>()
                .map_err(|_| ServiceError::from(FormError::InvalidStatus))
        })
        .transpose()
}

pub fn list_contact_requests<R>(
    repo: &R,
    actor: &UserProfile,
    query: RequestIndexQuery,
) -> ServiceResult<RequestsPageData>
where
    R: ContactRequestReader + UserProfileReader + ?Sized,
{
    ensure_staff(actor)?;

    let page = query.page.unwrap_or(1).max(1);
    let status = parse_status_filter(query.status)?;

    let mut list_query = ContactRequestListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = status {
        list_query = list_query.status(status);
    }

    let (total, requests) = repo
        .list_contact_requests(list_query)
        .map_err(log_failure("Failed to list contact requests"))?;

    let counts = repo
        .count_contact_requests_by_status(None)
        .map_err(log_failure("Failed to count contact requests"))?;

    let staff = repo.list_staff().map_err(log_failure("Failed to load staff"))?;

    Ok(RequestsPageData {
        requests: Paginated::from_total(requests, page, total, DEFAULT_ITEMS_PER_PAGE),
        counts: StatusCount::complete(ContactRequestStatus::ALL, &counts),
        status: status.map(|s| s.to_string()),
        staff,
    })
}

fn load_request<R>(repo: &R, request_id: i32) -> ServiceResult<ContactRequest>
where
    R: ContactRequestReader + ?Sized,
{
    let request_id = ContactRequestId::new(request_id)?;
    repo.get_contact_request_by_id(request_id)
        .map_err(log_failure("Failed to load contact request"))?
        .ok_or(ServiceError::NotFound)
}

pub fn get_contact_request<R>(
    repo: &R,
    actor: &UserProfile,
    request_id: i32,
) -> ServiceResult<RequestPageData>
where
    R: ContactRequestReader + UserProfileReader + ?Sized,
{
    ensure_staff(actor)?;

    let request = load_request(repo, request_id)?;
    let staff = if actor.is_admin() {
        repo.list_staff().map_err(log_failure("Failed to load staff"))?
    } else {
        Vec::new()
    };

    Ok(RequestPageData { request, staff })
}

/// Moves a request to another triage state. Responding stamps `responded_at`.
pub fn change_request_status<R>(
    repo: &R,
    actor: &UserProfile,
    request_id: i32,
    form: RequestStatusForm,
) -> ServiceResult<ContactRequest>
where
    R: ContactRequestReader + ContactRequestWriter + ?Sized,
{
    ensure_staff(actor)?;

    let target = form.status()?;
    let request = load_request(repo, request_id)?;

    check_transition(actor.role, request.status, target).map_err(|denied| match denied {
        TransitionDenied::Forbidden => ServiceError::Unauthorized,
        TransitionDenied::Unchanged => {
            ServiceError::Form(format!("Request is already {}", request.status))
        }
        TransitionDenied::RequiresConversion => {
            ServiceError::Form("Convert the request to mark it converted".to_string())
        }
        TransitionDenied::Invalid => ServiceError::Form(format!(
            "Cannot move a request from {} to {target}",
            request.status
        )),
    })?;

    let responded_at = (target == ContactRequestStatus::Responded)
        .then(|| Utc::now().naive_utc())
        .or(request.responded_at);

    repo.update_contact_request_status(request.id, target, responded_at)
        .map_err(log_failure("Failed to update contact request"))
        .map_err(ServiceError::from)
}

pub fn assign_contact_request<R>(
    repo: &R,
    actor: &UserProfile,
    request_id: i32,
    form: AssignRequestForm,
) -> ServiceResult<ContactRequest>
where
    R: ContactRequestReader + ContactRequestWriter + UserProfileReader + ?Sized,
{
    ensure_admin(actor)?;

    let assignee = form.assignee()?;
    let request = load_request(repo, request_id)?;

    if let Some(assignee_id) = assignee {
        let profile = repo
            .get_profile_by_id(assignee_id)?
            .ok_or(ServiceError::NotFound)?;
        if !profile.role.is_staff() {
            return Err(ServiceError::Form(
                "Requests can only be assigned to staff".to_string(),
            ));
        }
    }

    repo.assign_contact_request(request.id, assignee)
        .map_err(log_failure("Failed to assign contact request"))
        .map_err(ServiceError::from)
}

/// Turns a request into a customer record. An existing customer with the
/// same email is linked instead of creating a duplicate.
pub fn convert_contact_request<R>(
    repo: &R,
    actor: &UserProfile,
    request_id: i32,
) -> ServiceResult<ConvertedRequest>
where
    R: ContactRequestReader + ContactRequestWriter + CustomerReader + ?Sized,
{
    ensure_staff(actor)?;

    let request = load_request(repo, request_id)?;
    if !request.can_convert() {
        return Err(ServiceError::Conflict(format!(
            "Request {} cannot be converted while {}",
            request.id, request.status
        )));
    }

    let notes = format!("{}\n\n{}", request.subject, request.message);
    let new_customer = NewCustomer::try_new(
        request.company.clone().unwrap_or_else(|| request.name.to_string()),
        Some(request.email.to_string()),
        request.phone.as_ref().map(|p| p.to_string()),
        request.company.clone(),
        Some(notes),
    )?
    .with_source_request(request.id);

    let (request, customer) = repo
        .convert_contact_request(request.id, &new_customer)
        .map_err(log_failure("Failed to convert contact request"))?;

    log::info!(
        "{} converted request {} into customer {}",
        actor.email,
        request.id,
        customer.id
    );

    Ok(ConvertedRequest { request, customer })
}

/// Exports requests, optionally filtered by status, as CSV.
pub fn export_contact_requests_csv<R>(
    repo: &R,
    actor: &UserProfile,
    status: Option<String>,
) -> ServiceResult<String>
where
    R: ContactRequestReader + ?Sized,
{
    ensure_staff(actor)?;

    let mut query = ContactRequestListQuery::default();
    if let Some(status) = parse_status_filter(status)? {
        query = query.status(status);
    }

    let (_, requests) = repo
        .list_contact_requests(query)
        .map_err(log_failure("Failed to list contact requests"))?;

    let write_err = |e: csv::Error| ServiceError::Internal(format!("CSV export failed: {e}"));
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id", "created_at", "status", "name", "email", "phone", "company", "subject",
            "message", "source",
        ])
        .map_err(write_err)?;

    for request in &requests {
        writer
            .write_record([
                request.id.to_string().as_str(),
                request.created_at.format("%Y-%m-%d %H:%M:%S").to_string().as_str(),
                request.status.as_str(),
                request.name.as_str(),
                request.email.as_str(),
                request.phone.as_ref().map_or("", |p| p.as_str()),
                request.company.as_deref().unwrap_or_default(),
                request.subject.as_str(),
                request.message.as_str(),
                request.source.as_str(),
            ])
            .map_err(write_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(format!("CSV export failed: {e}")))?;

    String::from_utf8(bytes).map_err(|e| ServiceError::Internal(e.to_string()))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::customer::Customer;
    use crate::domain::types::{
        CustomerId, CustomerName, EmailAddress, PersonName, SanitizedText, Subject,
    };
    use crate::repository::mock::MockRepository;
    use crate::services::access::fixtures;

    fn request(status: ContactRequestStatus) -> ContactRequest {
        let now = Utc::now().naive_utc();
        ContactRequest {
            id: ContactRequestId::new(7).unwrap(),
            name: PersonName::new("Jane Roe").unwrap(),
            email: EmailAddress::new("jane@example.com").unwrap(),
            phone: None,
            company: Some("Roe Bakery".to_string()),
            subject: Subject::new("Catering").unwrap(),
            message: SanitizedText::new("Need bread for 50").unwrap(),
            source: "api".to_string(),
            status,
            assignee_id: None,
            customer_id: None,
            created_at: now,
            updated_at: now,
            responded_at: None,
        }
    }

    fn status_form(status: &str) -> RequestStatusForm {
        RequestStatusForm {
            status: status.to_string(),
        }
    }

    #[test]
    fn public_submissions_are_stored_with_source() {
        let mut repo = MockRepository::new();
        repo.expect_create_contact_request()
            .withf(|new| new.source == "landing:roe-bakery")
            .returning(|_| Ok(request(ContactRequestStatus::New)));

        let form = ContactRequestForm {
            name: "Jane Roe".into(),
            email: "jane@example.com".into(),
            phone: None,
            company: None,
            subject: "Catering".into(),
            message: "Need bread".into(),
        };

        assert!(submit_contact_request(&repo, form, "landing:roe-bakery").is_ok());
    }

    #[test]
    fn invalid_submissions_never_reach_the_repository() {
        let mut repo = MockRepository::new();
        repo.expect_create_contact_request().times(0);

        let form = ContactRequestForm {
            name: "Jane Roe".into(),
            email: "not-an-email".into(),
            phone: None,
            company: None,
            subject: "Catering".into(),
            message: "Need bread".into(),
        };

        assert!(matches!(
            submit_contact_request(&repo, form, "api"),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn responding_stamps_responded_at() {
        let mut repo = MockRepository::new();
        repo.expect_get_contact_request_by_id()
            .returning(|_| Ok(Some(request(ContactRequestStatus::InProgress))));
        repo.expect_update_contact_request_status()
            .withf(|_, status, responded_at| {
                *status == ContactRequestStatus::Responded && responded_at.is_some()
            })
            .returning(|_, status, _| Ok(request(status)));

        let updated = change_request_status(
            &repo,
            &fixtures::employee(),
            7,
            status_form("responded"),
        )
        .unwrap();

        assert_eq!(updated.status, ContactRequestStatus::Responded);
    }

    #[test]
    fn employees_cannot_archive() {
        let mut repo = MockRepository::new();
        repo.expect_get_contact_request_by_id()
            .returning(|_| Ok(Some(request(ContactRequestStatus::New))));
        repo.expect_update_contact_request_status().times(0);

        let result = change_request_status(
            &repo,
            &fixtures::employee(),
            7,
            status_form("archived"),
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn setting_the_same_status_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_contact_request_by_id()
            .returning(|_| Ok(Some(request(ContactRequestStatus::New))));

        let result = change_request_status(&repo, &fixtures::admin(), 7, status_form("new"));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn conversion_builds_customer_from_request() {
        let mut repo = MockRepository::new();
        repo.expect_get_contact_request_by_id()
            .returning(|_| Ok(Some(request(ContactRequestStatus::Responded))));
        repo.expect_convert_contact_request()
            .withf(|id, new| {
                id.get() == 7
                    && new.name.as_str() == "Roe Bakery"
                    && new.source_request_id == Some(*id)
                    && new.notes.as_deref() == Some("Catering\n\nNeed bread for 50")
            })
            .returning(|_, new| {
                let now = Utc::now().naive_utc();
                let mut converted = request(ContactRequestStatus::Converted);
                converted.customer_id = Some(CustomerId::new(3).unwrap());
                let customer = Customer {
                    id: CustomerId::new(3).unwrap(),
                    name: CustomerName::new(new.name.as_str()).unwrap(),
                    email: new.email.clone(),
                    phone: None,
                    company: new.company.clone(),
                    notes: new.notes.clone(),
                    source_request_id: new.source_request_id,
                    created_at: now,
                    updated_at: now,
                };
                Ok((converted, customer))
            });

        let converted = convert_contact_request(&repo, &fixtures::employee(), 7).unwrap();

        assert_eq!(converted.request.status, ContactRequestStatus::Converted);
        assert_eq!(converted.customer.id.get(), 3);
    }

    #[test]
    fn converted_requests_cannot_be_converted_again() {
        let mut repo = MockRepository::new();
        repo.expect_get_contact_request_by_id()
            .returning(|_| Ok(Some(request(ContactRequestStatus::Converted))));
        repo.expect_convert_contact_request().times(0);

        let result = convert_contact_request(&repo, &fixtures::admin(), 7);

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn only_staff_can_be_assigned() {
        let mut repo = MockRepository::new();
        repo.expect_get_contact_request_by_id()
            .returning(|_| Ok(Some(request(ContactRequestStatus::New))));
        repo.expect_get_profile_by_id()
            .returning(|_| Ok(Some(fixtures::customer())));
        repo.expect_assign_contact_request().times(0);

        let form = AssignRequestForm {
            assignee_id: Some("3".to_string()),
        };
        let result = assign_contact_request(&repo, &fixtures::admin(), 7, form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn export_writes_header_and_rows() {
        let mut repo = MockRepository::new();
        repo.expect_list_contact_requests()
            .withf(|query| query.status == Some(ContactRequestStatus::New))
            .returning(|_| Ok((1, vec![request(ContactRequestStatus::New)])));

        let csv = export_contact_requests_csv(&repo, &fixtures::admin(), Some("new".into()))
            .unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("id,created_at,status,name,email,phone,company,subject,message,source")
        );
        assert!(lines.next().is_some_and(|row| row.starts_with("7,")));
    }
}
