//! Persistence traits and their Diesel implementation.
//!
//! Each aggregate has a `*Reader` and a `*Writer` trait so services can ask for
//! exactly the capabilities they use. [`DieselRepository`] implements all of
//! them on top of the SQLite pool.

use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::contact_request::{ContactRequest, NewContactRequest};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::landing_page::{LandingPage, NewLandingPage};
use crate::domain::legal_document::{LegalDocument, UpsertLegalDocument};
use crate::domain::task::{NewTask, NewTaskComment, Task, TaskComment};
use crate::domain::types::{
    ContactRequestId, ContactRequestStatus, CustomerId, EmailAddress, ExecutionId,
    ExecutionStatus, LandingPageId, LegalDocumentKind, ProfileId, Role, Slug, TaskId, TaskStatus,
    TypeConstraintError,
};
use crate::domain::user_profile::{NewUserProfile, UserProfile};
use crate::domain::workflow::{ExecutionUpdate, NewWorkflowExecution, WorkflowExecution};
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod contact_request;
pub mod customer;
pub mod errors;
pub mod landing_page;
pub mod legal_document;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod task;
pub mod user_profile;
pub mod workflow_execution;

#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Converts loaded rows into domain values, failing on the first invalid row.
fn into_domain<Row, T>(rows: Vec<Row>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<Row, Error = TypeConstraintError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(RepositoryError::from))
        .collect()
}

/// Folds `(status, count)` rows into typed pairs, skipping unknown statuses.
fn status_counts<S>(rows: Vec<(String, i64)>) -> Vec<(S, usize)>
where
    S: std::str::FromStr,
{
    rows.into_iter()
        .filter_map(|(status, count)| {
            status
                .parse::<S>()
                .ok()
                .map(|status| (status, count as usize))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Offset of the first row. Pages past the addressable range clamp to
    /// `i64::MAX` and come back empty.
    fn offset(&self) -> i64 {
        let offset = (self.page.max(1) - 1).saturating_mul(self.per_page);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerListQuery {
    /// Matches name, email, phone or company.
    pub search: Option<String>,
    /// Restricts the list to customers assigned to this profile.
    pub assigned_to: Option<ProfileId>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn assigned_to(mut self, profile_id: ProfileId) -> Self {
        self.assigned_to = Some(profile_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRequestListQuery {
    pub status: Option<ContactRequestStatus>,
    pub assignee: Option<ProfileId>,
    pub pagination: Option<Pagination>,
}

impl ContactRequestListQuery {
    pub fn status(mut self, status: ContactRequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn assignee(mut self, profile_id: ProfileId) -> Self {
        self.assignee = Some(profile_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Which tickets a list or count covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskScope {
    #[default]
    All,
    /// Tickets raised by the profile.
    RequestedBy(ProfileId),
    /// Tickets assigned to the profile plus unassigned ones.
    WorkableBy(ProfileId),
    /// Tickets assigned to the profile only.
    AssignedTo(ProfileId),
    Unassigned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub scope: TaskScope,
    pub status: Option<TaskStatus>,
    pub pagination: Option<Pagination>,
}

impl TaskListQuery {
    pub fn new(scope: TaskScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionListQuery {
    pub workflow_id: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ExecutionListQuery {
    pub fn workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait UserProfileReader {
    fn get_profile_by_id(&self, id: ProfileId) -> RepositoryResult<Option<UserProfile>>;
    fn get_profile_by_subject(&self, subject: &str) -> RepositoryResult<Option<UserProfile>>;
    fn list_profiles(&self) -> RepositoryResult<Vec<UserProfile>>;
    /// Profiles holding the admin or employee role.
    fn list_staff(&self) -> RepositoryResult<Vec<UserProfile>>;
}

pub trait UserProfileWriter {
    fn create_profile(&self, new_profile: &NewUserProfile) -> RepositoryResult<UserProfile>;
    fn update_profile_role(&self, id: ProfileId, role: Role) -> RepositoryResult<UserProfile>;
}

pub trait CustomerReader {
    fn get_customer_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>>;
    fn get_customer_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<Customer>>;
    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    fn list_customer_assignees(&self, id: CustomerId) -> RepositoryResult<Vec<UserProfile>>;
    fn is_customer_assigned(
        &self,
        customer_id: CustomerId,
        profile_id: ProfileId,
    ) -> RepositoryResult<bool>;
}

pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
    fn update_customer(
        &self,
        id: CustomerId,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer>;
    fn delete_customer(&self, id: CustomerId) -> RepositoryResult<()>;
    /// Replaces the set of profiles assigned to the customer.
    fn set_customer_assignees(
        &self,
        id: CustomerId,
        profile_ids: &[ProfileId],
    ) -> RepositoryResult<usize>;
}

pub trait ContactRequestReader {
    fn get_contact_request_by_id(
        &self,
        id: ContactRequestId,
    ) -> RepositoryResult<Option<ContactRequest>>;
    fn list_contact_requests(
        &self,
        query: ContactRequestListQuery,
    ) -> RepositoryResult<(usize, Vec<ContactRequest>)>;
    /// Number of requests per status, optionally limited to one assignee.
    fn count_contact_requests_by_status(
        &self,
        assignee: Option<ProfileId>,
    ) -> RepositoryResult<Vec<(ContactRequestStatus, usize)>>;
}

pub trait ContactRequestWriter {
    fn create_contact_request(
        &self,
        new_request: &NewContactRequest,
    ) -> RepositoryResult<ContactRequest>;
    fn update_contact_request_status(
        &self,
        id: ContactRequestId,
        status: ContactRequestStatus,
        responded_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<ContactRequest>;
    fn assign_contact_request(
        &self,
        id: ContactRequestId,
        assignee: Option<ProfileId>,
    ) -> RepositoryResult<ContactRequest>;
    /// Links the request to a customer, creating it unless one with the same
    /// email exists, and marks the request converted. Runs in one transaction.
    fn convert_contact_request(
        &self,
        id: ContactRequestId,
        new_customer: &NewCustomer,
    ) -> RepositoryResult<(ContactRequest, Customer)>;
}

pub trait TaskReader {
    fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)>;
    fn count_tasks_by_status(&self, scope: TaskScope)
    -> RepositoryResult<Vec<(TaskStatus, usize)>>;
    /// Comments with their authors, oldest first.
    fn list_task_comments(&self, id: TaskId) -> RepositoryResult<Vec<(TaskComment, UserProfile)>>;
}

pub trait TaskWriter {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
    fn update_task_status(&self, id: TaskId, status: TaskStatus) -> RepositoryResult<Task>;
    fn assign_task(&self, id: TaskId, assignee: Option<ProfileId>) -> RepositoryResult<Task>;
    fn create_task_comment(&self, comment: &NewTaskComment) -> RepositoryResult<TaskComment>;
}

pub trait LandingPageReader {
    fn get_landing_page_by_id(&self, id: LandingPageId) -> RepositoryResult<Option<LandingPage>>;
    fn get_landing_page_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<LandingPage>>;
    fn list_landing_pages(&self) -> RepositoryResult<Vec<LandingPage>>;
}

pub trait LandingPageWriter {
    fn create_landing_page(&self, new_page: &NewLandingPage) -> RepositoryResult<LandingPage>;
    fn set_landing_page_published(
        &self,
        id: LandingPageId,
        published: bool,
    ) -> RepositoryResult<LandingPage>;
    fn delete_landing_page(&self, id: LandingPageId) -> RepositoryResult<()>;
}

pub trait LegalDocumentReader {
    fn get_legal_document(&self, kind: LegalDocumentKind)
    -> RepositoryResult<Option<LegalDocument>>;
    fn list_legal_documents(&self) -> RepositoryResult<Vec<LegalDocument>>;
}

pub trait LegalDocumentWriter {
    fn upsert_legal_document(
        &self,
        document: &UpsertLegalDocument,
    ) -> RepositoryResult<LegalDocument>;
}

pub trait WorkflowExecutionReader {
    fn get_execution_by_id(&self, id: ExecutionId) -> RepositoryResult<Option<WorkflowExecution>>;
    fn list_executions(
        &self,
        query: ExecutionListQuery,
    ) -> RepositoryResult<(usize, Vec<WorkflowExecution>)>;
    /// Executions that are still running or waiting, newest first.
    fn list_active_executions(&self) -> RepositoryResult<Vec<WorkflowExecution>>;
    fn count_executions_by_status(&self) -> RepositoryResult<Vec<(ExecutionStatus, usize)>>;
}

pub trait WorkflowExecutionWriter {
    fn create_execution(
        &self,
        execution: &NewWorkflowExecution,
    ) -> RepositoryResult<WorkflowExecution>;
    fn update_execution(
        &self,
        id: ExecutionId,
        update: &ExecutionUpdate,
    ) -> RepositoryResult<WorkflowExecution>;
}
