//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::contact_request::{ContactRequest, NewContactRequest};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::landing_page::{LandingPage, NewLandingPage};
use crate::domain::legal_document::{LegalDocument, UpsertLegalDocument};
use crate::domain::task::{NewTask, NewTaskComment, Task, TaskComment};
use crate::domain::types::{
    ContactRequestId, ContactRequestStatus, CustomerId, EmailAddress, ExecutionId,
    ExecutionStatus, LandingPageId, LegalDocumentKind, ProfileId, Role, Slug, TaskId, TaskStatus,
};
use crate::domain::user_profile::{NewUserProfile, UserProfile};
use crate::domain::workflow::{ExecutionUpdate, NewWorkflowExecution, WorkflowExecution};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ContactRequestListQuery, ContactRequestReader, ContactRequestWriter, CustomerListQuery,
    CustomerReader, CustomerWriter, ExecutionListQuery, LandingPageReader, LandingPageWriter,
    LegalDocumentReader, LegalDocumentWriter, TaskListQuery, TaskReader, TaskScope, TaskWriter,
    UserProfileReader, UserProfileWriter, WorkflowExecutionReader, WorkflowExecutionWriter,
};

mock! {
    pub Repository {}

    impl UserProfileReader for Repository {
        fn get_profile_by_id(&self, id: ProfileId) -> RepositoryResult<Option<UserProfile>>;
        fn get_profile_by_subject(&self, subject: &str) -> RepositoryResult<Option<UserProfile>>;
        fn list_profiles(&self) -> RepositoryResult<Vec<UserProfile>>;
        fn list_staff(&self) -> RepositoryResult<Vec<UserProfile>>;
    }

    impl UserProfileWriter for Repository {
        fn create_profile(&self, new_profile: &NewUserProfile) -> RepositoryResult<UserProfile>;
        fn update_profile_role(&self, id: ProfileId, role: Role) -> RepositoryResult<UserProfile>;
    }

    impl CustomerReader for Repository {
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

    impl CustomerWriter for Repository {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
        fn update_customer(
            &self,
            id: CustomerId,
            updates: &UpdateCustomer,
        ) -> RepositoryResult<Customer>;
        fn delete_customer(&self, id: CustomerId) -> RepositoryResult<()>;
        fn set_customer_assignees(
            &self,
            id: CustomerId,
            profile_ids: &[ProfileId],
        ) -> RepositoryResult<usize>;
    }

    impl ContactRequestReader for Repository {
        fn get_contact_request_by_id(
            &self,
            id: ContactRequestId,
        ) -> RepositoryResult<Option<ContactRequest>>;
        fn list_contact_requests(
            &self,
            query: ContactRequestListQuery,
        ) -> RepositoryResult<(usize, Vec<ContactRequest>)>;
        fn count_contact_requests_by_status(
            &self,
            assignee: Option<ProfileId>,
        ) -> RepositoryResult<Vec<(ContactRequestStatus, usize)>>;
    }

    impl ContactRequestWriter for Repository {
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
        fn convert_contact_request(
            &self,
            id: ContactRequestId,
            new_customer: &NewCustomer,
        ) -> RepositoryResult<(ContactRequest, Customer)>;
    }

    impl TaskReader for Repository {
        fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
        fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)>;
        fn count_tasks_by_status(&self, scope: TaskScope) -> RepositoryResult<Vec<(TaskStatus, usize)>>;
        fn list_task_comments(&self, id: TaskId) -> RepositoryResult<Vec<(TaskComment, UserProfile)>>;
    }

    impl TaskWriter for Repository {
        fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
        fn update_task_status(&self, id: TaskId, status: TaskStatus) -> RepositoryResult<Task>;
        fn assign_task(&self, id: TaskId, assignee: Option<ProfileId>) -> RepositoryResult<Task>;
        fn create_task_comment(&self, comment: &NewTaskComment) -> RepositoryResult<TaskComment>;
    }

    impl LandingPageReader for Repository {
        fn get_landing_page_by_id(&self, id: LandingPageId) -> RepositoryResult<Option<LandingPage>>;
        fn get_landing_page_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<LandingPage>>;
        fn list_landing_pages(&self) -> RepositoryResult<Vec<LandingPage>>;
    }

    impl LandingPageWriter for Repository {
        fn create_landing_page(&self, new_page: &NewLandingPage) -> RepositoryResult<LandingPage>;
        fn set_landing_page_published(
            &self,
            id: LandingPageId,
            published: bool,
        ) -> RepositoryResult<LandingPage>;
        fn delete_landing_page(&self, id: LandingPageId) -> RepositoryResult<()>;
    }

    impl LegalDocumentReader for Repository {
        fn get_legal_document(&self, kind: LegalDocumentKind) -> RepositoryResult<Option<LegalDocument>>;
        fn list_legal_documents(&self) -> RepositoryResult<Vec<LegalDocument>>;
    }

    impl LegalDocumentWriter for Repository {
        fn upsert_legal_document(&self, document: &UpsertLegalDocument) -> RepositoryResult<LegalDocument>;
    }

    impl WorkflowExecutionReader for Repository {
        fn get_execution_by_id(&self, id: ExecutionId) -> RepositoryResult<Option<WorkflowExecution>>;
        fn list_executions(
            &self,
            query: ExecutionListQuery,
        ) -> RepositoryResult<(usize, Vec<WorkflowExecution>)>;
        fn list_active_executions(&self) -> RepositoryResult<Vec<WorkflowExecution>>;
        fn count_executions_by_status(&self) -> RepositoryResult<Vec<(ExecutionStatus, usize)>>;
    }

    impl WorkflowExecutionWriter for Repository {
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
}
