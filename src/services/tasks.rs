//! Ticketing for customers and staff.

use validator::Validate;

use crate::domain::task::{NewTaskComment, Task, TaskComment, can_change_status};
use crate::domain::types::{CustomerId, ProfileId, Role, TaskId, TaskStatus};
use crate::domain::user_profile::UserProfile;
use crate::dto::StatusCount;
use crate::dto::tasks::{CommentView, TaskIndexQuery, TaskPageData, TasksPageData};
use crate::forms::FormError;
use crate::forms::tasks::{AssignTaskForm, NewTaskForm, TaskCommentForm, TaskStatusForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CustomerReader, TaskListQuery, TaskReader, TaskScope, TaskWriter, UserProfileReader,
};
use crate::services::access::{ensure_admin, ensure_role};
use crate::services::{ServiceError, ServiceResult, log_failure};

/// Tickets a profile works with by default.
pub fn task_scope(actor: &UserProfile) -> TaskScope {
    match actor.role {
        Role::Admin => TaskScope::All,
        Role::Employee => TaskScope::WorkableBy(actor.id),
        Role::Customer => TaskScope::RequestedBy(actor.id),
    }
}

fn load_visible<R>(repo: &R, actor: &UserProfile, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + ?Sized,
{
    let task = repo
        .get_task_by_id(TaskId::new(task_id)?)
        .map_err(log_failure("Failed to load task"))?
        .ok_or(ServiceError::NotFound)?;

    if !task.is_visible_to(actor.id, actor.role) {
        return Err(ServiceError::Unauthorized);
    }

    Ok(task)
}

/// Admins see every customer, employees only the ones assigned to them.
fn can_see_customer<R>(
    repo: &R,
    actor: &UserProfile,
    customer_id: CustomerId,
) -> ServiceResult<bool>
where
    R: CustomerReader + ?Sized,
{
    match actor.role {
        Role::Admin => Ok(true),
        Role::Employee => repo
            .is_customer_assigned(customer_id, actor.id)
            .map_err(log_failure("Failed to check customer assignment"))
            .map_err(ServiceError::from),
        Role::Customer => Ok(false),
    }
}

fn ensure_staff_assignee<R>(repo: &R, assignee_id: ProfileId) -> ServiceResult<()>
where
    R: UserProfileReader + ?Sized,
{
    let profile = repo
        .get_profile_by_id(assignee_id)
        .map_err(log_failure("Failed to load assignee"))?
        .ok_or(ServiceError::NotFound)?;
    if !profile.role.is_staff() {
        return Err(ServiceError::Form(
            "Tickets can only be assigned to staff".to_string(),
        ));
    }
    Ok(())
}

pub fn list_tasks<R>(
    repo: &R,
    actor: &UserProfile,
    query: TaskIndexQuery,
) -> ServiceResult<TasksPageData>
where
    R: TaskReader + ?Sized,
{
    let page = query.page.unwrap_or(1).max(1);
    let status = query
        .status
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<TaskStatus>()
                .map_err(|_| ServiceError::from(FormError::InvalidStatus))
        })
        .transpose()?;

    let scope = task_scope(actor);
    let mut list_query = TaskListQuery::new(scope).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = status {
        list_query = list_query.status(status);
    }

    let (total, tasks) = repo
        .list_tasks(list_query)
        .map_err(log_failure("Failed to list tasks"))?;
    let counts = repo
        .count_tasks_by_status(scope)
        .map_err(log_failure("Failed to count tasks"))?;

    Ok(TasksPageData {
        tasks: Paginated::from_total(tasks, page, total, DEFAULT_ITEMS_PER_PAGE),
        counts: StatusCount::complete(TaskStatus::ALL, &counts),
        status: status.map(|s| s.to_string()),
    })
}

pub fn show_task<R>(repo: &R, actor: &UserProfile, task_id: i32) -> ServiceResult<TaskPageData>
where
    R: TaskReader + CustomerReader + UserProfileReader + ?Sized,
{
    let task = load_visible(repo, actor, task_id)?;

    let customer = match task.customer_id {
        Some(customer_id) if can_see_customer(repo, actor, customer_id)? => repo
            .get_customer_by_id(customer_id)
            .map_err(log_failure("Failed to load task customer"))?,
        _ => None,
    };

    let comments = repo
        .list_task_comments(task.id)
        .map_err(log_failure("Failed to load comments"))?
        .into_iter()
        .map(|(comment, author)| CommentView { comment, author })
        .collect();

    let next_statuses = TaskStatus::ALL
        .iter()
        .filter(|to| can_change_status(actor.role, task.status, **to))
        .map(|to| to.to_string())
        .collect();

    let staff = if actor.is_admin() {
        repo.list_staff().map_err(log_failure("Failed to load staff"))?
    } else {
        Vec::new()
    };

    let can_take = actor.role == Role::Employee && task.assignee_id.is_none();

    Ok(TaskPageData {
        task,
        customer,
        comments,
        next_statuses,
        staff,
        can_take,
    })
}

/// Opens a ticket. Customers raise tickets for themselves only, employees
/// may assign the ticket to themselves and link only their own customers,
/// admins may do both for any staff profile or customer.
pub fn create_task<R>(repo: &R, actor: &UserProfile, form: NewTaskForm) -> ServiceResult<Task>
where
    R: TaskWriter + CustomerReader + UserProfileReader + ?Sized,
{
    let payload = form.into_payload(actor.id)?;

    match actor.role {
        Role::Customer if payload.customer_id.is_some() || payload.assignee_id.is_some() => {
            return Err(ServiceError::Unauthorized);
        }
        Role::Employee if payload.assignee_id.is_some_and(|id| id != actor.id) => {
            return Err(ServiceError::Unauthorized);
        }
        _ => {}
    }

    if let Some(customer_id) = payload.customer_id {
        if repo.get_customer_by_id(customer_id)?.is_none() {
            return Err(ServiceError::Form("Unknown customer".to_string()));
        }
        if !can_see_customer(repo, actor, customer_id)? {
            return Err(ServiceError::Unauthorized);
        }
    }
    if let Some(assignee_id) = payload.assignee_id {
        ensure_staff_assignee(repo, assignee_id)?;
    }

    let new_task = payload
        .task
        .customer(payload.customer_id)
        .assignee(payload.assignee_id);

    let task = repo
        .create_task(&new_task)
        .map_err(log_failure("Failed to create task"))?;

    log::info!("{} opened ticket {}", actor.email, task.id);

    Ok(task)
}

pub fn change_task_status<R>(
    repo: &R,
    actor: &UserProfile,
    task_id: i32,
    form: TaskStatusForm,
) -> ServiceResult<Task>
where
    R: TaskReader + TaskWriter + ?Sized,
{
    let target = form.status()?;
    let task = load_visible(repo, actor, task_id)?;

    if task.status == target {
        return Err(ServiceError::Form(format!("Ticket is already {target}")));
    }
    if !can_change_status(actor.role, task.status, target) {
        return Err(ServiceError::Unauthorized);
    }

    repo.update_task_status(task.id, target)
        .map_err(log_failure("Failed to update task status"))
        .map_err(ServiceError::from)
}

pub fn assign_task<R>(
    repo: &R,
    actor: &UserProfile,
    task_id: i32,
    form: AssignTaskForm,
) -> ServiceResult<Task>
where
    R: TaskReader + TaskWriter + UserProfileReader + ?Sized,
{
    ensure_admin(actor)?;

    let assignee = form.assignee()?;
    let task = load_visible(repo, actor, task_id)?;

    if let Some(assignee_id) = assignee {
        ensure_staff_assignee(repo, assignee_id)?;
    }

    repo.assign_task(task.id, assignee)
        .map_err(log_failure("Failed to assign task"))
        .map_err(ServiceError::from)
}

/// Lets an employee pick up an unassigned ticket.
pub fn take_task<R>(repo: &R, actor: &UserProfile, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + TaskWriter + ?Sized,
{
    ensure_role(actor, &[Role::Employee])?;

    let task = load_visible(repo, actor, task_id)?;
    if task.assignee_id.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Ticket {} is already assigned",
            task.id
        )));
    }

    repo.assign_task(task.id, Some(actor.id))
        .map_err(log_failure("Failed to take task"))
        .map_err(ServiceError::from)
}

pub fn comment_task<R>(
    repo: &R,
    actor: &UserProfile,
    task_id: i32,
    form: TaskCommentForm,
) -> ServiceResult<TaskComment>
where
    R: TaskReader + TaskWriter + ?Sized,
{
    form.validate().map_err(FormError::from)?;

    let task = load_visible(repo, actor, task_id)?;
    let comment = NewTaskComment::try_new(task.id, actor.id, form.body)?;

    repo.create_task_comment(&comment)
        .map_err(log_failure("Failed to add comment"))
        .map_err(ServiceError::from)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::customer::Customer;
    use crate::domain::types::{CustomerName, TaskPriority, TaskTitle};
    use crate::repository::mock::MockRepository;
    use crate::services::access::fixtures;
    use chrono::Utc;

    fn task(status: TaskStatus, requester: i32, assignee: Option<i32>) -> Task {
        let now = Utc::now().naive_utc();
        Task {
            id: TaskId::new(11).unwrap(),
            title: TaskTitle::new("Broken login").unwrap(),
            description: String::new(),
            status,
            priority: TaskPriority::Normal,
            customer_id: None,
            requester_id: ProfileId::new(requester).unwrap(),
            assignee_id: assignee.map(|id| ProfileId::new(id).unwrap()),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_task_form(assignee: Option<&str>) -> NewTaskForm {
        NewTaskForm {
            title: "Broken login".into(),
            description: "Cannot sign in".into(),
            priority: "high".into(),
            customer_id: None,
            assignee_id: assignee.map(str::to_string),
            due_date: None,
        }
    }

    #[test]
    fn scope_follows_role() {
        assert_eq!(task_scope(&fixtures::admin()), TaskScope::All);
        assert_eq!(
            task_scope(&fixtures::employee()),
            TaskScope::WorkableBy(ProfileId::new(2).unwrap())
        );
        assert_eq!(
            task_scope(&fixtures::customer()),
            TaskScope::RequestedBy(ProfileId::new(3).unwrap())
        );
    }

    #[test]
    fn customers_list_their_own_tickets() {
        let mut repo = MockRepository::new();
        repo.expect_list_tasks()
            .withf(|query| query.scope == TaskScope::RequestedBy(ProfileId::new(3).unwrap()))
            .returning(|_| Ok((1, vec![task(TaskStatus::Open, 3, None)])));
        repo.expect_count_tasks_by_status()
            .returning(|_| Ok(vec![(TaskStatus::Open, 1)]));

        let data = list_tasks(&repo, &fixtures::customer(), TaskIndexQuery::default()).unwrap();

        assert_eq!(data.tasks.items.len(), 1);
        assert_eq!(data.counts.len(), TaskStatus::ALL.len());
    }

    #[test]
    fn customers_cannot_assign_when_creating() {
        let mut repo = MockRepository::new();
        repo.expect_create_task().times(0);

        let result = create_task(&repo, &fixtures::customer(), new_task_form(Some("2")));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn employees_may_only_self_assign() {
        let mut repo = MockRepository::new();
        repo.expect_create_task().times(0);

        let result = create_task(&repo, &fixtures::employee(), new_task_form(Some("1")));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn customer_tickets_record_the_requester() {
        let mut repo = MockRepository::new();
        repo.expect_create_task()
            .withf(|new| new.requester_id.get() == 3 && new.assignee_id.is_none())
            .returning(|_| Ok(task(TaskStatus::Open, 3, None)));

        let created = create_task(&repo, &fixtures::customer(), new_task_form(None)).unwrap();

        assert_eq!(created.status, TaskStatus::Open);
    }

    fn linked_customer() -> Customer {
        let now = Utc::now().naive_utc();
        Customer {
            id: CustomerId::new(4).unwrap(),
            name: CustomerName::new("Acme").unwrap(),
            email: None,
            phone: None,
            company: None,
            notes: None,
            source_request_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn form_for_customer(customer_id: &str) -> NewTaskForm {
        NewTaskForm {
            customer_id: Some(customer_id.to_string()),
            ..new_task_form(None)
        }
    }

    #[test]
    fn employees_cannot_link_unassigned_customers() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|_| Ok(Some(linked_customer())));
        repo.expect_is_customer_assigned()
            .withf(|customer, profile| customer.get() == 4 && profile.get() == 2)
            .returning(|_, _| Ok(false));
        repo.expect_create_task().times(0);

        let result = create_task(&repo, &fixtures::employee(), form_for_customer("4"));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn employees_link_their_assigned_customers() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|_| Ok(Some(linked_customer())));
        repo.expect_is_customer_assigned().returning(|_, _| Ok(true));
        repo.expect_create_task()
            .withf(|new| new.customer_id.is_some_and(|id| id.get() == 4))
            .returning(|_| Ok(task(TaskStatus::Open, 2, None)));

        let created = create_task(&repo, &fixtures::employee(), form_for_customer("4"));

        assert!(created.is_ok());
    }

    #[test]
    fn unassigned_customers_are_hidden_on_employee_tickets() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id().returning(|_| {
            let mut linked = task(TaskStatus::Open, 3, Some(2));
            linked.customer_id = Some(CustomerId::new(4).unwrap());
            Ok(Some(linked))
        });
        repo.expect_is_customer_assigned().returning(|_, _| Ok(false));
        repo.expect_get_customer_by_id().times(0);
        repo.expect_list_task_comments().returning(|_| Ok(vec![]));

        let data = show_task(&repo, &fixtures::employee(), 11).unwrap();

        assert!(data.customer.is_none());
    }

    #[test]
    fn other_customers_tickets_are_hidden() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_| Ok(Some(task(TaskStatus::Open, 99, None))));

        let result = show_task(&repo, &fixtures::customer(), 11);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn customers_close_resolved_tickets() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_| Ok(Some(task(TaskStatus::Resolved, 3, Some(2)))));
        repo.expect_update_task_status()
            .returning(|_, status| Ok(task(status, 3, Some(2))));

        let form = TaskStatusForm {
            status: "closed".into(),
        };
        let updated = change_task_status(&repo, &fixtures::customer(), 11, form).unwrap();

        assert_eq!(updated.status, TaskStatus::Closed);
    }

    #[test]
    fn employees_cannot_reopen_closed_tickets() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_| Ok(Some(task(TaskStatus::Closed, 3, Some(2)))));
        repo.expect_update_task_status().times(0);

        let form = TaskStatusForm {
            status: "open".into(),
        };
        let result = change_task_status(&repo, &fixtures::employee(), 11, form);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn taking_an_assigned_ticket_conflicts() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_| Ok(Some(task(TaskStatus::Open, 3, Some(2)))));
        repo.expect_assign_task().times(0);

        let result = take_task(&repo, &fixtures::employee(), 11);

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn employees_take_unassigned_tickets() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id()
            .returning(|_| Ok(Some(task(TaskStatus::Open, 3, None))));
        repo.expect_assign_task()
            .withf(|_, assignee| *assignee == Some(ProfileId::new(2).unwrap()))
            .returning(|_, assignee| Ok(task(TaskStatus::Open, 3, assignee.map(i32::from))));

        let taken = take_task(&repo, &fixtures::employee(), 11).unwrap();

        assert_eq!(taken.assignee_id, Some(ProfileId::new(2).unwrap()));
    }

    #[test]
    fn blank_comments_are_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_task_by_id().times(0);
        repo.expect_create_task_comment().times(0);

        let form = TaskCommentForm {
            body: String::new(),
        };
        let result = comment_task(&repo, &fixtures::admin(), 11, form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
