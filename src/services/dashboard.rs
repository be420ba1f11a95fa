//! Role-scoped dashboard numbers.

use crate::domain::types::{ContactRequestStatus, ExecutionStatus, Role, TaskStatus};
use crate::domain::user_profile::UserProfile;
use crate::dto::StatusCount;
use crate::dto::dashboard::DashboardStats;
use crate::repository::{
    ContactRequestReader, CustomerListQuery, CustomerReader, TaskReader, TaskScope,
    WorkflowExecutionReader,
};
use crate::services::{ServiceResult, log_failure};

fn count_of<S: PartialEq>(counts: &[(S, usize)], wanted: S) -> usize {
    counts
        .iter()
        .find(|(status, _)| *status == wanted)
        .map_or(0, |(_, count)| *count)
}

fn open_count(counts: &[(TaskStatus, usize)]) -> usize {
    counts
        .iter()
        .filter(|(status, _)| status.is_open())
        .map(|(_, count)| count)
        .sum()
}

fn customer_total<R>(repo: &R, query: CustomerListQuery) -> ServiceResult<usize>
where
    R: CustomerReader + ?Sized,
{
    let (total, _) = repo
        .list_customers(query.paginate(1, 1))
        .map_err(log_failure("Failed to count customers"))?;
    Ok(total)
}

/// Computes the dashboard cards for the viewer's role.
pub fn load_dashboard<R>(repo: &R, actor: &UserProfile) -> ServiceResult<DashboardStats>
where
    R: CustomerReader + ContactRequestReader + TaskReader + WorkflowExecutionReader + ?Sized,
{
    let stats = match actor.role {
        Role::Admin => {
            let requests = repo
                .count_contact_requests_by_status(None)
                .map_err(log_failure("Failed to count contact requests"))?;
            let tasks = repo
                .count_tasks_by_status(TaskScope::All)
                .map_err(log_failure("Failed to count tasks"))?;
            let unassigned = repo
                .count_tasks_by_status(TaskScope::Unassigned)
                .map_err(log_failure("Failed to count tasks"))?;
            let executions = repo
                .count_executions_by_status()
                .map_err(log_failure("Failed to count executions"))?;

            DashboardStats::Admin {
                customers: customer_total(repo, CustomerListQuery::default())?,
                requests: StatusCount::complete(ContactRequestStatus::ALL, &requests),
                open_tasks: open_count(&tasks),
                unassigned_tasks: open_count(&unassigned),
                running_executions: count_of(&executions, ExecutionStatus::Running)
                    + count_of(&executions, ExecutionStatus::Waiting),
                failed_executions: count_of(&executions, ExecutionStatus::Failed),
            }
        }
        Role::Employee => {
            let all_requests = repo
                .count_contact_requests_by_status(None)
                .map_err(log_failure("Failed to count contact requests"))?;
            let my_requests = repo
                .count_contact_requests_by_status(Some(actor.id))
                .map_err(log_failure("Failed to count contact requests"))?;
            let my_tasks = repo
                .count_tasks_by_status(TaskScope::AssignedTo(actor.id))
                .map_err(log_failure("Failed to count tasks"))?;
            let unassigned = repo
                .count_tasks_by_status(TaskScope::Unassigned)
                .map_err(log_failure("Failed to count tasks"))?;

            DashboardStats::Employee {
                assigned_customers: customer_total(
                    repo,
                    CustomerListQuery::default().assigned_to(actor.id),
                )?,
                new_requests: count_of(&all_requests, ContactRequestStatus::New),
                my_requests_in_progress: count_of(&my_requests, ContactRequestStatus::InProgress),
                my_open_tasks: open_count(&my_tasks),
                unassigned_tasks: open_count(&unassigned),
            }
        }
        Role::Customer => {
            let tickets = repo
                .count_tasks_by_status(TaskScope::RequestedBy(actor.id))
                .map_err(log_failure("Failed to count tickets"))?;

            DashboardStats::Customer {
                open_tickets: open_count(&tickets),
                tickets: StatusCount::complete(TaskStatus::ALL, &tickets),
            }
        }
    };

    Ok(stats)
}
