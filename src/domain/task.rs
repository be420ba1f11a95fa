use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CustomerId, ProfileId, Role, SanitizedText, TaskCommentId, TaskId, TaskPriority, TaskStatus,
    TaskTitle, TypeConstraintError,
};

/// A support ticket raised by a customer or staff member.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: TaskTitle,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub customer_id: Option<CustomerId>,
    pub requester_id: ProfileId,
    pub assignee_id: Option<ProfileId>,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Task {
    /// Whether the profile may read the ticket and comment on it.
    pub fn is_visible_to(&self, profile_id: ProfileId, role: Role) -> bool {
        match role {
            Role::Admin => true,
            Role::Employee => self.assignee_id.is_none_or(|id| id == profile_id),
            Role::Customer => self.requester_id == profile_id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewTask {
    pub title: TaskTitle,
    pub description: String,
    pub priority: TaskPriority,
    pub customer_id: Option<CustomerId>,
    pub requester_id: ProfileId,
    pub assignee_id: Option<ProfileId>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn try_new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TaskPriority,
        requester_id: ProfileId,
    ) -> Result<Self, TypeConstraintError> {
        let description = ammonia::clean(&description.into()).trim().to_string();
        Ok(Self {
            title: TaskTitle::new(title)?,
            description,
            priority,
            customer_id: None,
            requester_id,
            assignee_id: None,
            due_date: None,
        })
    }

    #[must_use]
    pub fn customer(mut self, customer_id: Option<CustomerId>) -> Self {
        self.customer_id = customer_id;
        self
    }

    #[must_use]
    pub fn assignee(mut self, assignee_id: Option<ProfileId>) -> Self {
        self.assignee_id = assignee_id;
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Decides whether `role` may move a ticket from `from` to `to`.
///
/// Staff move tickets freely between non-closed states and may close them.
/// Only admins reopen closed tickets. Customers may only close their own
/// resolved tickets.
pub fn can_change_status(role: Role, from: TaskStatus, to: TaskStatus) -> bool {
    if from == to {
        return false;
    }
    match role {
        Role::Admin => from != TaskStatus::Closed || to == TaskStatus::Open,
        Role::Employee => from != TaskStatus::Closed,
        Role::Customer => from == TaskStatus::Resolved && to == TaskStatus::Closed,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskComment {
    pub id: TaskCommentId,
    pub task_id: TaskId,
    pub author_id: ProfileId,
    pub body: SanitizedText,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewTaskComment {
    pub task_id: TaskId,
    pub author_id: ProfileId,
    pub body: SanitizedText,
}

impl NewTaskComment {
    pub fn try_new(
        task_id: TaskId,
        author_id: ProfileId,
        body: impl Into<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            task_id,
            author_id,
            body: SanitizedText::new(body)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pid(id: i32) -> ProfileId {
        ProfileId::new(id).unwrap()
    }

    fn sample_task(assignee: Option<i32>) -> Task {
        let now = Utc::now().naive_utc();
        Task {
            id: TaskId::new(1).unwrap(),
            title: TaskTitle::new("Printer broken").unwrap(),
            description: String::new(),
            status: TaskStatus::Open,
            priority: TaskPriority::Normal,
            customer_id: None,
            requester_id: pid(10),
            assignee_id: assignee.map(pid),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn visibility_follows_role() {
        let unassigned = sample_task(None);
        let assigned = sample_task(Some(2));

        assert!(unassigned.is_visible_to(pid(2), Role::Employee));
        assert!(assigned.is_visible_to(pid(2), Role::Employee));
        assert!(!assigned.is_visible_to(pid(3), Role::Employee));
        assert!(assigned.is_visible_to(pid(10), Role::Customer));
        assert!(!assigned.is_visible_to(pid(11), Role::Customer));
        assert!(assigned.is_visible_to(pid(99), Role::Admin));
    }

    #[test]
    fn closed_tickets_are_reopened_by_admins_only() {
        assert!(can_change_status(Role::Admin, TaskStatus::Closed, TaskStatus::Open));
        assert!(!can_change_status(Role::Admin, TaskStatus::Closed, TaskStatus::Resolved));
        assert!(!can_change_status(Role::Employee, TaskStatus::Closed, TaskStatus::Open));
        assert!(can_change_status(Role::Employee, TaskStatus::Open, TaskStatus::Closed));
    }

    #[test]
    fn customers_only_close_resolved_tickets() {
        assert!(can_change_status(Role::Customer, TaskStatus::Resolved, TaskStatus::Closed));
        assert!(!can_change_status(Role::Customer, TaskStatus::Open, TaskStatus::Closed));
        assert!(!can_change_status(Role::Customer, TaskStatus::Open, TaskStatus::InProgress));
    }

    #[test]
    fn description_is_sanitized() {
        let task = NewTask::try_new(
            "Title",
            "<img src=x onerror=alert(1)>ok",
            TaskPriority::High,
            pid(1),
        )
        .unwrap();
        assert!(!task.description.contains("onerror"));
    }
}
