//! Diesel models for tickets and their comments.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::task::{
    NewTask as DomainNewTask, NewTaskComment as DomainNewTaskComment, Task as DomainTask,
    TaskComment as DomainTaskComment,
};
use crate::domain::types::{
    CustomerId, ProfileId, SanitizedText, TaskCommentId, TaskId, TaskStatus, TaskTitle,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub customer_id: Option<i32>,
    pub requester_id: i32,
    pub assignee_id: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub customer_id: Option<i32>,
    pub requester_id: i32,
    pub assignee_id: Option<i32>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::task_comments)]
pub struct TaskComment {
    pub id: i32,
    pub task_id: i32,
    pub author_id: i32,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_comments)]
pub struct NewTaskComment<'a> {
    pub task_id: i32,
    pub author_id: i32,
    pub body: &'a str,
}

impl TryFrom<Task> for DomainTask {
    type Error = TypeConstraintError;

    fn try_from(task: Task) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::new(task.id)?,
            title: TaskTitle::new(task.title)?,
            description: task.description,
            status: task.status.parse()?,
            priority: task.priority.parse()?,
            customer_id: task.customer_id.map(CustomerId::new).transpose()?,
            requester_id: ProfileId::new(task.requester_id)?,
            assignee_id: task.assignee_id.map(ProfileId::new).transpose()?,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewTask> for NewTask<'a> {
    fn from(task: &'a DomainNewTask) -> Self {
        Self {
            title: task.title.as_str(),
            description: task.description.as_str(),
            status: TaskStatus::Open.as_str(),
            priority: task.priority.as_str(),
            customer_id: task.customer_id.map(CustomerId::get),
            requester_id: task.requester_id.get(),
            assignee_id: task.assignee_id.map(ProfileId::get),
            due_date: task.due_date,
        }
    }
}

impl TryFrom<TaskComment> for DomainTaskComment {
    type Error = TypeConstraintError;

    fn try_from(comment: TaskComment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskCommentId::new(comment.id)?,
            task_id: TaskId::new(comment.task_id)?,
            author_id: ProfileId::new(comment.author_id)?,
            body: SanitizedText::from_trusted(comment.body),
            created_at: comment.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTaskComment> for NewTaskComment<'a> {
    fn from(comment: &'a DomainNewTaskComment) -> Self {
        Self {
            task_id: comment.task_id.get(),
            author_id: comment.author_id.get(),
            body: comment.body.as_str(),
        }
    }
}
