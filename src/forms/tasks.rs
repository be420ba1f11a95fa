use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::task::NewTask;
use crate::domain::types::{CustomerId, ProfileId, TaskPriority, TaskStatus};
use crate::forms::{FormError, parse_optional_id};

#[derive(Debug, Deserialize, Validate)]
pub struct NewTaskForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

fn default_priority() -> String {
    TaskPriority::Normal.as_str().to_string()
}

/// Validated ticket fields; the caller decides which optional links apply.
pub struct NewTaskPayload {
    pub task: NewTask,
    pub customer_id: Option<CustomerId>,
    pub assignee_id: Option<ProfileId>,
}

impl NewTaskForm {
    pub fn into_payload(self, requester_id: ProfileId) -> Result<NewTaskPayload, FormError> {
        self.validate()?;

        let priority: TaskPriority = self
            .priority
            .parse()
            .map_err(|_| FormError::InvalidPriority)?;

        let due_date = match self.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FormError::InvalidDate)?,
            ),
        };

        let customer_id = parse_optional_id(self.customer_id.as_deref())?
            .map(CustomerId::new)
            .transpose()?;
        let assignee_id = parse_optional_id(self.assignee_id.as_deref())?
            .map(ProfileId::new)
            .transpose()?;

        let task = NewTask::try_new(self.title, self.description, priority, requester_id)?
            .due_date(due_date);

        Ok(NewTaskPayload {
            task,
            customer_id,
            assignee_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusForm {
    pub status: String,
}

impl TaskStatusForm {
    pub fn status(&self) -> Result<TaskStatus, FormError> {
        self.status.parse().map_err(|_| FormError::InvalidStatus)
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskForm {
    #[serde(default)]
    pub assignee_id: Option<String>,
}

impl AssignTaskForm {
    pub fn assignee(&self) -> Result<Option<ProfileId>, FormError> {
        Ok(parse_optional_id(self.assignee_id.as_deref())?
            .map(ProfileId::new)
            .transpose()?)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TaskCommentForm {
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}
