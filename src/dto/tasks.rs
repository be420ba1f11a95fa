use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::task::{Task, TaskComment};
use crate::domain::user_profile::UserProfile;
use crate::dto::StatusCount;
use crate::pagination::Paginated;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskIndexQuery {
    pub status: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TasksPageData {
    pub tasks: Paginated<Task>,
    pub counts: Vec<StatusCount>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub comment: TaskComment,
    pub author: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct TaskPageData {
    pub task: Task,
    pub customer: Option<Customer>,
    pub comments: Vec<CommentView>,
    /// Statuses the viewer may move the ticket to.
    pub next_statuses: Vec<String>,
    pub staff: Vec<UserProfile>,
    pub can_take: bool,
}
