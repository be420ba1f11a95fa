use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::task::{NewTask, NewTaskComment, Task, TaskComment};
use crate::domain::types::{ProfileId, TaskId, TaskStatus};
use crate::domain::user_profile::UserProfile;
use crate::models::task::{
    NewTask as DbNewTask, NewTaskComment as DbNewTaskComment, Task as DbTask,
    TaskComment as DbTaskComment,
};
use crate::models::user_profile::UserProfile as DbUserProfile;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, TaskListQuery, TaskReader, TaskScope, TaskWriter, into_domain,
};
use crate::schema::tasks;

fn scoped(scope: TaskScope) -> tasks::BoxedQuery<'static, Sqlite> {
    let items = tasks::table.into_boxed::<Sqlite>();
    match scope {
        TaskScope::All => items,
        TaskScope::RequestedBy(profile_id) => {
            items.filter(tasks::requester_id.eq(profile_id.get()))
        }
        TaskScope::WorkableBy(profile_id) => items.filter(
            tasks::assignee_id
                .eq(profile_id.get())
                .or(tasks::assignee_id.is_null()),
        ),
        TaskScope::AssignedTo(profile_id) => items.filter(tasks::assignee_id.eq(profile_id.get())),
        TaskScope::Unassigned => items.filter(tasks::assignee_id.is_null()),
    }
}

impl TaskReader for DieselRepository {
    fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let mut conn = self.conn()?;

        let task = tasks::table
            .find(id.get())
            .first::<DbTask>(&mut conn)
            .optional()?;

        task.map(Task::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = scoped(query.scope);
            if let Some(status) = query.status {
                items = items.filter(tasks::status.eq(status.as_str()));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_tasks = items
            .order(tasks::updated_at.desc())
            .then_order_by(tasks::id.desc())
            .load::<DbTask>(&mut conn)?;

        Ok((total, into_domain(db_tasks)?))
    }

    fn count_tasks_by_status(
        &self,
        scope: TaskScope,
    ) -> RepositoryResult<Vec<(TaskStatus, usize)>> {
        let mut conn = self.conn()?;

        let mut counts = Vec::with_capacity(TaskStatus::ALL.len());
        for status in TaskStatus::ALL {
            let count = scoped(scope)
                .filter(tasks::status.eq(status.as_str()))
                .count()
                .get_result::<i64>(&mut conn)?;
            counts.push((*status, count as usize));
        }

        Ok(counts)
    }

    fn list_task_comments(&self, id: TaskId) -> RepositoryResult<Vec<(TaskComment, UserProfile)>> {
        use crate::schema::{task_comments, user_profiles};

        let mut conn = self.conn()?;

        let db_comments = task_comments::table
            .filter(task_comments::task_id.eq(id.get()))
            .order(task_comments::created_at.asc())
            .then_order_by(task_comments::id.asc())
            .load::<DbTaskComment>(&mut conn)?;

        let author_ids: Vec<i32> = db_comments.iter().map(|c| c.author_id).collect();

        let authors: HashMap<i32, DbUserProfile> = user_profiles::table
            .filter(user_profiles::id.eq_any(author_ids))
            .load::<DbUserProfile>(&mut conn)?
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

        db_comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.author_id)?.clone();
                Some((comment, author))
            })
            .map(|(comment, author)| {
                Ok((
                    TaskComment::try_from(comment)?,
                    UserProfile::try_from(author)?,
                ))
            })
            .collect::<Result<Vec<_>, crate::domain::types::TypeConstraintError>>()
            .map_err(RepositoryError::from)
    }
}

impl TaskWriter for DieselRepository {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;

        let db_new_task: DbNewTask = new_task.into();

        let db_task = diesel::insert_into(tasks::table)
            .values(&db_new_task)
            .get_result::<DbTask>(&mut conn)?;

        Task::try_from(db_task).map_err(RepositoryError::from)
    }

    fn update_task_status(&self, id: TaskId, status: TaskStatus) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;

        let db_task = diesel::update(tasks::table.find(id.get()))
            .set((
                tasks::status.eq(status.as_str()),
                tasks::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbTask>(&mut conn)?;

        Task::try_from(db_task).map_err(RepositoryError::from)
    }

    fn assign_task(&self, id: TaskId, assignee: Option<ProfileId>) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;

        let db_task = diesel::update(tasks::table.find(id.get()))
            .set((
                tasks::assignee_id.eq(assignee.map(ProfileId::get)),
                tasks::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbTask>(&mut conn)?;

        Task::try_from(db_task).map_err(RepositoryError::from)
    }

    fn create_task_comment(&self, comment: &NewTaskComment) -> RepositoryResult<TaskComment> {
        use crate::schema::task_comments;

        let mut conn = self.conn()?;

        let db_new_comment: DbNewTaskComment = comment.into();

        let db_comment = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let db_comment = diesel::insert_into(task_comments::table)
                .values(&db_new_comment)
                .get_result::<DbTaskComment>(conn)?;

            diesel::update(tasks::table.find(comment.task_id.get()))
                .set(tasks::updated_at.eq(Utc::now().naive_utc()))
                .execute(conn)?;

            Ok(db_comment)
        })?;

        TaskComment::try_from(db_comment).map_err(RepositoryError::from)
    }
}
