//! Task-specific queries and shortcuts.

use crate::metrics;
use crate::model::{Entity, Label, Task, TaskInput, TaskStatus};
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, StoreResult};
use crate::validate::require_argument;

pub type TaskService<S = InMemoryStore<Task>> = EntityService<Task, S>;

impl<S: EntityStore<Task>> EntityService<Task, S> {
    /// Tasks referencing `project_id`; memoized for the cache TTL.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `project_id` is blank.
    pub fn tasks_by_project(&self, project_id: &str) -> StoreResult<Vec<Task>> {
        let project_id = require_argument(Task::KIND, "project_id", project_id)?;
        Ok(self.cached_list(&format!("project_{project_id}"), |tasks| {
            tasks
                .iter()
                .filter(|task| {
                    task.project_id
                        .as_ref()
                        .is_some_and(|id| id.as_str() == project_id)
                })
                .cloned()
                .collect()
        }))
    }

    /// Tasks in `status`; memoized for the cache TTL.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.cached_list(&format!("status_{}", status.label()), |tasks| {
            tasks
                .iter()
                .filter(|task| task.status == status)
                .cloned()
                .collect()
        })
    }

    /// Overdue tasks as of now, optionally only those assigned to `assignee_id`.
    pub fn overdue_tasks(&self, assignee_id: Option<&str>) -> Vec<Task> {
        let now = self.now_ms();
        let mut overdue = metrics::overdue_tasks(&self.snapshot(), now);
        if let Some(assignee) = assignee_id {
            overdue.retain(|task| task.assignee_id.as_deref() == Some(assignee));
        }
        overdue
    }

    /// Tasks assigned to `user_id`, most recently modified first.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `user_id` is blank.
    pub fn recent_activity(&self, user_id: &str, limit: usize) -> StoreResult<Vec<Task>> {
        let user_id = require_argument(Task::KIND, "user_id", user_id)?;
        let mut tasks = self.select(|task| task.assignee_id.as_deref() == Some(user_id));
        tasks.sort_by(|a, b| b.meta.last_modified.cmp(&a.meta.last_modified));
        tasks.truncate(limit);
        Ok(tasks)
    }

    /// Completes the task; `completed_at` is stamped with the update time.
    pub fn mark_complete(&self, id: &str) -> StoreResult<Task> {
        self.update(
            id,
            TaskInput {
                is_completed: Some(true),
                status: Some(TaskStatus::Completed.label().to_string()),
                ..TaskInput::default()
            },
        )
    }

    pub fn completion_rate(&self) -> u8 {
        metrics::completion_rate(&self.snapshot())
    }
}
