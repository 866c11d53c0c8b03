//! Project-specific queries.

use crate::model::{Entity, Project, ProjectInput};
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, StoreResult};
use crate::validate::require_argument;

pub type ProjectService<S = InMemoryStore<Project>> = EntityService<Project, S>;

impl<S: EntityStore<Project>> EntityService<Project, S> {
    /// # Errors
    /// - `StoreError::Validation` when `owner_id` is blank.
    pub fn projects_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Project>> {
        let owner_id = require_argument(Project::KIND, "owner_id", owner_id)?;
        Ok(self.select(|project| project.owner_id.as_deref() == Some(owner_id)))
    }

    /// # Errors
    /// - `StoreError::Validation` when `department` is blank.
    pub fn projects_by_department(&self, department: &str) -> StoreResult<Vec<Project>> {
        let department = require_argument(Project::KIND, "department", department)?;
        Ok(self.select(|project| project.department.as_deref() == Some(department)))
    }

    /// Projects not yet completed, optionally only those owned by `owner_id`.
    pub fn active_projects(&self, owner_id: Option<&str>) -> Vec<Project> {
        self.select(|project| {
            project.is_active()
                && owner_id.map_or(true, |owner| project.owner_id.as_deref() == Some(owner))
        })
    }

    /// Sets stored progress; out-of-range values are rejected.
    pub fn update_progress(&self, id: &str, progress: i64) -> StoreResult<Project> {
        self.update(
            id,
            ProjectInput {
                progress: Some(progress),
                ..ProjectInput::default()
            },
        )
    }
}
