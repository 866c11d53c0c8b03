//! Job opportunity shortcuts.

use crate::model::{ApplicationStatus, Job, JobInput, Label};
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, Operation, StoreResult};

pub type JobService<S = InMemoryStore<Job>> = EntityService<Job, S>;

impl<S: EntityStore<Job>> EntityService<Job, S> {
    /// Flips the starred flag.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn toggle_star(&self, id: &str) -> StoreResult<Job> {
        let Some(job) = self.get_by_id(id) else {
            return Err(self.report_missing(Operation::Update, id));
        };
        self.update(
            id,
            JobInput {
                is_starred: Some(!job.is_starred),
                ..JobInput::default()
            },
        )
    }

    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> StoreResult<Job> {
        self.update(
            id,
            JobInput {
                application_status: Some(status.label().to_string()),
                ..JobInput::default()
            },
        )
    }

    pub fn starred_jobs(&self) -> Vec<Job> {
        self.select(|job| job.is_starred)
    }
}
