//! Resource-specific queries.

use crate::model::{Entity, Resource, ResourceInput};
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, StoreResult};
use crate::validate::require_argument;

pub type ResourceService<S = InMemoryStore<Resource>> = EntityService<Resource, S>;

impl<S: EntityStore<Resource>> EntityService<Resource, S> {
    /// # Errors
    /// - `StoreError::Validation` when `category` is blank.
    pub fn resources_by_category(&self, category: &str) -> StoreResult<Vec<Resource>> {
        let category = require_argument(Resource::KIND, "category", category)?;
        Ok(self.select(|resource| resource.category.as_deref() == Some(category)))
    }

    /// One level of the resource tree: children of `parent_id`, or the roots
    /// when `None`.
    pub fn resource_children(&self, parent_id: Option<&str>) -> Vec<Resource> {
        self.select(|resource| resource.parent_id.as_ref().map(|id| id.as_str()) == parent_id)
    }

    /// # Errors
    /// - `StoreError::Validation` when `progress` is outside `0..=100`.
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn update_resource_progress(&self, id: &str, progress: i64) -> StoreResult<Resource> {
        self.update(
            id,
            ResourceInput {
                progress: Some(progress),
                ..ResourceInput::default()
            },
        )
    }
}
