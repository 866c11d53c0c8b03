//! Skill-specific queries and ranking.

use crate::metrics;
use crate::model::{Entity, Skill, SkillInput};
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, StoreResult};
use crate::validate::require_argument;
use std::cmp::Reverse;

pub type SkillService<S = InMemoryStore<Skill>> = EntityService<Skill, S>;

impl<S: EntityStore<Skill>> EntityService<Skill, S> {
    /// # Errors
    /// - `StoreError::Validation` when `category` is blank.
    pub fn skills_by_category(&self, category: &str) -> StoreResult<Vec<Skill>> {
        let category = require_argument(Skill::KIND, "category", category)?;
        Ok(self.select(|skill| skill.category.as_deref() == Some(category)))
    }

    /// # Errors
    /// - `StoreError::Validation` when `level` is outside `0..=100`.
    /// - `StoreError::NotFound` when `id` is absent.
    pub fn update_skill_level(&self, id: &str, level: i64) -> StoreResult<Skill> {
        self.update(
            id,
            SkillInput {
                level: Some(level),
                ..SkillInput::default()
            },
        )
    }

    /// Skills below target, largest gap first.
    pub fn skill_gaps(&self) -> Vec<Skill> {
        metrics::skill_gaps(&self.snapshot())
    }

    /// Every skill, highest market demand first; unknown demand sorts as 0.
    pub fn sorted_by_market_demand(&self) -> Vec<Skill> {
        let mut skills = self.get_all();
        skills.sort_by_key(|skill| Reverse(skill.market_demand.unwrap_or(0)));
        skills
    }

    /// Every skill, largest gap first.
    pub fn sorted_by_gap(&self) -> Vec<Skill> {
        metrics::sorted_by_gap(&self.snapshot())
    }
}
