//! Skill entity for learning progress tracking.

use crate::model::common::{clamp_percent, non_blank};
use crate::model::{Entity, EntityId, EntityKind, EntityMeta, PERCENT_MAX};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Current proficiency, `0..=100`.
    #[serde(default)]
    pub level: u8,
    /// Desired proficiency, `0..=100`.
    #[serde(default)]
    pub target_level: u8,
    /// Market demand score, `0..=100`.
    #[serde(default)]
    pub market_demand: Option<u8>,
    /// Resource ids teaching this skill.
    #[serde(default)]
    pub related_resources: Vec<EntityId>,
}

/// Create/update payload for skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub level: Option<i64>,
    pub target_level: Option<i64>,
    pub market_demand: Option<i64>,
    pub related_resources: Option<Vec<String>>,
}

impl SkillInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Skill {
    /// Remaining distance to the target; negative when the target is exceeded.
    pub fn gap(&self) -> i32 {
        i32::from(self.target_level) - i32::from(self.level)
    }
}

impl Entity for Skill {
    type Input = SkillInput;

    const KIND: EntityKind = EntityKind::Skill;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &SkillInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("name", input.name.as_deref());
        rules.percent("level", input.level);
        rules.percent("target_level", input.target_level);
        rules.percent("market_demand", input.market_demand);
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: SkillInput) -> Self {
        let mut skill = Self {
            meta,
            name: String::new(),
            category: None,
            level: 0,
            target_level: 0,
            market_demand: None,
            related_resources: Vec::new(),
        };
        skill.apply_input(input);
        skill
    }

    fn apply_input(&mut self, input: SkillInput) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = input.category {
            self.category = non_blank(category);
        }
        if let Some(level) = input.level {
            self.level = clamp_percent(level);
        }
        if let Some(target_level) = input.target_level {
            self.target_level = clamp_percent(target_level);
        }
        if let Some(market_demand) = input.market_demand {
            self.market_demand = Some(clamp_percent(market_demand));
        }
        if let Some(related) = input.related_resources {
            self.related_resources = related.into_iter().map(EntityId::from).collect();
        }
    }

    fn normalize(&mut self) {
        self.level = self.level.min(PERCENT_MAX);
        self.target_level = self.target_level.min(PERCENT_MAX);
        self.market_demand = self.market_demand.map(|demand| demand.min(PERCENT_MAX));
    }
}

impl Filterable for Skill {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.category.as_deref());
        fields
    }

    fn category_label(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn primary_date(&self) -> Option<i64> {
        Some(self.meta.last_modified)
    }
}
