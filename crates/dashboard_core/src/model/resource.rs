//! Learning resource entity (courses, articles, modules).
//!
//! Resources form a loose tree through `parent_id`; a missing parent is
//! tolerated and simply yields no siblings.

use crate::model::common::{clamp_percent, non_blank, to_count};
use crate::model::{Entity, EntityId, EntityKind, EntityMeta, PERCENT_MAX};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};

const DEFAULT_RESOURCE_TYPE: &str = "resource";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Free-form type label (`resource`, `course`, `article`, ...).
    #[serde(default = "default_resource_type")]
    pub resource_type: String,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub modules: u32,
    /// Never exceeds `modules`.
    #[serde(default)]
    pub completed_modules: u32,
    #[serde(default)]
    pub content: Vec<String>,
}

fn default_resource_type() -> String {
    DEFAULT_RESOURCE_TYPE.to_string()
}

/// Create/update payload for resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub resource_type: Option<String>,
    pub parent_id: Option<String>,
    pub url: Option<String>,
    pub progress: Option<i64>,
    pub modules: Option<i64>,
    pub completed_modules: Option<i64>,
    pub content: Option<Vec<String>>,
}

impl ResourceInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Entity for Resource {
    type Input = ResourceInput;

    const KIND: EntityKind = EntityKind::Resource;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &ResourceInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("name", input.name.as_deref());
        rules.percent("progress", input.progress);
        rules.non_negative("modules", input.modules);
        rules.non_negative("completed_modules", input.completed_modules);
        if let (Some(modules), Some(completed)) = (input.modules, input.completed_modules) {
            rules.ensure(
                completed <= modules,
                "completed_modules",
                "cannot exceed modules",
            );
        }
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: ResourceInput) -> Self {
        let mut resource = Self {
            meta,
            name: String::new(),
            category: None,
            resource_type: default_resource_type(),
            parent_id: None,
            url: None,
            progress: 0,
            modules: 0,
            completed_modules: 0,
            content: Vec::new(),
        };
        resource.apply_input(input);
        resource
    }

    fn apply_input(&mut self, input: ResourceInput) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = input.category {
            self.category = non_blank(category);
        }
        if let Some(resource_type) = input.resource_type.and_then(non_blank) {
            self.resource_type = resource_type;
        }
        if let Some(parent_id) = input.parent_id {
            self.parent_id = non_blank(parent_id).map(EntityId::from);
        }
        if let Some(url) = input.url {
            self.url = non_blank(url);
        }
        if let Some(progress) = input.progress {
            self.progress = clamp_percent(progress);
        }
        if let Some(modules) = input.modules {
            self.modules = to_count(modules);
        }
        if let Some(completed) = input.completed_modules {
            self.completed_modules = to_count(completed);
        }
        if let Some(content) = input.content {
            self.content = content;
        }
    }

    fn check_merged(&self) -> Vec<Violation> {
        let mut rules = Rules::new(WriteMode::Update);
        rules.ensure(
            self.completed_modules <= self.modules,
            "completed_modules",
            "cannot exceed modules",
        );
        rules.into_violations()
    }

    fn normalize(&mut self) {
        self.progress = self.progress.min(PERCENT_MAX);
        self.completed_modules = self.completed_modules.min(self.modules);
    }
}

impl Filterable for Resource {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.category.as_deref());
        fields.extend(self.content.iter().map(String::as_str));
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.resource_type.as_str())
    }

    fn category_label(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn primary_date(&self) -> Option<i64> {
        Some(self.meta.last_modified)
    }
}
