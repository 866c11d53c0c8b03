//! Project entity.

use crate::model::common::{clamp_percent, non_blank, parse_calendar_date};
use crate::model::{Entity, EntityKind, EntityMeta, Label, Priority, TaskStatus, PERCENT_MAX};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<i64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Loose user reference.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Whole currency units.
    #[serde(default)]
    pub budget: Option<u64>,
    /// Percent complete, `0..=100`.
    #[serde(default)]
    pub progress: u8,
}

/// Create/update payload for projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub is_completed: Option<bool>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub owner_id: Option<String>,
    pub team_members: Option<Vec<String>>,
    pub department: Option<String>,
    pub budget: Option<i64>,
    pub progress: Option<i64>,
}

impl ProjectInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Project {
    /// Not completed by flag nor by status.
    pub fn is_active(&self) -> bool {
        !self.is_completed && self.status != TaskStatus::Completed
    }
}

impl Entity for Project {
    type Input = ProjectInput;

    const KIND: EntityKind = EntityKind::Project;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &ProjectInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("name", input.name.as_deref());
        rules.one_of::<TaskStatus>("status", input.status.as_deref());
        rules.one_of::<Priority>("priority", input.priority.as_deref());
        rules.calendar_date("due_date", input.due_date.as_deref());
        rules.non_negative("budget", input.budget);
        rules.percent("progress", input.progress);
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: ProjectInput) -> Self {
        let mut project = Self {
            meta,
            name: String::new(),
            description: None,
            due_at: None,
            is_completed: false,
            status: TaskStatus::NotStarted,
            priority: Priority::default(),
            owner_id: None,
            team_members: Vec::new(),
            department: None,
            budget: None,
            progress: 0,
        };
        project.apply_input(input);
        project
    }

    fn apply_input(&mut self, input: ProjectInput) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            self.description = non_blank(description);
        }
        if let Some(due) = input.due_date.as_deref().and_then(parse_calendar_date) {
            self.due_at = Some(due);
        }
        if let Some(done) = input.is_completed {
            self.is_completed = done;
        }
        if let Some(status) = input.status.as_deref().and_then(TaskStatus::parse_label) {
            self.status = status;
        }
        if let Some(priority) = input.priority.as_deref().and_then(Priority::parse_label) {
            self.priority = priority;
        }
        if let Some(owner_id) = input.owner_id {
            self.owner_id = non_blank(owner_id);
        }
        if let Some(team_members) = input.team_members {
            self.team_members = team_members;
        }
        if let Some(department) = input.department {
            self.department = non_blank(department);
        }
        if let Some(budget) = input.budget {
            self.budget = Some(u64::try_from(budget.max(0)).unwrap_or(0));
        }
        if let Some(progress) = input.progress {
            self.progress = clamp_percent(progress);
        }
    }

    fn normalize(&mut self) {
        self.progress = self.progress.min(PERCENT_MAX);
    }
}

impl Filterable for Project {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.department.as_deref());
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.label())
    }

    fn priority(&self) -> Option<Priority> {
        Some(self.priority)
    }

    fn category_label(&self) -> Option<&str> {
        self.department.as_deref()
    }

    fn primary_date(&self) -> Option<i64> {
        self.due_at
    }
}
