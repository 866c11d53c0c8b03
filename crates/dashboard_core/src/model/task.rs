//! Task entity.
//!
//! # Invariants
//! - `completed_at` is set exactly when `is_completed` is true.
//! - Tags are stored normalized (lowercase, deduplicated, sorted).

use crate::model::common::{non_blank, normalize_tags, parse_calendar_date, to_count};
use crate::model::{Entity, EntityId, EntityKind, EntityMeta, Label, Priority, TaskStatus};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};

/// Work category of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    #[default]
    Development,
    Design,
    Testing,
    Documentation,
    Deployment,
}

impl Label for TaskCategory {
    const ALL: &'static [Self] = &[
        Self::Development,
        Self::Design,
        Self::Testing,
        Self::Documentation,
        Self::Deployment,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Development => "DEVELOPMENT",
            Self::Design => "DESIGN",
            Self::Testing => "TESTING",
            Self::Documentation => "DOCUMENTATION",
            Self::Deployment => "DEPLOYMENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Epoch ms of the due date (UTC midnight for plain dates).
    #[serde(default)]
    pub due_at: Option<i64>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: TaskCategory,
    /// Loose reference; the project may not exist.
    #[serde(default)]
    pub project_id: Option<EntityId>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// Task ids that must finish first.
    #[serde(default)]
    pub prerequisites: Vec<EntityId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Create/update payload for tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskInput {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339.
    pub due_date: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub is_completed: Option<bool>,
    pub is_milestone: Option<bool>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub prerequisites: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl TaskInput {
    /// Payload carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Task {
    /// Whether the task is incomplete and its due date is before `now_ms`.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.is_completed && self.due_at.is_some_and(|due| due < now_ms)
    }
}

impl Entity for Task {
    type Input = TaskInput;

    const KIND: EntityKind = EntityKind::Task;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &TaskInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("name", input.name.as_deref());
        rules.one_of::<Priority>("priority", input.priority.as_deref());
        rules.one_of::<TaskStatus>("status", input.status.as_deref());
        rules.one_of::<TaskCategory>("category", input.category.as_deref());
        rules.calendar_date("due_date", input.due_date.as_deref());
        rules.non_negative("estimated_minutes", input.estimated_minutes);
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: TaskInput) -> Self {
        let mut task = Self {
            meta,
            name: String::new(),
            description: None,
            due_at: None,
            estimated_minutes: None,
            is_completed: false,
            completed_at: None,
            is_milestone: false,
            status: TaskStatus::NotStarted,
            priority: Priority::default(),
            category: TaskCategory::default(),
            project_id: None,
            assignee_id: None,
            prerequisites: Vec::new(),
            tags: Vec::new(),
        };
        task.apply_input(input);
        task
    }

    fn apply_input(&mut self, input: TaskInput) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            self.description = non_blank(description);
        }
        if let Some(due) = input.due_date.as_deref().and_then(parse_calendar_date) {
            self.due_at = Some(due);
        }
        if let Some(minutes) = input.estimated_minutes {
            self.estimated_minutes = Some(to_count(minutes));
        }
        if let Some(status) = input.status.as_deref().and_then(TaskStatus::parse_label) {
            self.status = status;
        }
        if let Some(done) = input.is_completed {
            self.is_completed = done;
            if input.status.is_none() {
                if done {
                    self.status = TaskStatus::Completed;
                } else if self.status == TaskStatus::Completed {
                    self.status = TaskStatus::InProgress;
                }
            }
        }
        if let Some(milestone) = input.is_milestone {
            self.is_milestone = milestone;
        }
        if let Some(priority) = input.priority.as_deref().and_then(Priority::parse_label) {
            self.priority = priority;
        }
        if let Some(category) = input.category.as_deref().and_then(TaskCategory::parse_label) {
            self.category = category;
        }
        if let Some(project_id) = input.project_id {
            self.project_id = non_blank(project_id).map(EntityId::from);
        }
        if let Some(assignee_id) = input.assignee_id {
            self.assignee_id = non_blank(assignee_id);
        }
        if let Some(prerequisites) = input.prerequisites {
            self.prerequisites = prerequisites.into_iter().map(EntityId::from).collect();
        }
        if let Some(tags) = input.tags {
            self.tags = tags;
        }
    }

    fn normalize(&mut self) {
        self.tags = normalize_tags(&self.tags);
        if self.is_completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(self.meta.last_modified);
            }
        } else {
            self.completed_at = None;
        }
    }
}

impl Filterable for Task {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.label())
    }

    fn priority(&self) -> Option<Priority> {
        Some(self.priority)
    }

    fn category_label(&self) -> Option<&str> {
        Some(self.category.label())
    }

    fn primary_date(&self) -> Option<i64> {
        self.due_at
    }

    fn tag_values(&self) -> &[String] {
        &self.tags
    }
}
