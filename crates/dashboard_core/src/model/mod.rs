//! Domain model for the dashboard entity kinds.
//!
//! # Responsibility
//! - Define the canonical record shape of every entity kind.
//! - Define the form-shaped input payloads and their validation rules.
//!
//! # Invariants
//! - Every entity carries an immutable `EntityId` and `EntityMeta` timestamps.
//! - Relations between kinds are loose ids; dangling references are valid.
//! - Deletion is a hard delete; there are no tombstones.

pub mod common;
pub mod entity;
pub mod job;
pub mod market;
pub mod note;
pub mod project;
pub mod resource;
pub mod skill;
pub mod task;

pub use common::{
    clamp_percent, normalize_tag, normalize_tags, parse_calendar_date, Label, Priority,
    TaskStatus, PERCENT_MAX,
};
pub use entity::{Entity, EntityId, EntityKind, EntityMeta};
pub use job::{ApplicationStatus, Job, JobInput};
pub use market::{MarketInsight, MarketInsightInput, TrendDirection};
pub use note::{derive_preview_text, Note, NoteInput};
pub use project::{Project, ProjectInput};
pub use resource::{Resource, ResourceInput};
pub use skill::{Skill, SkillInput};
pub use task::{Task, TaskCategory, TaskInput};
