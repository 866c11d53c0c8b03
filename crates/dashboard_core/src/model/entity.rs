//! Entity identity, temporal metadata and the per-kind entity contract.
//!
//! # Responsibility
//! - Define the identity/timestamp shape every entity kind shares.
//! - Define the `Entity` contract the generic store and service build on.
//!
//! # Invariants
//! - `EntityId` is assigned once at creation and never changes.
//! - `created_at` is set once; `last_modified` never moves backwards.

use crate::query::filter::Filterable;
use crate::validate::{Violation, WriteMode};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};

/// Stable string identifier, e.g. `task-1718000000000-k3j9x0a1b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the id is empty after trimming; blank ids never match an entity.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Entity kinds managed by the dashboard core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Project,
    Note,
    Skill,
    Resource,
    MarketInsight,
    Job,
}

impl EntityKind {
    /// Stable name used in logs, cache keys and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
            Self::Note => "note",
            Self::Skill => "skill",
            Self::Resource => "resource",
            Self::MarketInsight => "market_insight",
            Self::Job => "job",
        }
    }

    /// Prefix of generated ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "proj",
            Self::Note => "note",
            Self::Skill => "skill",
            Self::Resource => "res",
            Self::MarketInsight => "insight",
            Self::Job => "job",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and timestamps shared by every entity.
///
/// Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: EntityId,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub last_modified: i64,
}

impl EntityMeta {
    /// Metadata for an entity created at `now_ms`.
    pub fn new(id: EntityId, now_ms: i64) -> Self {
        Self {
            id,
            created_at: now_ms,
            last_modified: now_ms,
        }
    }

    /// Records a mutation at `now_ms`.
    ///
    /// A clock that steps backwards leaves `last_modified` unchanged.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_modified = self.last_modified.max(now_ms);
    }
}

/// Contract implemented by every entity kind.
///
/// `Input` is the partial, form-shaped write payload: every field optional,
/// enum and date fields still in their raw string form. `validate` checks it,
/// `from_input`/`apply_input` convert it once validation passed.
pub trait Entity: Filterable + Clone + Debug + 'static {
    /// Partial write payload used by both create and update.
    type Input: Clone + Debug + Default;

    const KIND: EntityKind;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Returns every violated rule for `input`; empty means acceptable.
    fn validate(input: &Self::Input, mode: WriteMode) -> Vec<Violation>;

    /// Builds a new entity from a validated create payload.
    fn from_input(meta: EntityMeta, input: Self::Input) -> Self;

    /// Merges a validated update payload; fields left `None` are kept.
    ///
    /// Must not touch `meta`.
    fn apply_input(&mut self, input: Self::Input);

    /// Rules spanning stored and incoming fields, checked after an input is
    /// merged and before `normalize`. A non-empty result rejects the write.
    fn check_merged(&self) -> Vec<Violation> {
        Vec::new()
    }

    /// Restores standing field invariants (percent clamping, derived fields).
    ///
    /// Runs on every store write, including bulk seeding.
    fn normalize(&mut self) {}

    fn id(&self) -> &EntityId {
        &self.meta().id
    }
}
