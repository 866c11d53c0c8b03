//! Entity store contract and in-memory implementation.
//!
//! # Responsibility
//! - Keep one mapping from id to entity per kind.
//! - Keep a materialized list consistent with the mapping after every write.
//!
//! # Invariants
//! - Every write bumps `revision` and rebuilds the list eagerly.
//! - Every stored entity has passed `Entity::normalize`.
//! - Snapshots handed out are never mutated afterwards.

use crate::model::{Entity, EntityId, EntityKind};
use crate::validate::ValidationError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared immutable view of a store's materialized list.
///
/// Identity (`Rc::ptr_eq`) changes on every write.
pub type Snapshot<T> = Rc<Vec<T>>;

/// Store and service error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Update/delete target does not exist.
    NotFound { kind: EntityKind, id: EntityId },
    /// Payload or query argument rejected by validation.
    Validation(ValidationError),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable machine-readable code, safe to log.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_failed",
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::NotFound { kind, .. } => *kind,
            Self::Validation(err) => err.kind,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Storage capability for one entity kind.
///
/// Services are generic over this trait; the backing implementation is
/// chosen once at construction.
pub trait EntityStore<T: Entity> {
    /// Inserts or overwrites by id.
    fn add(&mut self, entity: T);

    /// Overwrites an existing entity stored under `id`.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is absent.
    fn update(&mut self, id: &EntityId, entity: T) -> StoreResult<()>;

    /// Removes `id` when present; returns whether anything was removed.
    fn delete(&mut self, id: &EntityId) -> bool;

    fn get(&self, id: &str) -> Option<&T>;

    /// Shared handle on the materialized list.
    fn snapshot(&self) -> Snapshot<T>;

    /// Replaces every entity (bulk seeding).
    fn set_all(&mut self, entities: Vec<T>);

    /// Write counter; bumped on every mutation.
    fn revision(&self) -> u64;

    fn len(&self) -> usize;

    /// Defensive copy of the materialized list.
    fn get_all(&self) -> Vec<T> {
        self.snapshot().as_ref().clone()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered in-memory store; list order is id order.
#[derive(Debug)]
pub struct InMemoryStore<T: Entity> {
    entries: BTreeMap<EntityId, T>,
    list: Snapshot<T>,
    revision: u64,
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            list: Rc::new(Vec::new()),
            revision: 0,
        }
    }
}

impl<T: Entity> InMemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild(&mut self) {
        self.revision += 1;
        self.list = Rc::new(self.entries.values().cloned().collect());
    }
}

impl<T: Entity> EntityStore<T> for InMemoryStore<T> {
    fn add(&mut self, mut entity: T) {
        entity.normalize();
        self.entries.insert(entity.id().clone(), entity);
        self.rebuild();
    }

    fn update(&mut self, id: &EntityId, mut entity: T) -> StoreResult<()> {
        let Some(slot) = self.entries.get_mut(id) else {
            return Err(StoreError::not_found(T::KIND, id.clone()));
        };
        // Keys never move; the stored id wins over the payload's.
        entity.meta_mut().id = id.clone();
        entity.normalize();
        *slot = entity;
        self.rebuild();
        Ok(())
    }

    fn delete(&mut self, id: &EntityId) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        self.rebuild();
        true
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    fn snapshot(&self) -> Snapshot<T> {
        Rc::clone(&self.list)
    }

    fn set_all(&mut self, entities: Vec<T>) {
        self.entries.clear();
        for mut entity in entities {
            entity.normalize();
            self.entries.insert(entity.id().clone(), entity);
        }
        self.rebuild();
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
