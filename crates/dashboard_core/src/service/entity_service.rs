//! Generic entity use-case service.
//!
//! # Responsibility
//! - Validate, apply and publish create/update/delete for one entity kind.
//! - Serve cached single-entity and list lookups.
//! - Report failed mutations on the error channel and the log.
//!
//! # Invariants
//! - Every successful mutation clears the cache before publishing.
//! - Service state is never borrowed while listeners run.
//! - Failures never touch the snapshot stream.
//! - Log lines carry ids and error codes, never entity content.
//!
//! # See also
//! - `store::notifier` for delivery ordering.

use crate::clock::{compose_id, Clock, IdGenerator};
use crate::model::{Entity, EntityId, EntityMeta};
use crate::query::filter::{FilterCriteria, FilterError, FilterOptions};
use crate::store::{
    EntityStore, ErrorChannel, ErrorEvent, InMemoryStore, Operation, Snapshot, SnapshotNotifier,
    StoreError, StoreResult, Subscription, TtlCache,
};
use crate::validate::{ValidationError, Violation, WriteMode};
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;

/// Suffix draws before falling back to a revision-qualified id.
const MAX_ID_ATTEMPTS: usize = 8;

/// Memoized lookup result.
#[derive(Debug, Clone)]
pub(crate) enum CachedLookup<T> {
    One(Option<T>),
    Many(Vec<T>),
}

struct ServiceState<T: Entity, S> {
    store: S,
    cache: TtlCache<CachedLookup<T>>,
}

/// Reactive service over one entity kind.
///
/// Shared by reference; mutation goes through interior mutability.
pub struct EntityService<T: Entity, S: EntityStore<T> = InMemoryStore<T>> {
    state: RefCell<ServiceState<T, S>>,
    notifier: SnapshotNotifier<T>,
    errors: ErrorChannel,
    clock: Rc<dyn Clock>,
    ids: Rc<dyn IdGenerator>,
}

impl<T: Entity> EntityService<T> {
    /// Service over a fresh in-memory store.
    pub fn new(clock: Rc<dyn Clock>, ids: Rc<dyn IdGenerator>, cache_ttl_ms: i64) -> Self {
        Self::with_store(InMemoryStore::new(), clock, ids, cache_ttl_ms)
    }
}

impl<T: Entity, S: EntityStore<T>> EntityService<T, S> {
    pub fn with_store(
        store: S,
        clock: Rc<dyn Clock>,
        ids: Rc<dyn IdGenerator>,
        cache_ttl_ms: i64,
    ) -> Self {
        let initial = store.snapshot();
        Self {
            state: RefCell::new(ServiceState {
                store,
                cache: TtlCache::new(cache_ttl_ms),
            }),
            notifier: SnapshotNotifier::new(initial),
            errors: ErrorChannel::new(),
            clock,
            ids,
        }
    }

    /// Validates `input` and stores a new entity with a fresh id.
    ///
    /// # Errors
    /// - `StoreError::Validation` carrying every violated rule.
    pub fn create(&self, input: T::Input) -> StoreResult<T> {
        let violations = T::validate(&input, WriteMode::Create);
        if !violations.is_empty() {
            return Err(self.reject(Operation::Create, None, violations));
        }

        let now = self.clock.now_ms();
        let outcome = {
            let mut state = self.state.borrow_mut();
            let id = self.fresh_id(&state.store, now);
            let mut entity = T::from_input(EntityMeta::new(id, now), input);
            let violations = entity.check_merged();
            if violations.is_empty() {
                entity.normalize();
                state.store.add(entity.clone());
                state.cache.clear();
                Ok((entity, state.store.snapshot()))
            } else {
                Err(violations)
            }
        };
        let (entity, snapshot) = match outcome {
            Ok(created) => created,
            Err(violations) => return Err(self.reject(Operation::Create, None, violations)),
        };

        info!(
            "event=entity_create module=service kind={} status=ok id={}",
            T::KIND,
            entity.id()
        );
        self.notifier.publish(snapshot);
        Ok(entity)
    }

    /// Merges `input` into the entity stored under `id`.
    ///
    /// Validation runs first, so an invalid payload for a missing id reports
    /// the violations rather than `NotFound`.
    ///
    /// # Errors
    /// - `StoreError::Validation` carrying every violated rule.
    /// - `StoreError::NotFound` when `id` is blank or absent.
    pub fn update(&self, id: &str, input: T::Input) -> StoreResult<T> {
        let violations = T::validate(&input, WriteMode::Update);
        if !violations.is_empty() {
            return Err(self.reject(Operation::Update, Some(id), violations));
        }

        let now = self.clock.now_ms();
        let outcome = {
            let mut state = self.state.borrow_mut();
            let existing = if id.trim().is_empty() {
                None
            } else {
                state.store.get(id).cloned()
            };
            match existing {
                Some(mut entity) => {
                    let key = entity.id().clone();
                    entity.apply_input(input);
                    let violations = entity.check_merged();
                    if violations.is_empty() {
                        entity.meta_mut().touch(now);
                        entity.normalize();
                        match state.store.update(&key, entity.clone()) {
                            Ok(()) => {
                                state.cache.clear();
                                Ok((entity, state.store.snapshot()))
                            }
                            Err(err) => Err(err),
                        }
                    } else {
                        Err(ValidationError::new(T::KIND, violations).into())
                    }
                }
                None => Err(StoreError::not_found(T::KIND, id)),
            }
        };

        match outcome {
            Ok((entity, snapshot)) => {
                info!(
                    "event=entity_update module=service kind={} status=ok id={}",
                    T::KIND,
                    entity.id()
                );
                self.notifier.publish(snapshot);
                Ok(entity)
            }
            Err(err) => Err(self.fail(Operation::Update, Some(id), err)),
        }
    }

    /// Removes the entity stored under `id`.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is blank or absent.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if id.trim().is_empty() || !state.store.delete(&EntityId::from(id)) {
                None
            } else {
                state.cache.clear();
                Some(state.store.snapshot())
            }
        };

        let Some(snapshot) = snapshot else {
            return Err(self.fail(
                Operation::Delete,
                Some(id),
                StoreError::not_found(T::KIND, id),
            ));
        };
        info!(
            "event=entity_delete module=service kind={} status=ok id={}",
            T::KIND,
            id
        );
        self.notifier.publish(snapshot);
        Ok(())
    }

    /// Entity by id, memoized for the cache TTL. Blank ids never match.
    pub fn get_by_id(&self, id: &str) -> Option<T> {
        if id.trim().is_empty() {
            return None;
        }
        let key = format!("{}_{id}", T::KIND);
        let now = self.clock.now_ms();
        let mut state = self.state.borrow_mut();
        if let Some(CachedLookup::One(hit)) = state.cache.get(&key, now) {
            return hit;
        }
        let found = state.store.get(id).cloned();
        state
            .cache
            .insert(key, CachedLookup::One(found.clone()), now);
        found
    }

    /// Defensive copy of every entity, in store order.
    pub fn get_all(&self) -> Vec<T> {
        self.state.borrow().store.get_all()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().store.snapshot()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().store.revision()
    }

    /// Entities matching every criterion, in store order.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<T> {
        criteria.apply(&self.snapshot())
    }

    /// Parses form-shaped options and filters with them.
    ///
    /// # Errors
    /// - `FilterError::Invalid` for bad priority labels or dates.
    pub fn filter_with(&self, options: FilterOptions) -> Result<Vec<T>, FilterError> {
        let criteria = options.into_criteria()?;
        Ok(self.filter(&criteria))
    }

    /// Registers a snapshot listener; the current snapshot is replayed first.
    pub fn subscribe(&self, callback: impl FnMut(&Snapshot<T>) + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Registers a failed-mutation listener. Past failures are not replayed.
    pub fn subscribe_errors(&self, callback: impl FnMut(&ErrorEvent) + 'static) -> Subscription {
        self.errors.subscribe(callback)
    }

    /// Replaces every entity (seeding). Entities keep their ids and timestamps.
    ///
    /// # Errors
    /// - `StoreError::Validation` when an entity has a blank id; nothing is
    ///   stored in that case.
    pub fn set_initial_data(&self, entities: Vec<T>) -> StoreResult<()> {
        if entities.iter().any(|entity| entity.id().is_blank()) {
            let violations = vec![Violation::new("id", "is required")];
            return Err(self.reject(Operation::SetInitialData, None, violations));
        }

        let count = entities.len();
        let snapshot = {
            let mut state = self.state.borrow_mut();
            state.store.set_all(entities);
            state.cache.clear();
            state.store.snapshot()
        };
        info!(
            "event=entity_seed module=service kind={} status=ok count={}",
            T::KIND,
            count
        );
        self.notifier.publish(snapshot);
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Memoized list lookup; `select` runs on a snapshot with no state borrowed.
    pub(crate) fn cached_list(&self, key: &str, select: impl FnOnce(&[T]) -> Vec<T>) -> Vec<T> {
        let now = self.clock.now_ms();
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if let Some(CachedLookup::Many(hit)) = state.cache.get(key, now) {
                return hit;
            }
            state.store.snapshot()
        };
        let selected = select(&snapshot);
        self.state
            .borrow_mut()
            .cache
            .insert(key, CachedLookup::Many(selected.clone()), now);
        selected
    }

    /// Uncached clones of the entities matching `predicate`.
    pub(crate) fn select(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.snapshot()
            .iter()
            .filter(|entity| predicate(entity))
            .cloned()
            .collect()
    }

    /// Reports a missing `id` like a failed mutation would.
    pub(crate) fn report_missing(&self, operation: Operation, id: &str) -> StoreError {
        self.fail(operation, Some(id), StoreError::not_found(T::KIND, id))
    }

    fn fresh_id(&self, store: &S, now: i64) -> EntityId {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = compose_id(T::KIND, now, &self.ids.next_suffix());
            if store.get(candidate.as_str()).is_none() {
                return candidate;
            }
        }
        let fallback = format!("{}-r{}", self.ids.next_suffix(), store.revision());
        compose_id(T::KIND, now, &fallback)
    }

    fn reject(
        &self,
        operation: Operation,
        id: Option<&str>,
        violations: Vec<Violation>,
    ) -> StoreError {
        self.fail(
            operation,
            id,
            ValidationError::new(T::KIND, violations).into(),
        )
    }

    fn fail(&self, operation: Operation, id: Option<&str>, err: StoreError) -> StoreError {
        warn!(
            "event=entity_{} module=service kind={} status=error id={} error_code={}",
            operation,
            T::KIND,
            id.unwrap_or("-"),
            err.code()
        );
        self.errors
            .emit(ErrorEvent::new(T::KIND, operation, err.clone()));
        err
    }
}
