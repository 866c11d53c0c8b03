//! In-memory storage, change notification and lookup caching.
//!
//! # Responsibility
//! - Hold entity state per kind behind the `EntityStore` capability.
//! - Publish snapshots and failure events to UI listeners.
//! - Memoize single-entity and filtered-list lookups for a short TTL.

pub mod cache;
pub mod entity_store;
pub mod notifier;

pub use cache::{TtlCache, DEFAULT_CACHE_TTL_MS};
pub use entity_store::{EntityStore, InMemoryStore, Snapshot, StoreError, StoreResult};
pub use notifier::{ErrorChannel, ErrorEvent, Operation, SnapshotNotifier, Subscription};
