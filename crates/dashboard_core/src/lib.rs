//! Core state layer for the productivity dashboard.
//! Reactive in-memory entity stores with validation, filtering, caching and
//! derived metrics; UI layers subscribe to snapshots.

pub mod clock;
pub mod config;
pub mod context;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod validate;

pub use clock::{Clock, IdGenerator, ManualClock, RandomIds, SeededIds, SystemClock};
pub use config::{ConfigError, CoreConfig, SeedData};
pub use context::AppContext;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use metrics::{DashboardStatistics, ProgressBucket, StatsPeriod};
pub use model::{
    ApplicationStatus, Entity, EntityId, EntityKind, EntityMeta, Job, JobInput, MarketInsight,
    MarketInsightInput, Note, NoteInput, Priority, Project, ProjectInput, Resource, ResourceInput,
    Skill, SkillInput, Task, TaskCategory, TaskInput, TaskStatus, TrendDirection,
};
pub use query::filter::{Criterion, DateRange, FilterCriteria, FilterError, FilterOptions};
pub use service::{
    EntityService, JobService, MarketService, NoteService, ProjectService, ResourceService,
    SkillService, TaskService, TrendFilter,
};
pub use store::{
    EntityStore, ErrorEvent, InMemoryStore, Operation, Snapshot, StoreError, StoreResult,
    Subscription,
};
pub use validate::{ValidationError, Violation, WriteMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
