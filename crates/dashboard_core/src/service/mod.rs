//! Core use-case services.
//!
//! # Responsibility
//! - Expose one reactive service per entity kind over the store layer.
//! - Keep UI consumers decoupled from storage and caching details.
//!
//! The generic `EntityService` carries CRUD, caching and notification;
//! per-kind modules add their queries as inherent impls.

pub mod entity_service;
pub mod job_service;
pub mod market_service;
pub mod note_service;
pub mod project_service;
pub mod resource_service;
pub mod skill_service;
pub mod task_service;

pub use entity_service::EntityService;
pub use job_service::JobService;
pub use market_service::{MarketService, TrendFilter};
pub use note_service::NoteService;
pub use project_service::ProjectService;
pub use resource_service::ResourceService;
pub use skill_service::SkillService;
pub use task_service::TaskService;
