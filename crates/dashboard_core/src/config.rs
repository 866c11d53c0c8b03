//! Core configuration and seed data loading.
//!
//! # Responsibility
//! - Parse `CoreConfig` from JSON with defaults for missing keys.
//! - Parse `SeedData` documents used to populate stores at startup.
//!
//! # Invariants
//! - Unknown configuration keys are rejected.
//! - Loading never panics; all failures surface as `ConfigError`.

use crate::logging::default_log_level;
use crate::model::{Job, MarketInsight, Note, Project, Resource, Skill, Task};
use crate::store::DEFAULT_CACHE_TTL_MS;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Runtime configuration of the dashboard core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Lifetime of cached lookups.
    pub cache_ttl_ms: i64,
    /// Default limit for "recent" queries.
    pub recent_limit: usize,
    /// Default threshold for `AppContext::relevant_jobs`.
    pub relevant_job_min_match: u8,
    /// Default limit for `hot_skills`.
    pub hot_skills_limit: usize,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            recent_limit: 5,
            relevant_job_min_match: 60,
            hot_skills_limit: 5,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_json(path.as_ref())
    }
}

/// Initial entities for every kind; missing lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedData {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub notes: Vec<Note>,
    pub skills: Vec<Skill>,
    pub resources: Vec<Resource>,
    pub insights: Vec<MarketInsight>,
    pub jobs: Vec<Job>,
}

impl SeedData {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_json(path.as_ref())
    }

    /// Total entity count across kinds.
    pub fn len(&self) -> usize {
        self.tasks.len()
            + self.projects.len()
            + self.notes.len()
            + self.skills.len()
            + self.resources.len()
            + self.insights.len()
            + self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(ConfigError::Parse)
}

/// Configuration or seed loading error.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid json: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, SeedData};
    use std::io::Write;

    #[test]
    fn missing_keys_take_defaults() {
        let config = CoreConfig::from_json_str(r#"{"cache_ttl_ms": 250}"#).unwrap();
        assert_eq!(config.cache_ttl_ms, 250);
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.relevant_job_min_match, 60);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CoreConfig::from_json_str(r#"{"cache_ttl": 250}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_files_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match CoreConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn seed_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tasks":[{{"id":"task-1","name":"Write docs","priority":"HIGH"}}],
                "skills":[{{"id":"skill-1","name":"Rust","level":40}}]}}"#
        )
        .unwrap();
        let seed = SeedData::load(file.path()).unwrap();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed.tasks[0].name, "Write docs");
        assert_eq!(seed.skills[0].level, 40);
    }
}
