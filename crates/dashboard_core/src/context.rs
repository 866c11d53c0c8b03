//! Application context owning one service per entity kind.
//!
//! # Responsibility
//! - Build every service from one `CoreConfig`, clock and id source.
//! - Seed stores from `SeedData`.
//! - Answer cross-store questions (progress, job matching, relevance,
//!   dashboard statistics).
//!
//! # Invariants
//! - All services share the same clock, so timestamps are comparable.
//! - Cross-store queries read snapshots and never mutate.

use crate::clock::{Clock, IdGenerator, RandomIds, SystemClock};
use crate::config::{CoreConfig, SeedData};
use crate::metrics::{self, DashboardStatistics, StatsPeriod};
use crate::model::{Entity, Job, MarketInsight, Note, Project, Task};
use crate::service::{
    JobService, MarketService, NoteService, ProjectService, ResourceService, SkillService,
    TaskService,
};
use crate::store::{StoreError, StoreResult};
use crate::validate::require_argument;
use log::info;
use std::cmp::Reverse;
use std::rc::Rc;

pub struct AppContext {
    config: CoreConfig,
    clock: Rc<dyn Clock>,
    tasks: TaskService,
    projects: ProjectService,
    notes: NoteService,
    skills: SkillService,
    resources: ResourceService,
    insights: MarketService,
    jobs: JobService,
}

impl AppContext {
    /// Context on the system clock with random ids.
    pub fn new(config: CoreConfig) -> Self {
        Self::with_parts(config, Rc::new(SystemClock), Rc::new(RandomIds))
    }

    /// Context on injected time and id sources (tests, replays).
    pub fn with_parts(
        config: CoreConfig,
        clock: Rc<dyn Clock>,
        ids: Rc<dyn IdGenerator>,
    ) -> Self {
        let ttl = config.cache_ttl_ms;
        Self {
            tasks: TaskService::new(Rc::clone(&clock), Rc::clone(&ids), ttl),
            projects: ProjectService::new(Rc::clone(&clock), Rc::clone(&ids), ttl),
            notes: NoteService::new(Rc::clone(&clock), Rc::clone(&ids), ttl),
            skills: SkillService::new(Rc::clone(&clock), Rc::clone(&ids), ttl),
            resources: ResourceService::new(Rc::clone(&clock), Rc::clone(&ids), ttl),
            insights: MarketService::new(Rc::clone(&clock), Rc::clone(&ids), ttl),
            jobs: JobService::new(Rc::clone(&clock), ids, ttl),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn notes(&self) -> &NoteService {
        &self.notes
    }

    pub fn skills(&self) -> &SkillService {
        &self.skills
    }

    pub fn resources(&self) -> &ResourceService {
        &self.resources
    }

    pub fn insights(&self) -> &MarketService {
        &self.insights
    }

    pub fn jobs(&self) -> &JobService {
        &self.jobs
    }

    /// Replaces the content of every store with `seed`.
    ///
    /// # Errors
    /// - `StoreError::Validation` when a seeded entity has a blank id; stores
    ///   seeded before the failing kind keep their new content.
    pub fn seed(&self, seed: SeedData) -> StoreResult<()> {
        let total = seed.len();
        self.tasks.set_initial_data(seed.tasks)?;
        self.projects.set_initial_data(seed.projects)?;
        self.notes.set_initial_data(seed.notes)?;
        self.skills.set_initial_data(seed.skills)?;
        self.resources.set_initial_data(seed.resources)?;
        self.insights.set_initial_data(seed.insights)?;
        self.jobs.set_initial_data(seed.jobs)?;
        info!(
            "event=context_seed module=context status=ok count={}",
            total
        );
        Ok(())
    }

    /// Completion rate over the tasks of `project_id`.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `project_id` is blank.
    pub fn project_progress(&self, project_id: &str) -> StoreResult<u8> {
        let project_id = require_argument(Project::KIND, "project_id", project_id)?;
        Ok(metrics::project_progress(project_id, &self.tasks.snapshot()))
    }

    /// Share of the job's required skills covered by stored skills.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the job does not exist.
    pub fn job_match_percentage(&self, job_id: &str) -> StoreResult<u8> {
        let job = self
            .jobs
            .get_by_id(job_id)
            .ok_or_else(|| StoreError::not_found(Job::KIND, job_id))?;
        Ok(metrics::job_match_percentage(
            &job.required_skills,
            &self.skills.snapshot(),
        ))
    }

    /// Jobs matching at least `min_match` percent (config default when
    /// `None`), best match first, with `match_percentage` filled in.
    ///
    /// Stored jobs are not modified.
    pub fn relevant_jobs(&self, min_match: Option<u8>) -> Vec<Job> {
        let min_match = min_match.unwrap_or(self.config.relevant_job_min_match);
        let skills = self.skills.snapshot();
        let mut relevant: Vec<Job> = self
            .jobs
            .snapshot()
            .iter()
            .filter_map(|job| {
                let matched = metrics::job_match_percentage(&job.required_skills, &skills);
                (matched >= min_match).then(|| Job {
                    match_percentage: Some(matched),
                    ..job.clone()
                })
            })
            .collect();
        relevant.sort_by_key(|job| Reverse(job.match_percentage));
        relevant
    }

    /// # Errors
    /// - `StoreError::NotFound` when the insight does not exist.
    pub fn insight_relevance(&self, insight_id: &str) -> StoreResult<u32> {
        let insight = self
            .insights
            .get_by_id(insight_id)
            .ok_or_else(|| StoreError::not_found(MarketInsight::KIND, insight_id))?;
        Ok(metrics::insight_relevance(&insight, &self.skills.snapshot()))
    }

    /// Hot insights, limited by `hot_skills_limit`.
    pub fn hot_skills(&self) -> Vec<MarketInsight> {
        self.insights.hot_skills(self.config.hot_skills_limit)
    }

    /// Latest notes, limited by `recent_limit`.
    pub fn recent_notes(&self) -> Vec<Note> {
        self.notes.recent_notes(self.config.recent_limit)
    }

    /// Latest tasks of `user_id`, limited by `recent_limit`.
    pub fn recent_activity(&self, user_id: &str) -> StoreResult<Vec<Task>> {
        self.tasks.recent_activity(user_id, self.config.recent_limit)
    }

    /// Dashboard figures for `period`, optionally scoped to `user_id`.
    pub fn statistics(&self, user_id: Option<&str>, period: StatsPeriod) -> DashboardStatistics {
        let notes = self.notes.snapshot();
        metrics::dashboard_statistics(
            &self.tasks.snapshot(),
            &self.projects.snapshot(),
            notes.iter().map(|note| note.meta.created_at),
            user_id,
            period,
            self.clock.now_ms(),
        )
    }
}
