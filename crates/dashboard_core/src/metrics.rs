//! Derived metrics over entity snapshots.
//!
//! # Responsibility
//! - Compute completion, overdue, progress, matching and relevance figures.
//! - Aggregate dashboard statistics for a week/month period.
//!
//! # Invariants
//! - Every function is pure: inputs are borrowed, time is passed in.
//! - Percentages of an empty population are 0.

use crate::model::{MarketInsight, Project, Skill, Task};
use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};

const LOW_PROGRESS_BELOW: u8 = 30;
const MEDIUM_PROGRESS_BELOW: u8 = 70;

/// Rounded share of `part` in `total`, in percent. 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = part.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

/// Share of completed tasks, in percent.
pub fn completion_rate(tasks: &[Task]) -> u8 {
    let completed = tasks.iter().filter(|task| task.is_completed).count();
    percentage(completed, tasks.len())
}

/// Incomplete tasks whose due date is before `now_ms`.
pub fn overdue_tasks(tasks: &[Task], now_ms: i64) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.is_overdue(now_ms))
        .cloned()
        .collect()
}

pub fn overdue_count(tasks: &[Task], now_ms: i64) -> usize {
    tasks.iter().filter(|task| task.is_overdue(now_ms)).count()
}

/// Coarse progress band used for color coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBucket {
    Low,
    Medium,
    High,
}

pub fn progress_bucket(progress: u8) -> ProgressBucket {
    if progress < LOW_PROGRESS_BELOW {
        ProgressBucket::Low
    } else if progress < MEDIUM_PROGRESS_BELOW {
        ProgressBucket::Medium
    } else {
        ProgressBucket::High
    }
}

/// Completion rate over the tasks referencing `project_id`.
pub fn project_progress(project_id: &str, tasks: &[Task]) -> u8 {
    let (completed, total) = tasks
        .iter()
        .filter(|task| {
            task.project_id
                .as_ref()
                .is_some_and(|id| id.as_str() == project_id)
        })
        .fold((0, 0), |(completed, total), task| {
            (completed + usize::from(task.is_completed), total + 1)
        });
    percentage(completed, total)
}

/// Skills below their target, largest gap first.
pub fn skill_gaps(skills: &[Skill]) -> Vec<Skill> {
    let mut gaps: Vec<Skill> = skills.iter().filter(|skill| skill.gap() > 0).cloned().collect();
    gaps.sort_by_key(|skill| std::cmp::Reverse(skill.gap()));
    gaps
}

/// Every skill ordered by gap, largest first; ties keep input order.
pub fn sorted_by_gap(skills: &[Skill]) -> Vec<Skill> {
    let mut sorted = skills.to_vec();
    sorted.sort_by_key(|skill| std::cmp::Reverse(skill.gap()));
    sorted
}

/// Share of `required` skills matched by a user skill name.
///
/// A requirement matches when either name contains the other,
/// case-insensitively. No requirements means no match (0).
pub fn job_match_percentage(required: &[String], skills: &[Skill]) -> u8 {
    let names: Vec<String> = skills.iter().map(|skill| skill.name.to_lowercase()).collect();
    let matched = required
        .iter()
        .map(|requirement| requirement.to_lowercase())
        .filter(|requirement| {
            names
                .iter()
                .any(|name| name.contains(requirement.as_str()) || requirement.contains(name.as_str()))
        })
        .count();
    percentage(matched, required.len())
}

/// Weighted relevance score of an insight for the user's skills.
///
/// `round((0.4 * skill_match + 0.3 * growth / 50 + 0.3 * market_level / 100) * 100)`,
/// floored at 0. Fast growth can push the score above 100.
pub fn insight_relevance(insight: &MarketInsight, skills: &[Skill]) -> u32 {
    let names: Vec<String> = skills.iter().map(|skill| skill.name.to_lowercase()).collect();
    let matched = insight
        .top_skills
        .iter()
        .filter(|top| {
            let top = top.to_lowercase();
            names.iter().any(|name| name.contains(top.as_str()))
        })
        .count();
    let skill_count = insight.top_skills.len().max(1);

    let skill_weight = matched as f64 / skill_count as f64 * 0.4;
    let trend_weight = f64::from(insight.growth_rate) / 50.0 * 0.3;
    let demand_weight = f64::from(insight.market_level) / 100.0 * 0.3;
    let score = ((skill_weight + trend_weight + demand_weight) * 100.0).round();
    if score <= 0.0 {
        0
    } else {
        score.min(f64::from(u32::MAX)) as u32
    }
}

/// Reporting window for dashboard statistics, ending now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    /// Last 7 days.
    Week,
    /// Last calendar month.
    #[default]
    Month,
}

impl StatsPeriod {
    /// Inclusive `(start, end)` window ending at `now_ms`.
    pub fn window(self, now_ms: i64) -> (i64, i64) {
        let Some(now) = DateTime::<Utc>::from_timestamp_millis(now_ms) else {
            return (now_ms, now_ms);
        };
        let start = match self {
            Self::Week => now.checked_sub_days(Days::new(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
        };
        (start.map_or(now_ms, |start| start.timestamp_millis()), now_ms)
    }
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    /// Tasks completed inside the period.
    pub tasks_completed: usize,
    pub active_projects: usize,
    /// Notes created inside the period.
    pub notes_created: usize,
    pub completion_rate: u8,
    pub overdue_tasks: usize,
}

/// Aggregates statistics, optionally scoped to one user.
///
/// The user scope applies to task assignees and project owners; notes are
/// not user-scoped.
pub fn dashboard_statistics(
    tasks: &[Task],
    projects: &[Project],
    note_created_at: impl IntoIterator<Item = i64>,
    user_id: Option<&str>,
    period: StatsPeriod,
    now_ms: i64,
) -> DashboardStatistics {
    let (start, end) = period.window(now_ms);
    let in_window = |at: i64| start <= at && at <= end;

    let scoped: Vec<Task> = tasks
        .iter()
        .filter(|task| user_id.map_or(true, |user| task.assignee_id.as_deref() == Some(user)))
        .cloned()
        .collect();

    let tasks_completed = scoped
        .iter()
        .filter(|task| task.is_completed && task.completed_at.is_some_and(in_window))
        .count();
    let active_projects = projects
        .iter()
        .filter(|project| project.is_active())
        .filter(|project| user_id.map_or(true, |user| project.owner_id.as_deref() == Some(user)))
        .count();
    let notes_created = note_created_at
        .into_iter()
        .filter(|created_at| in_window(*created_at))
        .count();

    DashboardStatistics {
        tasks_completed,
        active_projects,
        notes_created,
        completion_rate: completion_rate(&scoped),
        overdue_tasks: overdue_count(&scoped, now_ms),
    }
}
