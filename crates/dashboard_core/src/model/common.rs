//! Shared field types and parsing helpers used by several entity kinds.
//!
//! # Invariants
//! - Enum labels are matched exactly (`HIGH`, not `high`).
//! - Calendar dates are stored as UTC epoch milliseconds.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound for percentage-like fields (progress, level, demand).
pub const PERCENT_MAX: u8 = 100;

/// Closed set of string labels accepted for one enum field.
pub trait Label: Sized + Copy + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Stable external label for this variant.
    fn label(self) -> &'static str;

    /// Parses an exact external label.
    fn parse_label(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|item| item.label() == value)
    }

    /// All accepted labels, used in violation messages.
    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|item| item.label()).collect()
    }
}

/// Priority shared by tasks, projects and market demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Label for Priority {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High, Self::Critical];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Work lifecycle state shared by tasks and projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Active,
    Upcoming,
    #[default]
    NotStarted,
    InProgress,
    Blocked,
    Completed,
    Cancelled,
}

impl Label for TaskStatus {
    const ALL: &'static [Self] = &[
        Self::Active,
        Self::Upcoming,
        Self::NotStarted,
        Self::InProgress,
        Self::Blocked,
        Self::Completed,
        Self::Cancelled,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Upcoming => "UPCOMING",
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Blocked => "BLOCKED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Parses `YYYY-MM-DD` (UTC midnight) or an RFC 3339 timestamp into epoch ms.
pub fn parse_calendar_date(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|datetime| datetime.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.timestamp_millis())
}

/// Clamps a raw percentage-like number into `0..=100`.
pub fn clamp_percent(value: i64) -> u8 {
    // Lossless after clamping.
    value.clamp(0, i64::from(PERCENT_MAX)) as u8
}

/// Normalizes one tag: trimmed and lowercased; blank tags are dropped.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

/// Converts a validated non-negative count into `u32`, saturating.
pub(crate) fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Drops blank optional text.
pub(crate) fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_percent, normalize_tags, parse_calendar_date, Label, Priority, TaskStatus};

    #[test]
    fn parses_plain_dates_and_rfc3339() {
        assert_eq!(parse_calendar_date("1970-01-02"), Some(86_400_000));
        assert_eq!(
            parse_calendar_date("1970-01-01T00:00:01Z"),
            Some(1_000)
        );
        assert_eq!(parse_calendar_date("2024-02-30"), None);
        assert_eq!(parse_calendar_date("tomorrow"), None);
    }

    #[test]
    fn labels_are_exact_match() {
        assert_eq!(Priority::parse_label("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse_label("high"), None);
        assert_eq!(
            TaskStatus::parse_label("NOT_STARTED"),
            Some(TaskStatus::NotStarted)
        );
        assert_eq!(Priority::labels(), vec!["LOW", "MEDIUM", "HIGH", "CRITICAL"]);
    }

    #[test]
    fn clamps_percentages() {
        assert_eq!(clamp_percent(-5), 0);
        assert_eq!(clamp_percent(42), 42);
        assert_eq!(clamp_percent(250), 100);
    }

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        let tags = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "Async".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["async", "rust"]);
    }
}
