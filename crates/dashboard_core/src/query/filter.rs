//! Declarative filter engine over entity snapshots.
//!
//! # Responsibility
//! - Turn optional, form-shaped filter options into typed criteria.
//! - Apply criteria as a sequential narrowing fold (logical AND).
//!
//! # Invariants
//! - Input slices are never mutated.
//! - Criteria are pure predicates, so evaluation order never changes the
//!   result; cheaper predicates run first.
//! - Unknown option keys are rejected when options arrive as JSON.

use crate::model::{parse_calendar_date, Entity, Label, Priority};
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attributes an entity exposes to the filter engine.
///
/// Kinds lacking an attribute keep the default `None`/empty, and never match
/// a criterion on that attribute.
pub trait Filterable {
    /// Text fields searched by `Criterion::Search` (OR across fields).
    fn search_fields(&self) -> Vec<&str>;

    fn status_label(&self) -> Option<&str> {
        None
    }

    fn priority(&self) -> Option<Priority> {
        None
    }

    fn category_label(&self) -> Option<&str> {
        None
    }

    /// Epoch ms compared by `Criterion::DateRange`.
    fn primary_date(&self) -> Option<i64> {
        None
    }

    fn tag_values(&self) -> &[String] {
        &[]
    }
}

/// Inclusive epoch-ms range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start <= value && value <= self.end
    }
}

/// One typed filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive substring over `Filterable::search_fields`.
    Search(String),
    /// Case-insensitive label match.
    Status(String),
    Priority(Priority),
    /// Case-insensitive label match.
    Category(String),
    DateRange(DateRange),
    /// Case-insensitive exact tag match.
    Tag(String),
}

impl Criterion {
    fn cost(&self) -> u8 {
        match self {
            Self::Priority(_) => 0,
            Self::Status(_) | Self::Category(_) => 1,
            Self::DateRange(_) => 2,
            Self::Tag(_) => 3,
            Self::Search(_) => 4,
        }
    }

    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        match self {
            Self::Search(query) => {
                let needle = query.to_lowercase();
                item.search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            Self::Status(status) => item
                .status_label()
                .is_some_and(|label| label.eq_ignore_ascii_case(status)),
            Self::Priority(priority) => item.priority() == Some(*priority),
            Self::Category(category) => item
                .category_label()
                .is_some_and(|label| label.eq_ignore_ascii_case(category)),
            Self::DateRange(range) => item
                .primary_date()
                .is_some_and(|value| range.contains(value)),
            Self::Tag(tag) => item
                .tag_values()
                .iter()
                .any(|value| value.eq_ignore_ascii_case(tag)),
        }
    }
}

/// Conjunction of criteria.
///
/// `union` concatenates criteria, so
/// `a.union(b).apply(xs) == b.apply(&a.apply(xs))`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    criteria: Vec<Criterion>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(self, query: impl Into<String>) -> Self {
        self.with(Criterion::Search(query.into()))
    }

    pub fn status(self, status: impl Into<String>) -> Self {
        self.with(Criterion::Status(status.into()))
    }

    pub fn priority(self, priority: Priority) -> Self {
        self.with(Criterion::Priority(priority))
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.with(Criterion::Category(category.into()))
    }

    pub fn date_range(self, range: DateRange) -> Self {
        self.with(Criterion::DateRange(range))
    }

    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.with(Criterion::Tag(tag.into()))
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Both criteria sets must hold.
    pub fn union(mut self, other: FilterCriteria) -> Self {
        self.criteria.extend(other.criteria);
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns clones of the items matching every criterion, in input order.
    pub fn apply<T: Entity>(&self, items: &[T]) -> Vec<T> {
        let mut ordered: Vec<&Criterion> = self.criteria.iter().collect();
        ordered.sort_by_key(|criterion| criterion.cost());

        let mut survivors: Vec<&T> = items.iter().collect();
        for criterion in ordered {
            if survivors.is_empty() {
                break;
            }
            survivors.retain(|item| criterion.matches(*item));
        }
        survivors.into_iter().cloned().collect()
    }
}

/// Form-shaped filter options; every key optional, blank strings ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOptions {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub date_range: Option<DateRangeOptions>,
    pub tag: Option<String>,
}

/// Raw date range as entered in a form (`YYYY-MM-DD` or RFC 3339).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRangeOptions {
    pub start: String,
    pub end: String,
}

impl FilterOptions {
    /// Parses options from JSON, rejecting unknown keys.
    pub fn from_json_str(json: &str) -> Result<Self, FilterError> {
        serde_json::from_str(json).map_err(FilterError::Parse)
    }

    /// Converts options into typed criteria.
    ///
    /// # Errors
    /// - `FilterError::Invalid` with every bad value (priority label, dates).
    pub fn into_criteria(self) -> Result<FilterCriteria, FilterError> {
        let mut rules = Rules::new(WriteMode::Update);
        let priority = present(self.priority);
        rules.one_of::<Priority>("priority", priority.as_deref());
        if let Some(range) = &self.date_range {
            rules.calendar_date("date_range.start", Some(range.start.as_str()));
            rules.calendar_date("date_range.end", Some(range.end.as_str()));
        }
        let violations = rules.into_violations();
        if !violations.is_empty() {
            return Err(FilterError::Invalid(violations));
        }

        let mut criteria = FilterCriteria::new();
        if let Some(value) = priority.as_deref().and_then(Priority::parse_label) {
            criteria = criteria.priority(value);
        }
        if let Some(status) = present(self.status) {
            criteria = criteria.status(status);
        }
        if let Some(category) = present(self.category) {
            criteria = criteria.category(category);
        }
        if let Some(range) = self.date_range {
            if let (Some(start), Some(end)) = (
                parse_calendar_date(&range.start),
                parse_calendar_date(&range.end),
            ) {
                criteria = criteria.date_range(DateRange::new(start, end));
            }
        }
        if let Some(tag) = present(self.tag) {
            criteria = criteria.tag(tag);
        }
        if let Some(search) = present(self.search) {
            criteria = criteria.search(search);
        }
        Ok(criteria)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Filter option parsing errors.
#[derive(Debug)]
pub enum FilterError {
    /// JSON was malformed or carried an unknown key.
    Parse(serde_json::Error),
    /// Values failed validation.
    Invalid(Vec<Violation>),
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid filter options: {err}"),
            Self::Invalid(violations) => {
                let joined = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "invalid filter options: {joined}")
            }
        }
    }
}

impl Error for FilterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}
