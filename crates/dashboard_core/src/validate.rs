//! Field validation rules shared by every entity kind.
//!
//! # Responsibility
//! - Collect every violated rule for one write payload (never fail-fast).
//! - Keep violation wording stable so UI layers can map it to form fields.
//!
//! # Invariants
//! - An empty violation list means the payload is acceptable.
//! - Required-field rules fire on create, and on update only when supplied.

use crate::model::{parse_calendar_date, EntityKind, Label, PERCENT_MAX};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum character count for names and titles.
pub const MAX_NAME_CHARS: usize = 255;

/// Which write path a payload is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Input field name, in snake_case.
    pub field: &'static str,
    /// Human-readable rule description.
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Rejected write payload, carrying all violations at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: EntityKind,
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(kind: EntityKind, violations: Vec<Violation>) -> Self {
        Self { kind, violations }
    }

    /// Single-violation error, used for blank query arguments.
    pub fn single(kind: EntityKind, field: &'static str, message: impl Into<String>) -> Self {
        Self::new(kind, vec![Violation::new(field, message)])
    }

    /// Fields with at least one violation, in report order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|violation| violation.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{} validation failed: {joined}", self.kind)
    }
}

impl Error for ValidationError {}

/// Violation collector for one payload.
#[derive(Debug)]
pub struct Rules {
    mode: WriteMode,
    violations: Vec<Violation>,
}

impl Rules {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            violations: Vec::new(),
        }
    }

    /// Name/title rule: present on create, non-blank, at most 255 chars.
    pub fn required_text(&mut self, field: &'static str, value: Option<&str>) {
        match value {
            None if self.mode == WriteMode::Create => self.push(field, "is required"),
            None => {}
            Some(text) if text.trim().is_empty() => self.push(field, "is required"),
            Some(text) if text.chars().count() > MAX_NAME_CHARS => self.push(
                field,
                format!("must be {MAX_NAME_CHARS} characters or less"),
            ),
            Some(_) => {}
        }
    }

    /// Enum rule: when supplied, must be one of `L`'s labels.
    pub fn one_of<L: Label>(&mut self, field: &'static str, value: Option<&str>) {
        if let Some(raw) = value {
            if L::parse_label(raw).is_none() {
                self.push(
                    field,
                    format!("`{raw}` is not one of {}", L::labels().join("|")),
                );
            }
        }
    }

    pub fn non_negative(&mut self, field: &'static str, value: Option<i64>) {
        if matches!(value, Some(number) if number < 0) {
            self.push(field, "cannot be negative");
        }
    }

    /// Percentage rule: when supplied, must lie in `0..=100`.
    pub fn percent(&mut self, field: &'static str, value: Option<i64>) {
        if let Some(number) = value {
            if !(0..=i64::from(PERCENT_MAX)).contains(&number) {
                self.push(field, format!("must be between 0 and {PERCENT_MAX}"));
            }
        }
    }

    /// Date rule: when supplied, must parse as a calendar date.
    pub fn calendar_date(&mut self, field: &'static str, value: Option<&str>) {
        if let Some(raw) = value {
            if parse_calendar_date(raw).is_none() {
                self.push(field, "is not a valid date");
            }
        }
    }

    /// Free-form rule; records `message` when `ok` is false.
    pub fn ensure(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }
}

/// Rejects a blank query argument (category, tag, owner, ...).
pub fn require_argument<'a>(
    kind: EntityKind,
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single(kind, field, "is required"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{require_argument, Rules, WriteMode, MAX_NAME_CHARS};
    use crate::model::{EntityKind, Priority};

    #[test]
    fn required_text_depends_on_mode() {
        let mut create = Rules::new(WriteMode::Create);
        create.required_text("name", None);
        assert_eq!(create.into_violations().len(), 1);

        let mut update = Rules::new(WriteMode::Update);
        update.required_text("name", None);
        assert!(update.into_violations().is_empty());

        let mut blank = Rules::new(WriteMode::Update);
        blank.required_text("name", Some("   "));
        assert_eq!(blank.into_violations()[0].message, "is required");
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "x".repeat(MAX_NAME_CHARS + 1);
        let mut rules = Rules::new(WriteMode::Create);
        rules.required_text("name", Some(long.as_str()));
        let violations = rules.into_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("255"));
    }

    #[test]
    fn collects_every_violation() {
        let mut rules = Rules::new(WriteMode::Create);
        rules.required_text("name", Some(""));
        rules.one_of::<Priority>("priority", Some("URGENT"));
        rules.percent("progress", Some(101));
        rules.non_negative("estimated_minutes", Some(-1));
        rules.calendar_date("due_date", Some("not-a-date"));
        let fields: Vec<_> = rules
            .into_violations()
            .into_iter()
            .map(|violation| violation.field)
            .collect();
        assert_eq!(
            fields,
            vec!["name", "priority", "progress", "estimated_minutes", "due_date"]
        );
    }

    #[test]
    fn require_argument_trims_and_rejects_blank() {
        assert_eq!(
            require_argument(EntityKind::Skill, "category", " Frontend ").unwrap(),
            "Frontend"
        );
        let err = require_argument(EntityKind::Skill, "category", "  ").unwrap_err();
        assert!(err.has_field("category"));
    }
}
