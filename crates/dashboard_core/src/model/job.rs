//! Job opportunity entity.

use crate::model::common::{clamp_percent, non_blank, parse_calendar_date};
use crate::model::{Entity, EntityKind, EntityMeta, Label, PERCENT_MAX};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};

/// Where the user stands with an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    NotApplied,
    Applied,
    Interviewing,
    Offered,
    Rejected,
}

impl Label for ApplicationStatus {
    const ALL: &'static [Self] = &[
        Self::NotApplied,
        Self::Applied,
        Self::Interviewing,
        Self::Offered,
        Self::Rejected,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::NotApplied => "not_applied",
            Self::Applied => "applied",
            Self::Interviewing => "interviewing",
            Self::Offered => "offered",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Free-form salary text, e.g. `$120k - $150k`.
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub posted_at: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub application_status: ApplicationStatus,
    /// Last computed match against the user's skills, `0..=100`.
    #[serde(default)]
    pub match_percentage: Option<u8>,
}

/// Create/update payload for jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub posted_date: Option<String>,
    pub link: Option<String>,
    pub is_starred: Option<bool>,
    pub application_status: Option<String>,
    pub match_percentage: Option<i64>,
}

impl JobInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Entity for Job {
    type Input = JobInput;

    const KIND: EntityKind = EntityKind::Job;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &JobInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("title", input.title.as_deref());
        rules.calendar_date("posted_date", input.posted_date.as_deref());
        rules.one_of::<ApplicationStatus>(
            "application_status",
            input.application_status.as_deref(),
        );
        rules.percent("match_percentage", input.match_percentage);
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: JobInput) -> Self {
        let mut job = Self {
            meta,
            title: String::new(),
            company: None,
            location: None,
            salary: None,
            description: None,
            required_skills: Vec::new(),
            posted_at: None,
            link: None,
            is_starred: false,
            application_status: ApplicationStatus::default(),
            match_percentage: None,
        };
        job.apply_input(input);
        job
    }

    fn apply_input(&mut self, input: JobInput) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(company) = input.company {
            self.company = non_blank(company);
        }
        if let Some(location) = input.location {
            self.location = non_blank(location);
        }
        if let Some(salary) = input.salary {
            self.salary = non_blank(salary);
        }
        if let Some(description) = input.description {
            self.description = non_blank(description);
        }
        if let Some(skills) = input.required_skills {
            self.required_skills = skills;
        }
        if let Some(posted) = input.posted_date.as_deref().and_then(parse_calendar_date) {
            self.posted_at = Some(posted);
        }
        if let Some(link) = input.link {
            self.link = non_blank(link);
        }
        if let Some(starred) = input.is_starred {
            self.is_starred = starred;
        }
        if let Some(status) = input
            .application_status
            .as_deref()
            .and_then(ApplicationStatus::parse_label)
        {
            self.application_status = status;
        }
        if let Some(percentage) = input.match_percentage {
            self.match_percentage = Some(clamp_percent(percentage));
        }
    }

    fn normalize(&mut self) {
        self.match_percentage = self.match_percentage.map(|value| value.min(PERCENT_MAX));
    }
}

impl Filterable for Job {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.company.as_deref());
        fields.extend(self.location.as_deref());
        fields.extend(self.description.as_deref());
        fields.extend(self.required_skills.iter().map(String::as_str));
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.application_status.label())
    }

    fn primary_date(&self) -> Option<i64> {
        self.posted_at
    }
}
