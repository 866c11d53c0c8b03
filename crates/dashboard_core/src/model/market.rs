//! Market insight entity (trend feed items).

use crate::model::common::{clamp_percent, non_blank, parse_calendar_date, to_count};
use crate::model::{Entity, EntityKind, EntityMeta, Label, Priority, PERCENT_MAX};
use crate::query::filter::Filterable;
use crate::validate::{Rules, Violation, WriteMode};
use serde::{Deserialize, Serialize};

/// Direction of a market trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Upward,
    #[default]
    Stable,
    Declining,
}

impl TrendDirection {
    /// Rising and upward trends count as hot.
    pub fn is_hot(self) -> bool {
        matches!(self, Self::Rising | Self::Upward)
    }
}

impl Label for TrendDirection {
    const ALL: &'static [Self] = &[Self::Rising, Self::Upward, Self::Stable, Self::Declining];

    fn label(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Upward => "upward",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInsight {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub trend: TrendDirection,
    #[serde(default)]
    pub demand: Priority,
    /// Market saturation/level score, `0..=100`.
    #[serde(default)]
    pub market_level: u8,
    #[serde(default)]
    pub job_listing_count: u32,
    /// Signed growth in percent.
    #[serde(default)]
    pub growth_rate: i32,
    /// Feed the insight came from (`news`, `report`, ...).
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub top_skills: Vec<String>,
    /// Epoch ms the source last refreshed this insight.
    #[serde(default)]
    pub updated_on: Option<i64>,
}

/// Create/update payload for market insights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketInsightInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub trend: Option<String>,
    pub demand: Option<String>,
    pub market_level: Option<i64>,
    pub job_listing_count: Option<i64>,
    pub growth_rate: Option<i64>,
    pub source_type: Option<String>,
    pub is_starred: Option<bool>,
    pub top_skills: Option<Vec<String>>,
    pub last_updated: Option<String>,
}

impl MarketInsightInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Entity for MarketInsight {
    type Input = MarketInsightInput;

    const KIND: EntityKind = EntityKind::MarketInsight;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(input: &MarketInsightInput, mode: WriteMode) -> Vec<Violation> {
        let mut rules = Rules::new(mode);
        rules.required_text("name", input.name.as_deref());
        rules.one_of::<TrendDirection>("trend", input.trend.as_deref());
        rules.one_of::<Priority>("demand", input.demand.as_deref());
        rules.percent("market_level", input.market_level);
        rules.non_negative("job_listing_count", input.job_listing_count);
        if let Some(rate) = input.growth_rate {
            rules.ensure(
                i32::try_from(rate).is_ok(),
                "growth_rate",
                "is out of range",
            );
        }
        rules.calendar_date("last_updated", input.last_updated.as_deref());
        rules.into_violations()
    }

    fn from_input(meta: EntityMeta, input: MarketInsightInput) -> Self {
        let mut insight = Self {
            meta,
            name: String::new(),
            category: None,
            trend: TrendDirection::default(),
            demand: Priority::default(),
            market_level: 0,
            job_listing_count: 0,
            growth_rate: 0,
            source_type: None,
            is_starred: false,
            top_skills: Vec::new(),
            updated_on: None,
        };
        insight.apply_input(input);
        insight
    }

    fn apply_input(&mut self, input: MarketInsightInput) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = input.category {
            self.category = non_blank(category);
        }
        if let Some(trend) = input.trend.as_deref().and_then(TrendDirection::parse_label) {
            self.trend = trend;
        }
        if let Some(demand) = input.demand.as_deref().and_then(Priority::parse_label) {
            self.demand = demand;
        }
        if let Some(level) = input.market_level {
            self.market_level = clamp_percent(level);
        }
        if let Some(count) = input.job_listing_count {
            self.job_listing_count = to_count(count);
        }
        if let Some(rate) = input.growth_rate.and_then(|rate| i32::try_from(rate).ok()) {
            self.growth_rate = rate;
        }
        if let Some(source_type) = input.source_type {
            self.source_type = non_blank(source_type);
        }
        if let Some(starred) = input.is_starred {
            self.is_starred = starred;
        }
        if let Some(top_skills) = input.top_skills {
            self.top_skills = top_skills;
        }
        if let Some(updated) = input.last_updated.as_deref().and_then(parse_calendar_date) {
            self.updated_on = Some(updated);
        }
    }

    fn normalize(&mut self) {
        self.market_level = self.market_level.min(PERCENT_MAX);
    }
}

impl Filterable for MarketInsight {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.category.as_deref());
        fields.extend(self.top_skills.iter().map(String::as_str));
        fields
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.trend.label())
    }

    fn priority(&self) -> Option<Priority> {
        Some(self.demand)
    }

    fn category_label(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn primary_date(&self) -> Option<i64> {
        self.updated_on
    }
}
