//! Market insight queries and trend filtering.

use crate::model::{parse_calendar_date, Entity, Label, MarketInsight, TrendDirection};
use crate::query::filter::DateRange;
use crate::service::entity_service::EntityService;
use crate::store::{EntityStore, InMemoryStore, StoreResult};
use crate::validate::{require_argument, Rules, ValidationError, WriteMode};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub type MarketService<S = InMemoryStore<MarketInsight>> = EntityService<MarketInsight, S>;

const SOURCE_ALL: &str = "all";
const SOURCE_STARRED: &str = "starred";

/// Trend page filter options.
///
/// `source_type` is a concrete source, or `all` (no filter), or `starred`
/// (starred insights of any source).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendFilter {
    pub source_type: Option<String>,
    pub category: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339 bounds over `updated_on`, inclusive.
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TrendFilter {
    fn date_range(&self) -> Result<Option<DateRange>, ValidationError> {
        let mut rules = Rules::new(WriteMode::Update);
        rules.calendar_date("start", self.start.as_deref());
        rules.calendar_date("end", self.end.as_deref());
        let violations = rules.into_violations();
        if !violations.is_empty() {
            return Err(ValidationError::new(MarketInsight::KIND, violations));
        }
        let start = self.start.as_deref().and_then(parse_calendar_date);
        let end = self.end.as_deref().and_then(parse_calendar_date);
        Ok(match (start, end) {
            (None, None) => None,
            (start, end) => Some(DateRange::new(
                start.unwrap_or(i64::MIN),
                end.unwrap_or(i64::MAX),
            )),
        })
    }
}

impl<S: EntityStore<MarketInsight>> EntityService<MarketInsight, S> {
    /// # Errors
    /// - `StoreError::Validation` when `category` is blank.
    pub fn insights_by_category(&self, category: &str) -> StoreResult<Vec<MarketInsight>> {
        let category = require_argument(MarketInsight::KIND, "category", category)?;
        Ok(self.select(|insight| insight.category.as_deref() == Some(category)))
    }

    /// Rising/upward insights, fastest growth first, at most `limit`.
    pub fn hot_skills(&self, limit: usize) -> Vec<MarketInsight> {
        let mut hot = self.select(|insight| insight.trend.is_hot());
        hot.sort_by_key(|insight| Reverse(insight.growth_rate));
        hot.truncate(limit);
        hot
    }

    pub fn starred_insights(&self) -> Vec<MarketInsight> {
        self.select(|insight| insight.is_starred)
    }

    /// # Errors
    /// - `StoreError::Validation` for unparseable date bounds.
    pub fn filter_trends(&self, filter: &TrendFilter) -> StoreResult<Vec<MarketInsight>> {
        let range = filter.date_range()?;
        let source = filter
            .source_type
            .as_deref()
            .map(str::trim)
            .filter(|source| !source.is_empty() && *source != SOURCE_ALL);
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty());

        Ok(self.select(|insight| {
            let source_ok = match source {
                None => true,
                Some(SOURCE_STARRED) => insight.is_starred,
                Some(source) => insight.source_type.as_deref() == Some(source),
            };
            let category_ok = category.map_or(true, |c| insight.category.as_deref() == Some(c));
            let date_ok = range.map_or(true, |range| {
                insight.updated_on.is_some_and(|at| range.contains(at))
            });
            source_ok && category_ok && date_ok
        }))
    }

    /// # Errors
    /// - `StoreError::Validation` when `trend` is blank or not a trend label.
    pub fn insights_by_trend(&self, trend: &str) -> StoreResult<Vec<MarketInsight>> {
        let raw = require_argument(MarketInsight::KIND, "trend", trend)?;
        let Some(trend) = TrendDirection::parse_label(raw) else {
            let mut rules = Rules::new(WriteMode::Update);
            rules.one_of::<TrendDirection>("trend", Some(raw));
            return Err(ValidationError::new(MarketInsight::KIND, rules.into_violations()).into());
        };
        Ok(self.select(|insight| insight.trend == trend))
    }
}
