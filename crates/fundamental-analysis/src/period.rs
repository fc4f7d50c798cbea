//! Period selection.
//!
//! Statement feeds are usually most-recent-first but not always. Each
//! calculator picks a [`RecencyPolicy`] explicitly instead of assuming one.

use analysis_core::{FieldValue, StatementPeriod};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::aliases::PERIOD_DATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyPolicy {
    /// Compare period end dates; undated periods sort as date 0.
    #[default]
    LatestByDate,
    /// Trust the feed's order: index 0 is the most recent period.
    ArrayOrder,
}

fn date_value(value: &FieldValue) -> Option<f64> {
    if let Some(n) = value.as_number() {
        return Some(n);
    }
    let text = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp() as f64);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.timestamp() as f64)
}

/// End-date indicator of a period, 0.0 when none is usable.
///
/// Accepts `{raw: <epoch>}`, a bare number, or an ISO date string under
/// `endDate` (preferred) or `date`.
pub fn period_date(period: &StatementPeriod) -> f64 {
    PERIOD_DATE
        .iter()
        .filter_map(|key| period.get(key))
        .find_map(date_value)
        .unwrap_or(0.0)
}

/// Period with the greatest end date.
///
/// Ties keep the earlier element, so a series with no usable dates yields
/// its first period.
pub fn select_latest(series: &[StatementPeriod]) -> Option<&StatementPeriod> {
    let mut best: Option<(&StatementPeriod, f64)> = None;
    for period in series {
        let date = period_date(period);
        match best {
            Some((_, best_date)) if date <= best_date => {}
            _ => best = Some((period, date)),
        }
    }
    best.map(|(period, _)| period)
}

/// Most recent period under `policy`.
pub fn select(series: &[StatementPeriod], policy: RecencyPolicy) -> Option<&StatementPeriod> {
    match policy {
        RecencyPolicy::LatestByDate => select_latest(series),
        RecencyPolicy::ArrayOrder => series.first(),
    }
}

/// The series ordered most-recent-first under `policy`.
///
/// Date ordering is a stable sort, so undated or equal-dated periods keep
/// their feed order.
pub fn most_recent_first(series: &[StatementPeriod], policy: RecencyPolicy) -> Vec<&StatementPeriod> {
    let mut ordered: Vec<&StatementPeriod> = series.iter().collect();
    if policy == RecencyPolicy::LatestByDate {
        ordered.sort_by(|a, b| {
            period_date(b)
                .partial_cmp(&period_date(a))
                .unwrap_or(Ordering::Equal)
        });
    }
    ordered
}
