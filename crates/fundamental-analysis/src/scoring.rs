//! Metric scoring.
//!
//! A rubric turns a raw ratio into a score between [`MIN_SCORE`] and
//! [`MAX_SCORE`]. Missing data (0 or NaN) always scores the minimum, and a
//! metric without a rubric scores [`NEUTRAL_SCORE`].

use analysis_core::{Metric, MetricMapping, ScoreMapping, MAX_SCORE, MIN_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NEUTRAL_SCORE: f64 = 5.0;

/// Penalty applied per unit of relative distance from the target.
const DISTANCE_PENALTY: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rubric {
    /// Full marks at or beyond `target` in the preferred direction.
    Threshold {
        target: f64,
        #[serde(default)]
        direction: Direction,
    },
    /// Full marks anywhere inside `[low, high]`.
    Range { low: f64, high: f64 },
}

impl Rubric {
    pub fn higher(target: f64) -> Self {
        Rubric::Threshold {
            target,
            direction: Direction::HigherIsBetter,
        }
    }

    pub fn lower(target: f64) -> Self {
        Rubric::Threshold {
            target,
            direction: Direction::LowerIsBetter,
        }
    }

    pub fn range(low: f64, high: f64) -> Self {
        Rubric::Range { low, high }
    }
}

/// Score a single value against its rubric.
pub fn score_metric(value: f64, rubric: &Rubric) -> f64 {
    if value.is_nan() || value == 0.0 {
        return MIN_SCORE;
    }

    let raw = match *rubric {
        Rubric::Range { low, high } => {
            if value >= low && value <= high {
                MAX_SCORE
            } else if value < low {
                MAX_SCORE - (low - value) / low * DISTANCE_PENALTY
            } else {
                MAX_SCORE - (value - high) / high * DISTANCE_PENALTY
            }
        }
        Rubric::Threshold {
            target,
            direction: Direction::HigherIsBetter,
        } => {
            if value >= target {
                MAX_SCORE
            } else {
                value / target * MAX_SCORE
            }
        }
        Rubric::Threshold {
            target,
            direction: Direction::LowerIsBetter,
        } => {
            if value <= target {
                MAX_SCORE
            } else {
                MAX_SCORE - (value - target) / target * DISTANCE_PENALTY
            }
        }
    };

    if raw.is_nan() {
        MIN_SCORE
    } else {
        raw.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Score every metric in `metrics`; metrics without a rubric score neutral.
pub fn score(metrics: &MetricMapping, rubrics: &HashMap<Metric, Rubric>) -> ScoreMapping {
    let mut scores = ScoreMapping::new();
    for (metric, value) in metrics.iter() {
        let score = match rubrics.get(&metric) {
            Some(rubric) => score_metric(value, rubric),
            None => NEUTRAL_SCORE,
        };
        scores.insert(metric, score);
    }
    scores
}
