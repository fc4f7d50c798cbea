use analysis_core::{AnalysisError, Category, Metric, MAX_SCORE, MIN_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::metrics::CalculatorPolicies;
use crate::scoring::{Rubric, NEUTRAL_SCORE};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Contribution of each category average to the final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub financial_health: f64,
    pub profitability: f64,
    pub growth: f64,
    pub valuation: f64,
    pub ownership: f64,
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::FinancialHealth => self.financial_health,
            Category::Profitability => self.profitability,
            Category::Growth => self.growth,
            Category::Valuation => self.valuation,
            Category::Ownership => self.ownership,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            financial_health: 0.20,
            profitability: 0.25,
            growth: 0.20,
            valuation: 0.20,
            ownership: 0.15,
        }
    }
}

fn default_ownership_average() -> f64 {
    NEUTRAL_SCORE
}

/// Rubric table, category weights and calculator policies.
///
/// Loaded once at startup and shared read-only by every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub rubric: HashMap<Metric, Rubric>,
    #[serde(default)]
    pub weights: CategoryWeights,
    /// Ownership is not scored from its metrics; this fixed value stands in.
    #[serde(default = "default_ownership_average")]
    pub ownership_average: f64,
    #[serde(default)]
    pub policies: CalculatorPolicies,
}

impl ScoringConfig {
    /// The standard rubric.
    pub fn standard() -> Self {
        use Metric::*;

        let rubric = HashMap::from([
            // Financial health
            (DebtToEquity, Rubric::lower(0.5)),
            (CurrentRatio, Rubric::higher(1.5)),
            (InterestCoverage, Rubric::higher(4.0)),
            (QuickRatio, Rubric::higher(1.0)),
            (FcfToDebt, Rubric::higher(0.5)),
            (FcfToSales, Rubric::higher(5.0)),
            (CashConversionCycle, Rubric::lower(90.0)),
            (FixedAssetTurnover, Rubric::higher(1.0)),
            // Profitability
            (GrossMargin, Rubric::higher(25.0)),
            (OperatingMargin, Rubric::higher(15.0)),
            (NetMargin, Rubric::higher(8.0)),
            (ReturnOnEquity, Rubric::higher(15.0)),
            (ReturnOnAssets, Rubric::higher(8.0)),
            (ReturnOnCapitalEmployed, Rubric::higher(15.0)),
            (ReturnOnInvestedCapital, Rubric::higher(12.0)),
            // Growth
            (RevenueCagr, Rubric::higher(10.0)),
            (NetProfitCagr, Rubric::higher(15.0)),
            (FcfCagr, Rubric::higher(10.0)),
            // Valuation
            (PriceToEarnings, Rubric::lower(20.0)),
            (PriceToBook, Rubric::lower(3.0)),
            (PriceToSales, Rubric::lower(5.0)),
            (EvToEbitda, Rubric::lower(12.0)),
            (FcfYield, Rubric::higher(4.0)),
            (DividendYield, Rubric::higher(2.0)),
        ]);

        Self {
            rubric,
            weights: CategoryWeights::default(),
            ownership_average: NEUTRAL_SCORE,
            policies: CalculatorPolicies::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        let config: ScoringConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig(format!("scoring config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for category in Category::ALL {
            let weight = self.weights.get(category);
            if !weight.is_finite() || weight < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "weight for {} must be a non-negative number, got {}",
                    category, weight
                )));
            }
        }
        let total = self.weights.sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AnalysisError::InvalidConfig(format!(
                "category weights must sum to 1.0, got {}",
                total
            )));
        }

        for (metric, rubric) in &self.rubric {
            match *rubric {
                Rubric::Threshold { target, .. } => {
                    if !(target.is_finite() && target > 0.0) {
                        return Err(AnalysisError::InvalidConfig(format!(
                            "target for {} must be positive, got {}",
                            metric, target
                        )));
                    }
                }
                Rubric::Range { low, high } => {
                    if !(low.is_finite() && high.is_finite() && low > 0.0 && low <= high) {
                        return Err(AnalysisError::InvalidConfig(format!(
                            "range for {} must satisfy 0 < low <= high, got [{}, {}]",
                            metric, low, high
                        )));
                    }
                }
            }
        }

        if !(MIN_SCORE..=MAX_SCORE).contains(&self.ownership_average) {
            return Err(AnalysisError::InvalidConfig(format!(
                "ownership average must lie in [{}, {}], got {}",
                MIN_SCORE, MAX_SCORE, self.ownership_average
            )));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::RecencyPolicy;
    use crate::scoring::Direction;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_config_is_valid() {
        let config = ScoringConfig::standard();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.weights.sum(), 1.0, epsilon = 1e-12);
        assert_eq!(config.ownership_average, 5.0);
        assert_eq!(config.rubric.len(), 24);
    }

    #[test]
    fn test_standard_rubric_entries() {
        let config = ScoringConfig::standard();
        assert_eq!(config.rubric[&Metric::DebtToEquity], Rubric::lower(0.5));
        assert_eq!(config.rubric[&Metric::CashConversionCycle], Rubric::lower(90.0));
        assert_eq!(config.rubric[&Metric::FcfYield], Rubric::higher(4.0));
        assert!(!config.rubric.contains_key(&Metric::InventoryDays));
        assert!(!config.rubric.contains_key(&Metric::AssetTurnover));
        assert!(Category::Ownership
            .metrics()
            .all(|m| !config.rubric.contains_key(&m)));
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{
            "rubric": {
                "Debt-to-Equity Ratio": {"kind": "threshold", "target": 1.0, "direction": "lower_is_better"},
                "Current Ratio": {"kind": "range", "low": 1.2, "high": 2.5}
            },
            "weights": {
                "financial_health": 0.3,
                "profitability": 0.3,
                "growth": 0.2,
                "valuation": 0.1,
                "ownership": 0.1
            },
            "policies": {"growth": "latest_by_date"}
        }"#;
        let config = ScoringConfig::from_json_str(json).unwrap();
        assert_eq!(
            config.rubric[&Metric::DebtToEquity],
            Rubric::Threshold {
                target: 1.0,
                direction: Direction::LowerIsBetter
            }
        );
        assert_eq!(config.rubric[&Metric::CurrentRatio], Rubric::range(1.2, 2.5));
        assert_eq!(config.ownership_average, 5.0);
        assert_eq!(config.policies.growth, RecencyPolicy::LatestByDate);
    }

    #[test]
    fn test_rejects_weights_not_summing_to_one() {
        let mut config = ScoringConfig::standard();
        config.weights.growth = 0.3;
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_rubrics() {
        let mut config = ScoringConfig::standard();
        config.rubric.insert(Metric::PriceToBook, Rubric::lower(0.0));
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::standard();
        config.rubric.insert(Metric::CurrentRatio, Rubric::range(2.0, 1.0));
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::standard();
        config.rubric.insert(Metric::CurrentRatio, Rubric::range(0.0, 1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_metric_name() {
        let json = r#"{"rubric": {"Magic Ratio": {"kind": "threshold", "target": 1.0}}}"#;
        assert!(matches!(
            ScoringConfig::from_json_str(json),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ScoringConfig::from_file("/nonexistent/scoring.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scoring.json"));
    }
}
