pub mod aliases;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod period;
pub mod report;
pub mod scoring;


pub use config::{CategoryWeights, ScoringConfig};
pub use error::ComputationFault;
pub use metrics::CalculatorPolicies;
pub use period::RecencyPolicy;
pub use scoring::{Direction, Rubric};

use analysis_core::{
    AnalysisError, Category, CategoryResult, FundamentalData, MetricMapping, Report,
};
use chrono::{NaiveDate, Utc};

/// Turns a fetched bundle into a scored report.
///
/// Stateless apart from its scoring configuration; one engine can serve any
/// number of concurrent analyses.
#[derive(Debug, Clone)]
pub struct FundamentalAnalysisEngine {
    config: ScoringConfig,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::standard())
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Raw calculator output for one category, fault included.
    pub fn category_metrics(
        &self,
        category: Category,
        data: &FundamentalData,
    ) -> Result<MetricMapping, ComputationFault> {
        metrics::compute(category, data, &self.config.policies)
    }

    /// Metrics, scores and average for one category. A fault is logged and
    /// scored as an empty mapping.
    pub fn evaluate_category(&self, category: Category, data: &FundamentalData) -> CategoryResult {
        let metrics = match self.category_metrics(category, data) {
            Ok(metrics) => metrics,
            Err(fault) => {
                tracing::warn!(
                    symbol = %data.symbol,
                    category = %category,
                    %fault,
                    "Category could not be computed, scoring it as empty"
                );
                MetricMapping::new()
            }
        };

        let scores = scoring::score(&metrics, &self.config.rubric);
        let average = match category {
            Category::Ownership => self.config.ownership_average,
            _ => scores.average(),
        };

        CategoryResult {
            metrics,
            scores,
            average,
        }
    }

    pub fn analyze_on(&self, data: &FundamentalData, analysis_date: NaiveDate) -> Report {
        let results = Category::ALL.map(|category| self.evaluate_category(category, data));
        let report = report::assemble(&data.symbol, analysis_date, results, &self.config.weights);

        tracing::debug!(
            symbol = %report.symbol,
            final_score = report.final_score,
            grade = %report.grade,
            "Fundamental analysis complete"
        );
        report
    }

    /// Analyze as of today (UTC).
    pub fn analyze(&self, data: &FundamentalData) -> Report {
        self.analyze_on(data, Utc::now().date_naive())
    }

    /// Report for a fetch outcome; a failed fetch yields no report at all.
    pub fn generate_report(&self, fetched: Result<FundamentalData, AnalysisError>) -> Option<Report> {
        match fetched {
            Ok(data) => Some(self.analyze(&data)),
            Err(e) => {
                tracing::warn!(error = %e, "Market data unavailable, no report generated");
                None
            }
        }
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
