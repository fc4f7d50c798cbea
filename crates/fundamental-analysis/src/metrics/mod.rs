//! Category metric calculators.
//!
//! Each calculator is a pure function of the fetched bundle. Missing or
//! malformed fields come through as 0; only a missing required statement or
//! market section is reported, as a [`ComputationFault`].

pub mod financial_health;
pub mod growth;
pub mod ownership;
pub mod profitability;
pub mod valuation;

use analysis_core::math::round2;
use analysis_core::{
    Category, FundamentalData, MarketData, Metric, MetricMapping, StatementKind, StatementPeriod,
};
use serde::{Deserialize, Serialize};

use crate::aliases;
use crate::error::ComputationFault;
use crate::extract::extract_across_sources;
use crate::period::{self, RecencyPolicy};

/// Which recency policy each calculator applies to its statement series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorPolicies {
    pub financial_health: RecencyPolicy,
    pub profitability: RecencyPolicy,
    pub growth: RecencyPolicy,
    pub valuation: RecencyPolicy,
}

impl Default for CalculatorPolicies {
    fn default() -> Self {
        Self {
            financial_health: RecencyPolicy::LatestByDate,
            profitability: RecencyPolicy::ArrayOrder,
            growth: RecencyPolicy::ArrayOrder,
            valuation: RecencyPolicy::ArrayOrder,
        }
    }
}

/// Run the calculator for `category`.
pub fn compute(
    category: Category,
    data: &FundamentalData,
    policies: &CalculatorPolicies,
) -> Result<MetricMapping, ComputationFault> {
    match category {
        Category::FinancialHealth => financial_health::calculate(data, policies.financial_health),
        Category::Profitability => profitability::calculate(data, policies.profitability),
        Category::Growth => growth::calculate(data, policies.growth),
        Category::Valuation => valuation::calculate(data, policies.valuation),
        Category::Ownership => ownership::calculate(&data.market),
    }
}

/// Most recent period of a statement that the calculator cannot do without.
pub(crate) fn required_period(
    data: &FundamentalData,
    kind: StatementKind,
    policy: RecencyPolicy,
) -> Result<&StatementPeriod, ComputationFault> {
    period::select(data.series(kind), policy).ok_or(ComputationFault::MissingStatement(kind))
}

/// Lookup order for figures that the market snapshot may already carry:
/// financialData, then defaultKeyStatistics, then the statement itself.
pub(crate) fn snapshot_then<'a>(
    market: &'a MarketData,
    statement: Option<&'a StatementPeriod>,
) -> [Option<&'a StatementPeriod>; 3] {
    [
        market.financial_data.as_ref(),
        market.key_statistics.as_ref(),
        statement,
    ]
}

/// `primary` unless it is 0, in which case the derived fallback.
pub(crate) fn or_derived(primary: f64, derive: impl FnOnce() -> f64) -> f64 {
    if primary != 0.0 {
        primary
    } else {
        derive()
    }
}

/// Collect computed ratios, rounding each to two decimals.
pub(crate) fn rounded<const N: usize>(values: [(Metric, f64); N]) -> MetricMapping {
    values.into_iter().map(|(metric, value)| (metric, round2(value))).collect()
}

/// Reported free cash flow, else operating cash flow minus capital
/// expenditures, searched across `sources` in order.
pub(crate) fn free_cash_flow(sources: &[Option<&StatementPeriod>]) -> f64 {
    let reported = extract_across_sources(sources, aliases::FREE_CASH_FLOW);
    if reported != 0.0 {
        return reported;
    }
    extract_across_sources(sources, aliases::OPERATING_CASH_FLOW)
        - extract_across_sources(sources, aliases::CAPITAL_EXPENDITURES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StatementPeriod {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_default_policies() {
        let policies = CalculatorPolicies::default();
        assert_eq!(policies.financial_health, RecencyPolicy::LatestByDate);
        assert_eq!(policies.profitability, RecencyPolicy::ArrayOrder);
        assert_eq!(policies.growth, RecencyPolicy::ArrayOrder);
        assert_eq!(policies.valuation, RecencyPolicy::ArrayOrder);
    }

    #[test]
    fn test_policies_deserialize_partially() {
        let policies: CalculatorPolicies =
            serde_json::from_value(json!({"growth": "latest_by_date"})).unwrap();
        assert_eq!(policies.growth, RecencyPolicy::LatestByDate);
        assert_eq!(policies.financial_health, RecencyPolicy::LatestByDate);
        assert_eq!(policies.valuation, RecencyPolicy::ArrayOrder);
    }

    #[test]
    fn test_free_cash_flow_fallback() {
        let reported = record(json!({"freeCashFlow": 120.0, "totalCashFromOperatingActivities": 900}));
        assert_eq!(free_cash_flow(&[Some(&reported)]), 120.0);

        let derived = record(json!({"totalCashFromOperatingActivities": 900, "capitalExpenditures": 300}));
        assert_eq!(free_cash_flow(&[Some(&derived)]), 600.0);

        assert_eq!(free_cash_flow(&[None]), 0.0);
    }

    #[test]
    fn test_compute_reports_missing_statement() {
        let data = FundamentalData::new("TCS.NS");
        assert_eq!(
            compute(Category::FinancialHealth, &data, &CalculatorPolicies::default()),
            Err(ComputationFault::MissingStatement(StatementKind::BalanceSheet))
        );
        let growth = compute(Category::Growth, &data, &CalculatorPolicies::default()).unwrap();
        assert_eq!(growth.len(), 3);
    }
}
