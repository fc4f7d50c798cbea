use analysis_core::math::round2;
use analysis_core::{Category, CategoryResult, InvestmentGrade, Report};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::config::CategoryWeights;

/// Σ(category average × category weight). Categories missing from
/// `averages` contribute nothing.
pub fn weighted_score(averages: &BTreeMap<Category, f64>, weights: &CategoryWeights) -> f64 {
    Category::ALL
        .iter()
        .map(|category| averages.get(category).copied().unwrap_or(0.0) * weights.get(*category))
        .sum()
}

/// Build the report from per-category results given in [`Category::ALL`]
/// order.
///
/// The final score and grade come from the unrounded averages; the report
/// stores every average and the final score rounded to two decimals.
pub fn assemble(
    symbol: &str,
    analysis_date: NaiveDate,
    results: [CategoryResult; 5],
    weights: &CategoryWeights,
) -> Report {
    let averages: BTreeMap<Category, f64> = Category::ALL
        .iter()
        .zip(results.iter())
        .map(|(category, result)| (*category, result.average))
        .collect();
    let final_score = weighted_score(&averages, weights);

    let [financial_health, profitability, growth, valuation, ownership] = results.map(|mut result| {
        result.average = round2(result.average);
        result
    });

    Report {
        symbol: symbol.to_string(),
        analysis_date,
        financial_health,
        profitability,
        growth,
        valuation,
        ownership,
        category_scores: averages
            .into_iter()
            .map(|(category, average)| (category, round2(average)))
            .collect(),
        final_score: round2(final_score),
        grade: InvestmentGrade::from_score(final_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn averages(values: [f64; 5]) -> BTreeMap<Category, f64> {
        Category::ALL.into_iter().zip(values).collect()
    }

    fn result(average: f64) -> CategoryResult {
        CategoryResult {
            average,
            ..CategoryResult::default()
        }
    }

    #[test]
    fn test_weighted_score() {
        let weights = CategoryWeights::default();
        // 8*0.20 + 7*0.25 + 6*0.20 + 9*0.20 + 5*0.15
        let score = weighted_score(&averages([8.0, 7.0, 6.0, 9.0, 5.0]), &weights);
        assert_relative_eq!(score, 7.1, epsilon = 1e-12);
        assert_eq!(InvestmentGrade::from_score(score), InvestmentGrade::VeryGood);

        assert_relative_eq!(
            weighted_score(&averages([10.0; 5]), &weights),
            10.0,
            epsilon = 1e-12
        );
        assert_eq!(weighted_score(&BTreeMap::new(), &weights), 0.0);
    }

    #[test]
    fn test_assemble_rounds_for_display_only() {
        let weights = CategoryWeights::default();
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        // 7.996 * 1.0 rounds to 8.0 but grades below 8
        let report = assemble(
            "TCS.NS",
            date,
            [result(7.996), result(7.996), result(7.996), result(7.996), result(7.996)],
            &weights,
        );
        assert_eq!(report.final_score, 8.0);
        assert_eq!(report.grade, InvestmentGrade::VeryGood);
        assert_eq!(report.financial_health.average, 8.0);
        assert_eq!(report.category_scores[&Category::Ownership], 8.0);
        assert_eq!(report.analysis_date, date);
        assert_eq!(report.symbol, "TCS.NS");
    }

    #[test]
    fn test_assemble_keeps_category_order() {
        let weights = CategoryWeights::default();
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let report = assemble(
            "X",
            date,
            [result(1.0), result(2.0), result(3.0), result(4.0), result(5.0)],
            &weights,
        );
        for (i, category) in Category::ALL.into_iter().enumerate() {
            assert_eq!(report.category(category).average, (i + 1) as f64);
        }
        let keys: Vec<Category> = report.category_scores.keys().copied().collect();
        assert_eq!(keys, Category::ALL.to_vec());
    }
}
