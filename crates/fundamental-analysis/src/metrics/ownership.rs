use analysis_core::math::safe_divide;
use analysis_core::{MarketData, MarketSection, Metric, MetricMapping};

use super::rounded;
use crate::aliases;
use crate::error::ComputationFault;
use crate::extract::extract;

/// Holding breakdown from the key-statistics section.
///
/// Pledged shares are not published by the provider and always read 0.
pub fn calculate(market: &MarketData) -> Result<MetricMapping, ComputationFault> {
    let stats = market
        .key_statistics
        .as_ref()
        .ok_or(ComputationFault::MissingMarketSection(MarketSection::KeyStatistics))?;
    let stats = Some(stats);

    let float_shares = extract(stats, aliases::FLOAT_SHARES);
    let shares = extract(stats, aliases::SHARES_OUTSTANDING);

    Ok(rounded([
        (Metric::PromoterHolding, extract(stats, aliases::HELD_BY_INSIDERS) * 100.0),
        (
            Metric::InstitutionalHolding,
            extract(stats, aliases::HELD_BY_INSTITUTIONS) * 100.0,
        ),
        (Metric::PledgedShares, 0.0),
        (Metric::FloatRatio, safe_divide(float_shares, shares) * 100.0),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_holdings() {
        let market: MarketData = serde_json::from_value(json!({
            "defaultKeyStatistics": {
                "heldPercentInsiders": {"raw": 0.5032},
                "heldPercentInstitutions": {"raw": 0.2514},
                "floatShares": {"raw": 4500.0},
                "sharesOutstanding": {"raw": 9000.0}
            }
        }))
        .unwrap();
        let metrics = calculate(&market).unwrap();
        assert_relative_eq!(metrics.get(Metric::PromoterHolding).unwrap(), 50.32);
        assert_relative_eq!(metrics.get(Metric::InstitutionalHolding).unwrap(), 25.14);
        assert_eq!(metrics.get(Metric::PledgedShares), Some(0.0));
        assert_relative_eq!(metrics.get(Metric::FloatRatio).unwrap(), 50.0);
    }

    #[test]
    fn test_empty_statistics_are_zero() {
        let market: MarketData =
            serde_json::from_value(json!({"defaultKeyStatistics": {}})).unwrap();
        let metrics = calculate(&market).unwrap();
        assert_eq!(metrics.len(), 4);
        assert!(metrics.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_requires_key_statistics() {
        assert_eq!(
            calculate(&MarketData::default()),
            Err(ComputationFault::MissingMarketSection(MarketSection::KeyStatistics))
        );
    }
}
