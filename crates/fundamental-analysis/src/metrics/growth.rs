use analysis_core::math::cagr;
use analysis_core::{Category, FundamentalData, MetricMapping, Metric};

use super::{free_cash_flow, rounded};
use crate::aliases;
use crate::error::ComputationFault;
use crate::extract::extract;
use crate::period::{most_recent_first, RecencyPolicy};

/// Periods between the current statement (index 0) and the base year (index 2).
pub const GROWTH_PERIODS: f64 = 3.0;
const MIN_PERIODS: usize = 3;

/// Three-period compound growth of revenue, net profit and free cash flow.
///
/// Fewer than three income statements yields the all-zero mapping. Net
/// profit growth is computed on absolute values, so a swing from loss to
/// profit reads as ordinary growth. FCF growth is only reported when both
/// endpoints are positive. Never faults.
pub fn calculate(
    data: &FundamentalData,
    policy: RecencyPolicy,
) -> Result<MetricMapping, ComputationFault> {
    let income = most_recent_first(&data.income_statement, policy);
    if income.len() < MIN_PERIODS {
        return Ok(MetricMapping::zeroed(Category::Growth.metrics()));
    }
    let (current, base) = (Some(income[0]), Some(income[2]));

    let revenue_cagr = cagr(
        extract(base, aliases::TOTAL_REVENUE),
        extract(current, aliases::TOTAL_REVENUE),
        GROWTH_PERIODS,
    );
    let net_profit_cagr = cagr(
        extract(base, aliases::NET_INCOME).abs(),
        extract(current, aliases::NET_INCOME).abs(),
        GROWTH_PERIODS,
    );

    let cash_flow = most_recent_first(&data.cash_flow, policy);
    let fcf_cagr = if cash_flow.len() >= MIN_PERIODS {
        let current_fcf = free_cash_flow(&[Some(cash_flow[0])]);
        let base_fcf = free_cash_flow(&[Some(cash_flow[2])]);
        if current_fcf > 0.0 && base_fcf > 0.0 {
            cagr(base_fcf, current_fcf, GROWTH_PERIODS)
        } else {
            0.0
        }
    } else {
        0.0
    };

    Ok(rounded([
        (Metric::RevenueCagr, revenue_cagr),
        (Metric::NetProfitCagr, net_profit_cagr),
        (Metric::FcfCagr, fcf_cagr),
    ]))
}
