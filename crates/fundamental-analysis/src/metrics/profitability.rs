use analysis_core::math::safe_divide;
use analysis_core::{FundamentalData, Metric, MetricMapping, StatementKind};

use super::{required_period, rounded};
use crate::aliases;
use crate::error::ComputationFault;
use crate::extract::extract;
use crate::period::RecencyPolicy;

/// Margins and returns on capital from the latest income statement and
/// balance sheet. Percentages are scaled by 100.
pub fn calculate(data: &FundamentalData, policy: RecencyPolicy) -> Result<MetricMapping, ComputationFault> {
    let is = Some(required_period(data, StatementKind::IncomeStatement, policy)?);
    let bs = Some(required_period(data, StatementKind::BalanceSheet, policy)?);

    let revenue = extract(is, aliases::TOTAL_REVENUE);
    let gross_profit = extract(is, aliases::GROSS_PROFIT);
    let operating_income = extract(is, aliases::OPERATING_INCOME);
    let net_income = extract(is, aliases::NET_INCOME);

    let total_assets = extract(bs, aliases::TOTAL_ASSETS);
    let equity = extract(bs, aliases::STOCKHOLDER_EQUITY);
    let total_debt = extract(bs, aliases::TOTAL_DEBT);
    let current_liabilities = extract(bs, aliases::CURRENT_LIABILITIES);

    let capital_employed = equity + total_debt;
    let invested_capital = total_assets - current_liabilities;

    Ok(rounded([
        (Metric::GrossMargin, safe_divide(gross_profit, revenue) * 100.0),
        (Metric::OperatingMargin, safe_divide(operating_income, revenue) * 100.0),
        (Metric::NetMargin, safe_divide(net_income, revenue) * 100.0),
        (Metric::ReturnOnEquity, safe_divide(net_income, equity) * 100.0),
        (Metric::ReturnOnAssets, safe_divide(net_income, total_assets) * 100.0),
        (
            Metric::ReturnOnCapitalEmployed,
            safe_divide(operating_income, capital_employed) * 100.0,
        ),
        (
            Metric::ReturnOnInvestedCapital,
            safe_divide(net_income, invested_capital) * 100.0,
        ),
        (Metric::AssetTurnover, safe_divide(revenue, total_assets)),
    ]))
}
