use analysis_core::math::safe_divide;
use analysis_core::{FundamentalData, Metric, MetricMapping, StatementKind};

use super::{free_cash_flow, required_period, rounded, snapshot_then};
use crate::aliases;
use crate::error::ComputationFault;
use crate::extract::extract_across_sources;
use crate::period::{self, RecencyPolicy};

const DAYS_PER_YEAR: f64 = 365.0;

/// Leverage, liquidity and working-capital ratios.
///
/// Needs a balance sheet and an income statement; the cash-flow statement is
/// optional. Every figure is searched in the market snapshot first.
pub fn calculate(data: &FundamentalData, policy: RecencyPolicy) -> Result<MetricMapping, ComputationFault> {
    let bs = required_period(data, StatementKind::BalanceSheet, policy)?;
    let is = required_period(data, StatementKind::IncomeStatement, policy)?;
    let cf = period::select(&data.cash_flow, policy);

    let balance = snapshot_then(&data.market, Some(bs));
    let income = snapshot_then(&data.market, Some(is));
    let cash_flow = snapshot_then(&data.market, cf);

    let total_debt = extract_across_sources(&balance, aliases::TOTAL_DEBT);
    let equity = extract_across_sources(&balance, aliases::STOCKHOLDER_EQUITY);
    let current_assets = extract_across_sources(&balance, aliases::CURRENT_ASSETS);
    let current_liabilities = extract_across_sources(&balance, aliases::CURRENT_LIABILITIES);
    let cash = extract_across_sources(&balance, aliases::CASH);
    let receivables = extract_across_sources(&balance, aliases::RECEIVABLES);
    let inventory = extract_across_sources(&balance, aliases::INVENTORY);
    let payables = extract_across_sources(&balance, aliases::ACCOUNTS_PAYABLE);
    let gross_ppe = extract_across_sources(&balance, aliases::GROSS_PPE);
    let accumulated_depreciation =
        extract_across_sources(&balance, aliases::ACCUMULATED_DEPRECIATION).abs();

    let revenue = extract_across_sources(&income, aliases::TOTAL_REVENUE);
    let cost_of_revenue = extract_across_sources(&income, aliases::COST_OF_REVENUE);
    let ebit = extract_across_sources(&income, aliases::EBIT);
    let interest_expense = extract_across_sources(&income, aliases::INTEREST_EXPENSE).abs();

    let fcf = free_cash_flow(&cash_flow);
    let net_ppe = gross_ppe - accumulated_depreciation;

    let fcf_to_debt = if total_debt > 0.0 {
        safe_divide(fcf, total_debt)
    } else {
        0.0
    };

    // Days outstanding; inventory and payables turn over against cost of revenue
    let inventory_days = if cost_of_revenue > 0.0 {
        safe_divide(inventory, cost_of_revenue) * DAYS_PER_YEAR
    } else {
        0.0
    };
    let receivable_days = safe_divide(receivables, revenue) * DAYS_PER_YEAR;
    let payable_days = if cost_of_revenue > 0.0 {
        safe_divide(payables, cost_of_revenue) * DAYS_PER_YEAR
    } else {
        0.0
    };

    Ok(rounded([
        (Metric::DebtToEquity, safe_divide(total_debt, equity)),
        (Metric::CurrentRatio, safe_divide(current_assets, current_liabilities)),
        (Metric::InterestCoverage, safe_divide(ebit, interest_expense)),
        (Metric::QuickRatio, safe_divide(cash + receivables, current_liabilities)),
        (Metric::FcfToDebt, fcf_to_debt),
        (Metric::FcfToSales, safe_divide(fcf, revenue) * 100.0),
        (
            Metric::CashConversionCycle,
            inventory_days + receivable_days - payable_days,
        ),
        (Metric::FixedAssetTurnover, safe_divide(revenue, net_ppe)),
        (Metric::InventoryDays, inventory_days),
        (Metric::ReceivableDays, receivable_days),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Category, StatementPeriod};
    use approx::assert_relative_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StatementPeriod {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> FundamentalData {
        let mut data = FundamentalData::new("INFY.NS");
        data.balance_sheet = vec![record(json!({
            "endDate": {"raw": 1711843200},
            "totalDebt": 500,
            "totalStockholderEquity": 1000,
            "totalCurrentAssets": 800,
            "totalCurrentLiabilities": 400,
            "cash": 100,
            "netReceivables": 100,
            "inventory": 50,
            "accountsPayable": 40,
            "propertyPlantEquipment": 1500,
            "accumulatedDepreciation": -500
        }))];
        data.income_statement = vec![record(json!({
            "endDate": {"raw": 1711843200},
            "totalRevenue": 2000,
            "costOfRevenue": 1000,
            "ebit": 300,
            "interestExpense": -50
        }))];
        data.cash_flow = vec![record(json!({
            "totalCashFromOperatingActivities": 400,
            "capitalExpenditures": 150
        }))];
        data
    }

    #[test]
    fn test_leverage_and_liquidity() {
        let metrics = calculate(&sample(), RecencyPolicy::LatestByDate).unwrap();
        assert_eq!(metrics.get(Metric::DebtToEquity), Some(0.5));
        assert_eq!(metrics.get(Metric::CurrentRatio), Some(2.0));
        assert_eq!(metrics.get(Metric::InterestCoverage), Some(6.0));
        assert_eq!(metrics.get(Metric::QuickRatio), Some(0.5));
        assert_eq!(metrics.get(Metric::FixedAssetTurnover), Some(2.0));
    }

    #[test]
    fn test_cash_flow_and_working_capital() {
        let metrics = calculate(&sample(), RecencyPolicy::LatestByDate).unwrap();
        // 400 operating cash flow - 150 capex
        assert_relative_eq!(metrics.get(Metric::FcfToDebt).unwrap(), 0.5);
        assert_relative_eq!(metrics.get(Metric::FcfToSales).unwrap(), 12.5);
        assert_relative_eq!(metrics.get(Metric::InventoryDays).unwrap(), 18.25);
        assert_relative_eq!(metrics.get(Metric::ReceivableDays).unwrap(), 18.25);
        assert_relative_eq!(metrics.get(Metric::CashConversionCycle).unwrap(), 21.9);
    }

    #[test]
    fn test_reports_every_metric() {
        let metrics = calculate(&sample(), RecencyPolicy::LatestByDate).unwrap();
        let names: Vec<Metric> = metrics.iter().map(|(m, _)| m).collect();
        let expected: Vec<Metric> = Category::FinancialHealth.metrics().collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_snapshot_takes_priority_over_statement() {
        let mut data = sample();
        data.market.financial_data = Some(record(json!({"totalDebt": {"raw": 250.0}})));
        let metrics = calculate(&data, RecencyPolicy::LatestByDate).unwrap();
        assert_eq!(metrics.get(Metric::DebtToEquity), Some(0.25));
    }

    #[test]
    fn test_per_share_book_value_is_not_equity() {
        let mut data = FundamentalData::new("INFY.NS");
        data.balance_sheet = vec![record(json!({"totalDebt": 500}))];
        data.income_statement = vec![record(json!({"totalRevenue": 2000}))];
        data.market.key_statistics = Some(record(json!({"bookValue": 250.0})));

        let metrics = calculate(&data, RecencyPolicy::LatestByDate).unwrap();
        assert_eq!(metrics.get(Metric::DebtToEquity), Some(0.0));

        data.balance_sheet[0].insert("totalStockholderEquity", 1000.0);
        let metrics = calculate(&data, RecencyPolicy::LatestByDate).unwrap();
        assert_eq!(metrics.get(Metric::DebtToEquity), Some(0.5));
    }

    #[test]
    fn test_picks_latest_balance_sheet_by_date() {
        let mut data = sample();
        data.balance_sheet.insert(
            0,
            record(json!({
                "endDate": {"raw": 1600000000},
                "totalDebt": 900,
                "totalStockholderEquity": 100
            })),
        );
        let metrics = calculate(&data, RecencyPolicy::LatestByDate).unwrap();
        assert_eq!(metrics.get(Metric::DebtToEquity), Some(0.5));

        let metrics = calculate(&data, RecencyPolicy::ArrayOrder).unwrap();
        assert_eq!(metrics.get(Metric::DebtToEquity), Some(9.0));
    }

    #[test]
    fn test_missing_fields_become_zero() {
        let mut data = FundamentalData::new("EMPTY.NS");
        data.balance_sheet = vec![StatementPeriod::new()];
        data.income_statement = vec![record(json!({"totalRevenue": "n/a"}))];
        let metrics = calculate(&data, RecencyPolicy::LatestByDate).unwrap();
        assert_eq!(metrics.len(), 10);
        assert!(metrics.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_requires_income_statement() {
        let mut data = sample();
        data.income_statement.clear();
        assert_eq!(
            calculate(&data, RecencyPolicy::LatestByDate),
            Err(ComputationFault::MissingStatement(StatementKind::IncomeStatement))
        );
    }
}
