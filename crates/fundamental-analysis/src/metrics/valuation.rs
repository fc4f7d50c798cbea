use analysis_core::math::safe_divide;
use analysis_core::{FundamentalData, MarketSection, Metric, MetricMapping};

use super::{free_cash_flow, or_derived, rounded};
use crate::aliases;
use crate::error::ComputationFault;
use crate::extract::{extract, extract_across_sources};
use crate::period::{self, RecencyPolicy};

/// Price multiples and yields.
///
/// Each ratio is taken as reported by the market snapshot when available and
/// derived from the latest statements otherwise. Needs at least the `price`
/// or `financialData` section.
pub fn calculate(data: &FundamentalData, policy: RecencyPolicy) -> Result<MetricMapping, ComputationFault> {
    let market = &data.market;
    if market.price.is_none() && market.financial_data.is_none() {
        return Err(ComputationFault::MissingMarketSection(MarketSection::Price));
    }
    let price = market.price.as_ref();
    let summary = market.summary_detail.as_ref();
    let stats = market.key_statistics.as_ref();
    let fd = market.financial_data.as_ref();

    let is = period::select(&data.income_statement, policy);
    let bs = period::select(&data.balance_sheet, policy);
    let cf = period::select(&data.cash_flow, policy);

    let market_cap = extract_across_sources(&[price, fd, summary], aliases::MARKET_CAP);
    let shares = extract(stats, aliases::SHARES_OUTSTANDING);
    let current_price = or_derived(extract(price, aliases::REGULAR_MARKET_PRICE), || {
        extract(fd, aliases::CURRENT_PRICE)
    });

    let net_income = extract_across_sources(&[fd, is], aliases::NET_INCOME);
    let revenue = extract_across_sources(&[fd, is], aliases::TOTAL_REVENUE);
    let equity = or_derived(extract(stats, aliases::BOOK_VALUE_PER_SHARE) * shares, || {
        extract(bs, aliases::STOCKHOLDER_EQUITY)
    });

    let eps = if shares > 0.0 {
        safe_divide(net_income, shares)
    } else {
        0.0
    };
    let pe = or_derived(extract_across_sources(&[fd, summary], aliases::TRAILING_PE), || {
        if eps > 0.0 {
            safe_divide(current_price, eps)
        } else {
            0.0
        }
    });
    let pb = or_derived(extract_across_sources(&[fd, stats], aliases::PRICE_TO_BOOK), || {
        safe_divide(market_cap, equity)
    });
    let ps = or_derived(extract_across_sources(&[fd, summary], aliases::PRICE_TO_SALES), || {
        safe_divide(market_cap, revenue)
    });

    // Reported EBITDA, else operating income with depreciation added back
    let ebitda = or_derived(extract(fd, aliases::EBITDA), || {
        extract(is, aliases::OPERATING_INCOME) + extract(cf, aliases::DEPRECIATION)
    });
    let total_debt = extract_across_sources(&[fd, bs], aliases::TOTAL_DEBT);
    let cash = or_derived(extract(fd, aliases::SNAPSHOT_TOTAL_CASH), || {
        extract(bs, aliases::CASH)
    });
    let enterprise_value = or_derived(
        extract_across_sources(&[fd, stats], aliases::ENTERPRISE_VALUE),
        || market_cap + total_debt - cash,
    );
    let ev_to_ebitda = or_derived(
        extract_across_sources(&[fd, stats], aliases::ENTERPRISE_TO_EBITDA),
        || {
            if ebitda > 0.0 {
                safe_divide(enterprise_value, ebitda)
            } else {
                0.0
            }
        },
    );

    let fcf = or_derived(extract(fd, aliases::SNAPSHOT_FREE_CASH_FLOW), || free_cash_flow(&[cf]));
    let fcf_yield = if market_cap > 0.0 {
        safe_divide(fcf, market_cap) * 100.0
    } else {
        0.0
    };
    let dividend_yield = extract_across_sources(&[summary, fd], aliases::DIVIDEND_YIELD) * 100.0;

    Ok(rounded([
        (Metric::PriceToEarnings, pe),
        (Metric::PriceToBook, pb),
        (Metric::PriceToSales, ps),
        (Metric::EvToEbitda, ev_to_ebitda),
        (Metric::FcfYield, fcf_yield),
        (Metric::DividendYield, dividend_yield),
    ]))
}
