use analysis_core::{AnalysisError, FundamentalData, MarketData, StatementPeriod};
use serde::Deserialize;

/// Modules requested from the quote-summary endpoint, in one call.
pub const QUOTE_SUMMARY_MODULES: &[&str] = &[
    "price",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "balanceSheetHistory",
    "incomeStatementHistory",
    "cashflowStatementHistory",
];

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<StatementPeriod>,
    #[serde(default)]
    summary_detail: Option<StatementPeriod>,
    #[serde(default)]
    default_key_statistics: Option<StatementPeriod>,
    #[serde(default)]
    financial_data: Option<StatementPeriod>,
    #[serde(default)]
    balance_sheet_history: Option<BalanceSheetHistory>,
    #[serde(default)]
    income_statement_history: Option<IncomeStatementHistory>,
    #[serde(default)]
    cashflow_statement_history: Option<CashflowStatementHistory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetHistory {
    #[serde(default)]
    balance_sheet_statements: Vec<StatementPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<StatementPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowStatementHistory {
    #[serde(default)]
    cashflow_statements: Vec<StatementPeriod>,
}

/// Convert a quote-summary response body into the analysis input bundle.
///
/// An error object or an empty result fails the whole fetch. Statement
/// modules missing from a successful response become empty series.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<FundamentalData, AnalysisError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| AnalysisError::InvalidData(format!("quote summary for {}: {}", symbol, e)))?;
    let summary = envelope.quote_summary;

    if let Some(error) = summary.error {
        return Err(AnalysisError::ApiError(format!(
            "Yahoo error for {}: {} ({})",
            symbol,
            error.description.unwrap_or_else(|| "no description".to_string()),
            error.code.unwrap_or_else(|| "unknown".to_string()),
        )));
    }

    let result = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AnalysisError::ApiError(format!("No quote summary returned for {}", symbol)))?;

    Ok(FundamentalData {
        symbol: symbol.to_string(),
        balance_sheet: result
            .balance_sheet_history
            .map(|h| h.balance_sheet_statements)
            .unwrap_or_default(),
        income_statement: result
            .income_statement_history
            .map(|h| h.income_statement_history)
            .unwrap_or_default(),
        cash_flow: result
            .cashflow_statement_history
            .map(|h| h.cashflow_statements)
            .unwrap_or_default(),
        market: MarketData {
            price: result.price,
            summary_detail: result.summary_detail,
            key_statistics: result.default_key_statistics,
            financial_data: result.financial_data,
        },
    })
}
