use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// One field of a loosely-typed statement record.
///
/// Providers report the same figure either as a bare number or wrapped as
/// `{"raw": 123.0, "fmt": "123"}`. Anything else (strings, nulls, empty
/// objects, wrappers without a numeric `raw`) lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Wrapped {
        raw: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fmt: Option<String>,
    },
    Other(serde_json::Value),
}

impl FieldValue {
    /// The numeric payload, if the field carries a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) | FieldValue::Wrapped { raw: n, .. } if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Other(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// One reporting period of one statement (or one quote-summary section).
///
/// Keys follow whatever naming convention the provider uses; lookups go
/// through the alias tables in the analysis crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementPeriod {
    fields: HashMap<String, FieldValue>,
}

impl StatementPeriod {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style insert, handy for assembling fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for StatementPeriod {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Periods of one statement type. Usually most-recent-first, not guaranteed.
pub type StatementSeries = Vec<StatementPeriod>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::BalanceSheet => "balance sheet",
            StatementKind::IncomeStatement => "income statement",
            StatementKind::CashFlow => "cash-flow statement",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketSection {
    Price,
    SummaryDetail,
    KeyStatistics,
    FinancialData,
}

impl fmt::Display for MarketSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarketSection::Price => "price",
            MarketSection::SummaryDetail => "summaryDetail",
            MarketSection::KeyStatistics => "defaultKeyStatistics",
            MarketSection::FinancialData => "financialData",
        })
    }
}

/// Market snapshot sections; presence varies by exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<StatementPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_detail: Option<StatementPeriod>,
    #[serde(
        default,
        rename = "defaultKeyStatistics",
        alias = "keyStatistics",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_statistics: Option<StatementPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_data: Option<StatementPeriod>,
}

impl MarketData {
    pub fn section(&self, section: MarketSection) -> Option<&StatementPeriod> {
        match section {
            MarketSection::Price => self.price.as_ref(),
            MarketSection::SummaryDetail => self.summary_detail.as_ref(),
            MarketSection::KeyStatistics => self.key_statistics.as_ref(),
            MarketSection::FinancialData => self.financial_data.as_ref(),
        }
    }
}

/// Everything fetched for one ticker, ready for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalData {
    pub symbol: String,
    #[serde(default)]
    pub balance_sheet: StatementSeries,
    #[serde(default)]
    pub income_statement: StatementSeries,
    #[serde(default)]
    pub cash_flow: StatementSeries,
    #[serde(default)]
    pub market: MarketData,
}

impl FundamentalData {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn series(&self, kind: StatementKind) -> &[StatementPeriod] {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }
}

/// Serialize/deserialize a closed enum through its display label.
macro_rules! label_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                label.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Report categories, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    FinancialHealth,
    Profitability,
    Growth,
    Valuation,
    Ownership,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::FinancialHealth,
        Category::Profitability,
        Category::Growth,
        Category::Valuation,
        Category::Ownership,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::FinancialHealth => "Financial Health",
            Category::Profitability => "Profitability",
            Category::Growth => "Growth",
            Category::Valuation => "Valuation",
            Category::Ownership => "Ownership",
        }
    }

    /// Metrics reported for this category, in presentation order.
    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        Metric::ALL.iter().copied().filter(move |m| m.category() == *self)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

label_serde!(Category);

/// Every ratio the engine reports. Declaration order is presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    // Financial health
    DebtToEquity,
    CurrentRatio,
    InterestCoverage,
    QuickRatio,
    FcfToDebt,
    FcfToSales,
    CashConversionCycle,
    FixedAssetTurnover,
    InventoryDays,
    ReceivableDays,
    // Profitability
    GrossMargin,
    OperatingMargin,
    NetMargin,
    ReturnOnEquity,
    ReturnOnAssets,
    ReturnOnCapitalEmployed,
    ReturnOnInvestedCapital,
    AssetTurnover,
    // Growth
    RevenueCagr,
    NetProfitCagr,
    FcfCagr,
    // Valuation
    PriceToEarnings,
    PriceToBook,
    PriceToSales,
    EvToEbitda,
    FcfYield,
    DividendYield,
    // Ownership
    PromoterHolding,
    InstitutionalHolding,
    PledgedShares,
    FloatRatio,
}

impl Metric {
    pub const ALL: [Metric; 31] = [
        Metric::DebtToEquity,
        Metric::CurrentRatio,
        Metric::InterestCoverage,
        Metric::QuickRatio,
        Metric::FcfToDebt,
        Metric::FcfToSales,
        Metric::CashConversionCycle,
        Metric::FixedAssetTurnover,
        Metric::InventoryDays,
        Metric::ReceivableDays,
        Metric::GrossMargin,
        Metric::OperatingMargin,
        Metric::NetMargin,
        Metric::ReturnOnEquity,
        Metric::ReturnOnAssets,
        Metric::ReturnOnCapitalEmployed,
        Metric::ReturnOnInvestedCapital,
        Metric::AssetTurnover,
        Metric::RevenueCagr,
        Metric::NetProfitCagr,
        Metric::FcfCagr,
        Metric::PriceToEarnings,
        Metric::PriceToBook,
        Metric::PriceToSales,
        Metric::EvToEbitda,
        Metric::FcfYield,
        Metric::DividendYield,
        Metric::PromoterHolding,
        Metric::InstitutionalHolding,
        Metric::PledgedShares,
        Metric::FloatRatio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::DebtToEquity => "Debt-to-Equity Ratio",
            Metric::CurrentRatio => "Current Ratio",
            Metric::InterestCoverage => "Interest Coverage Ratio",
            Metric::QuickRatio => "Quick Ratio",
            Metric::FcfToDebt => "FCF/Debt",
            Metric::FcfToSales => "FCF/Sales (%)",
            Metric::CashConversionCycle => "Cash Conversion Cycle",
            Metric::FixedAssetTurnover => "Fixed Asset Turnover",
            Metric::InventoryDays => "Inventory Days",
            Metric::ReceivableDays => "Receivable Days",
            Metric::GrossMargin => "Gross Margin (%)",
            Metric::OperatingMargin => "Operating Margin (%)",
            Metric::NetMargin => "Net Margin (%)",
            Metric::ReturnOnEquity => "ROE (%)",
            Metric::ReturnOnAssets => "ROA (%)",
            Metric::ReturnOnCapitalEmployed => "ROCE (%)",
            Metric::ReturnOnInvestedCapital => "ROIC (%)",
            Metric::AssetTurnover => "Asset Turnover",
            Metric::RevenueCagr => "Revenue Growth (3Y CAGR %)",
            Metric::NetProfitCagr => "Net Profit Growth (3Y CAGR %)",
            Metric::FcfCagr => "FCF Growth (3Y CAGR %)",
            Metric::PriceToEarnings => "P/E Ratio",
            Metric::PriceToBook => "P/B Ratio",
            Metric::PriceToSales => "P/S Ratio",
            Metric::EvToEbitda => "EV/EBITDA",
            Metric::FcfYield => "FCF Yield (%)",
            Metric::DividendYield => "Dividend Yield (%)",
            Metric::PromoterHolding => "Promoter Holding (%)",
            Metric::InstitutionalHolding => "Institutional Holding (%)",
            Metric::PledgedShares => "Pledged Shares (%)",
            Metric::FloatRatio => "Float Ratio (%)",
        }
    }

    pub fn category(&self) -> Category {
        use Metric::*;
        match self {
            DebtToEquity | CurrentRatio | InterestCoverage | QuickRatio | FcfToDebt
            | FcfToSales | CashConversionCycle | FixedAssetTurnover | InventoryDays
            | ReceivableDays => Category::FinancialHealth,
            GrossMargin | OperatingMargin | NetMargin | ReturnOnEquity | ReturnOnAssets
            | ReturnOnCapitalEmployed | ReturnOnInvestedCapital | AssetTurnover => {
                Category::Profitability
            }
            RevenueCagr | NetProfitCagr | FcfCagr => Category::Growth,
            PriceToEarnings | PriceToBook | PriceToSales | EvToEbitda | FcfYield
            | DividendYield => Category::Valuation,
            PromoterHolding | InstitutionalHolding | PledgedShares | FloatRatio => {
                Category::Ownership
            }
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| format!("unknown metric '{}'", s))
    }
}

label_serde!(Metric);

/// Metric name -> value. Values are always finite; anything else is stored as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricMapping(BTreeMap<Metric, f64>);

impl MetricMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping with every listed metric present and set to 0.
    pub fn zeroed(metrics: impl IntoIterator<Item = Metric>) -> Self {
        metrics.into_iter().map(|m| (m, 0.0)).collect()
    }

    pub fn insert(&mut self, metric: Metric, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.0.insert(metric, value);
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Metric, f64)> for MetricMapping {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        let mut mapping = MetricMapping::new();
        for (metric, value) in iter {
            mapping.insert(metric, value);
        }
        mapping
    }
}

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// Metric name -> score, always within [`MIN_SCORE`, `MAX_SCORE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMapping(BTreeMap<Metric, f64>);

impl ScoreMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `score` clamped to the score band; NaN becomes the minimum.
    pub fn insert(&mut self, metric: Metric, score: f64) {
        let score = if score.is_nan() {
            MIN_SCORE
        } else {
            score.clamp(MIN_SCORE, MAX_SCORE)
        };
        self.0.insert(metric, score);
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arithmetic mean of the scores; 0 when there are none.
    pub fn average(&self) -> f64 {
        let scores: Vec<f64> = self.0.values().copied().collect();
        crate::math::mean(&scores)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub metrics: MetricMapping,
    pub scores: ScoreMapping,
    pub average: f64,
}

/// Letter bucket for the final weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvestmentGrade {
    Excellent,
    VeryGood,
    Good,
    Average,
    BelowAverage,
    Poor,
    VeryPoor,
}

impl InvestmentGrade {
    pub const ALL: [InvestmentGrade; 7] = [
        InvestmentGrade::Excellent,
        InvestmentGrade::VeryGood,
        InvestmentGrade::Good,
        InvestmentGrade::Average,
        InvestmentGrade::BelowAverage,
        InvestmentGrade::Poor,
        InvestmentGrade::VeryPoor,
    ];

    /// Buckets use closed lower bounds: exactly 8.0 is still "A+".
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 8.0 => InvestmentGrade::Excellent,
            s if s >= 7.0 => InvestmentGrade::VeryGood,
            s if s >= 6.0 => InvestmentGrade::Good,
            s if s >= 5.0 => InvestmentGrade::Average,
            s if s >= 4.0 => InvestmentGrade::BelowAverage,
            s if s >= 3.0 => InvestmentGrade::Poor,
            _ => InvestmentGrade::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvestmentGrade::Excellent => "A+ (Excellent)",
            InvestmentGrade::VeryGood => "A (Very Good)",
            InvestmentGrade::Good => "B+ (Good)",
            InvestmentGrade::Average => "B (Average)",
            InvestmentGrade::BelowAverage => "C+ (Below Average)",
            InvestmentGrade::Poor => "C (Poor)",
            InvestmentGrade::VeryPoor => "D (Very Poor)",
        }
    }
}

impl FromStr for InvestmentGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvestmentGrade::ALL
            .into_iter()
            .find(|g| g.label() == s)
            .ok_or_else(|| format!("unknown investment grade '{}'", s))
    }
}

label_serde!(InvestmentGrade);

/// Full fundamental report for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub symbol: String,
    pub analysis_date: NaiveDate,
    pub financial_health: CategoryResult,
    pub profitability: CategoryResult,
    pub growth: CategoryResult,
    pub valuation: CategoryResult,
    pub ownership: CategoryResult,
    /// Category averages, rounded to two decimals.
    pub category_scores: BTreeMap<Category, f64>,
    pub final_score: f64,
    pub grade: InvestmentGrade,
}

impl Report {
    pub fn category(&self, category: Category) -> &CategoryResult {
        match category {
            Category::FinancialHealth => &self.financial_health,
            Category::Profitability => &self.profitability,
            Category::Growth => &self.growth,
            Category::Valuation => &self.valuation,
            Category::Ownership => &self.ownership,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_shapes() {
        let period: StatementPeriod = serde_json::from_value(json!({
            "totalRevenue": {"raw": 1200.0, "fmt": "1.2k"},
            "netIncome": 80,
            "currency": "INR",
            "ebit": {},
            "grossProfit": {"raw": null},
            "maxAge": 1
        }))
        .unwrap();

        assert_eq!(period.get("totalRevenue").and_then(FieldValue::as_number), Some(1200.0));
        assert_eq!(period.get("netIncome").and_then(FieldValue::as_number), Some(80.0));
        assert_eq!(period.get("currency").and_then(FieldValue::as_number), None);
        assert_eq!(period.get("currency").and_then(FieldValue::as_str), Some("INR"));
        assert_eq!(period.get("ebit").and_then(FieldValue::as_number), None);
        assert_eq!(period.get("grossProfit").and_then(FieldValue::as_number), None);
        assert!(period.get("missing").is_none());
    }

    #[test]
    fn test_non_finite_field_is_not_a_number() {
        assert_eq!(FieldValue::Number(f64::NAN).as_number(), None);
        assert_eq!(FieldValue::Number(f64::INFINITY).as_number(), None);
    }

    #[test]
    fn test_market_data_section_names() {
        let market: MarketData = serde_json::from_value(json!({
            "price": {"regularMarketPrice": {"raw": 101.5}},
            "defaultKeyStatistics": {"floatShares": 10},
            "financialData": null
        }))
        .unwrap();

        assert!(market.price.is_some());
        assert!(market.key_statistics.is_some());
        assert!(market.financial_data.is_none());
        assert!(market.section(MarketSection::SummaryDetail).is_none());
    }

    #[test]
    fn test_metric_labels_round_trip_and_belong_to_one_category() {
        for metric in Metric::ALL {
            assert_eq!(metric.label().parse::<Metric>(), Ok(metric));
        }
        let counts: Vec<usize> = Category::ALL.iter().map(|c| c.metrics().count()).collect();
        assert_eq!(counts, vec![10, 8, 3, 6, 4]);
    }

    #[test]
    fn test_metric_mapping_serializes_in_declaration_order() {
        let mapping: MetricMapping = [
            (Metric::QuickRatio, 1.2),
            (Metric::DebtToEquity, 0.5),
            (Metric::CurrentRatio, f64::NAN),
        ]
        .into_iter()
        .collect();

        let encoded = serde_json::to_string(&mapping).unwrap();
        assert_eq!(
            encoded,
            r#"{"Debt-to-Equity Ratio":0.5,"Current Ratio":0.0,"Quick Ratio":1.2}"#
        );
    }

    #[test]
    fn test_score_mapping_clamps() {
        let mut scores = ScoreMapping::new();
        scores.insert(Metric::PriceToEarnings, 14.0);
        scores.insert(Metric::PriceToBook, -3.0);
        scores.insert(Metric::PriceToSales, f64::NAN);
        assert_eq!(scores.get(Metric::PriceToEarnings), Some(MAX_SCORE));
        assert_eq!(scores.get(Metric::PriceToBook), Some(MIN_SCORE));
        assert_eq!(scores.get(Metric::PriceToSales), Some(MIN_SCORE));
        assert_eq!(scores.average(), 4.0);
        assert_eq!(ScoreMapping::new().average(), 0.0);
    }

    #[test]
    fn test_grade_buckets() {
        assert_eq!(InvestmentGrade::from_score(8.0), InvestmentGrade::Excellent);
        assert_eq!(InvestmentGrade::from_score(7.99), InvestmentGrade::VeryGood);
        assert_eq!(InvestmentGrade::from_score(7.1), InvestmentGrade::VeryGood);
        assert_eq!(InvestmentGrade::from_score(6.0), InvestmentGrade::Good);
        assert_eq!(InvestmentGrade::from_score(5.5), InvestmentGrade::Average);
        assert_eq!(InvestmentGrade::from_score(4.0), InvestmentGrade::BelowAverage);
        assert_eq!(InvestmentGrade::from_score(3.0), InvestmentGrade::Poor);
        assert_eq!(InvestmentGrade::from_score(2.99), InvestmentGrade::VeryPoor);
        assert_eq!(InvestmentGrade::VeryGood.to_string(), "A (Very Good)");
    }
}
