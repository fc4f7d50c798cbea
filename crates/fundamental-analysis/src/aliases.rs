//! Field-name alias tables.
//!
//! Each table lists the spellings a figure is known under, in lookup order.
//! Statement feeds mix camel-case keys (`totalRevenue`) with the title-case
//! column names used by dataframe exports (`Total Revenue`).

// Balance sheet
pub const TOTAL_DEBT: &[&str] = &["totalDebt", "Total Debt"];
pub const STOCKHOLDER_EQUITY: &[&str] = &["totalStockholderEquity", "Stockholders Equity"];
pub const TOTAL_ASSETS: &[&str] = &["totalAssets", "Total Assets"];
pub const CURRENT_ASSETS: &[&str] = &["totalCurrentAssets", "Current Assets"];
pub const CURRENT_LIABILITIES: &[&str] = &["totalCurrentLiabilities", "Current Liabilities"];
pub const CASH: &[&str] = &[
    "cashAndCashEquivalents",
    "Cash And Cash Equivalents",
    "cash",
    "totalCash",
];
pub const RECEIVABLES: &[&str] = &["netReceivables", "Accounts Receivable"];
pub const INVENTORY: &[&str] = &["inventory", "Inventory"];
pub const ACCOUNTS_PAYABLE: &[&str] = &["accountsPayable", "Accounts Payable"];
pub const GROSS_PPE: &[&str] = &["propertyPlantEquipment", "Gross PPE"];
pub const ACCUMULATED_DEPRECIATION: &[&str] = &["accumulatedDepreciation", "Accumulated Depreciation"];

// Income statement
pub const TOTAL_REVENUE: &[&str] = &["totalRevenue", "Total Revenue"];
pub const COST_OF_REVENUE: &[&str] = &["costOfRevenue", "Cost Of Revenue"];
pub const GROSS_PROFIT: &[&str] = &["grossProfit", "Gross Profit"];
pub const OPERATING_INCOME: &[&str] = &["operatingIncome", "Operating Income"];
pub const EBIT: &[&str] = &["ebit", "EBIT"];
pub const INTEREST_EXPENSE: &[&str] = &["interestExpense", "Interest Expense"];
pub const NET_INCOME: &[&str] = &["netIncome", "Net Income"];

// Cash-flow statement
pub const FREE_CASH_FLOW: &[&str] = &["freeCashFlow", "Free Cash Flow"];
pub const OPERATING_CASH_FLOW: &[&str] = &["totalCashFromOperatingActivities", "Operating Cash Flow"];
pub const CAPITAL_EXPENDITURES: &[&str] = &["capitalExpenditures", "Capital Expenditure"];
pub const DEPRECIATION: &[&str] = &["depreciation", "Depreciation"];

// Market snapshot sections
pub const MARKET_CAP: &[&str] = &["marketCap"];
pub const SHARES_OUTSTANDING: &[&str] = &["sharesOutstanding"];
pub const REGULAR_MARKET_PRICE: &[&str] = &["regularMarketPrice"];
pub const CURRENT_PRICE: &[&str] = &["currentPrice"];
pub const BOOK_VALUE_PER_SHARE: &[&str] = &["bookValue"];
pub const TRAILING_PE: &[&str] = &["trailingPE"];
pub const PRICE_TO_BOOK: &[&str] = &["priceToBook"];
pub const PRICE_TO_SALES: &[&str] = &["priceToSalesTrailing12Months"];
pub const EBITDA: &[&str] = &["ebitda"];
pub const ENTERPRISE_VALUE: &[&str] = &["enterpriseValue"];
pub const ENTERPRISE_TO_EBITDA: &[&str] = &["enterpriseToEbitda"];
pub const SNAPSHOT_FREE_CASH_FLOW: &[&str] = &["freeCashflow"];
pub const SNAPSHOT_TOTAL_CASH: &[&str] = &["totalCash"];
pub const DIVIDEND_YIELD: &[&str] = &["dividendYield"];
pub const FLOAT_SHARES: &[&str] = &["floatShares"];
pub const HELD_BY_INSIDERS: &[&str] = &["heldPercentInsiders"];
pub const HELD_BY_INSTITUTIONS: &[&str] = &["heldPercentInstitutions"];

// Period dates, checked in order
pub const PERIOD_DATE: &[&str] = &["endDate", "date"];
