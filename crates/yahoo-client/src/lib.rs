pub mod parse;

pub use parse::{parse_quote_summary, QUOTE_SUMMARY_MODULES};

use analysis_core::{AnalysisError, FundamentalData, MarketDataProvider};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
/// NSE listing suffix, appended to bare tickers.
pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".NS";

/// Requests per fetch, counting 429 retries.
const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
const SLOT_SLACK: Duration = Duration::from_millis(50);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; fundamental-analyzer/0.1)";

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Requests allowed per rolling minute.
    pub rate_limit: usize,
    pub timeout: Duration,
    /// Pause before retrying a 429 response.
    pub retry_wait: Duration,
    /// Appended to tickers without an exchange suffix; empty disables it.
    pub default_suffix: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit: 100,
            timeout: Duration::from_secs(30),
            retry_wait: Duration::from_secs(15),
            default_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
        }
    }
}

/// Trim and upper-case a ticker, appending `default_suffix` when the ticker
/// names no exchange (contains no '.').
pub fn normalize_symbol(symbol: &str, default_suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || symbol.contains('.') || default_suffix.is_empty() {
        return symbol;
    }
    format!("{}{}", symbol, default_suffix.to_uppercase())
}

/// Send times of the requests still inside the rolling window.
struct RequestWindow {
    sent: VecDeque<Instant>,
    capacity: usize,
    span: Duration,
}

impl RequestWindow {
    fn new(capacity: usize, span: Duration) -> Self {
        Self {
            sent: VecDeque::new(),
            capacity: capacity.max(1),
            span,
        }
    }

    /// Claim a slot at `now`, or report how long until the oldest request
    /// ages out.
    fn reserve(&mut self, now: Instant) -> Result<(), Duration> {
        let span = self.span;
        self.sent.retain(|&at| now.saturating_duration_since(at) < span);

        if self.sent.len() >= self.capacity {
            if let Some(&oldest) = self.sent.front() {
                return Err((oldest + span).saturating_duration_since(now));
            }
        }
        self.sent.push_back(now);
        Ok(())
    }
}

/// Shared request budget for every clone of the client.
#[derive(Clone)]
struct RateLimiter {
    window: Arc<Mutex<RequestWindow>>,
}

impl RateLimiter {
    fn new(per_minute: usize) -> Self {
        Self {
            window: Arc::new(Mutex::new(RequestWindow::new(per_minute, Duration::from_secs(60)))),
        }
    }

    async fn acquire(&self) {
        loop {
            let wait = match self.window.lock().await.reserve(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait + SLOT_SLACK,
            };
            tracing::debug!(wait_secs = wait.as_secs_f64(), "Yahoo request budget spent, waiting");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Back-off Yahoo asked for in `Retry-After` (delta seconds), capped at
/// [`MAX_RETRY_AFTER`]; `fallback` when the header is absent or an HTTP date.
fn retry_after(headers: &HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
        .unwrap_or(fallback)
}

/// Quote-summary client for Yahoo Finance.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    config: YahooConfig,
    rate_limiter: RateLimiter,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(config.rate_limit),
            config,
        }
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    fn quote_summary_url(&self, symbol: &str) -> Result<Url, AnalysisError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AnalysisError::InvalidConfig(format!("Yahoo base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AnalysisError::InvalidConfig("Yahoo base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v10", "finance", "quoteSummary", symbol]);
        url.query_pairs_mut()
            .append_pair("modules", &QUOTE_SUMMARY_MODULES.join(","));
        Ok(url)
    }

    /// GET `url` within the request budget. A 429 is retried after the
    /// server's `Retry-After` (or the configured wait) until
    /// [`MAX_ATTEMPTS`] requests have been made.
    async fn send_request(&self, url: Url) -> Result<reqwest::Response, AnalysisError> {
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let mut attempt = 1;
        loop {
            self.rate_limiter.acquire().await;
            let pending = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(pending)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }
            if attempt >= MAX_ATTEMPTS {
                return Err(AnalysisError::ApiError(format!(
                    "Still rate limited by Yahoo after {} attempts",
                    MAX_ATTEMPTS
                )));
            }

            let wait = retry_after(response.headers(), self.config.retry_wait);
            tracing::warn!(attempt, wait_secs = wait.as_secs(), "Yahoo answered 429, backing off");
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    /// Statements and market snapshot for `symbol` in a single request.
    pub async fn get_quote_summary(&self, symbol: &str) -> Result<FundamentalData, AnalysisError> {
        let url = self.quote_summary_url(symbol)?;
        let response = self.send_request(url).await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;
        if !status.is_success() {
            // Yahoo reports unknown tickers as 404 with the usual error envelope
            if let Err(e @ AnalysisError::ApiError(_)) = parse_quote_summary(symbol, &body) {
                return Err(e);
            }
            return Err(AnalysisError::ApiError(format!("HTTP {} for {}", status, symbol)));
        }

        let data = parse_quote_summary(symbol, &body)?;
        tracing::debug!(
            symbol,
            balance_sheets = data.balance_sheet.len(),
            income_statements = data.income_statement.len(),
            cash_flows = data.cash_flow.len(),
            "Fetched quote summary"
        );
        Ok(data)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn normalize_symbol(&self, symbol: &str) -> String {
        normalize_symbol(symbol, &self.config.default_suffix)
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalData, AnalysisError> {
        self.get_quote_summary(symbol).await
    }
}
