use analysis_core::{AnalysisError, FundamentalData, MarketDataProvider, Report};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fundamental_analysis::FundamentalAnalysisEngine;
use std::sync::Arc;

pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Fetches a symbol's bundle once, then hands it to the engine.
///
/// Only fetched input is cached; every call builds a fresh report.
pub struct AnalysisOrchestrator {
    provider: Arc<dyn MarketDataProvider>,
    engine: FundamentalAnalysisEngine,
    /// Fetched bundles per normalized symbol
    fundamentals_cache: DashMap<String, CacheEntry<FundamentalData>>,
    cache_ttl_secs: i64,
}

impl AnalysisOrchestrator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, engine: FundamentalAnalysisEngine) -> Self {
        Self {
            provider,
            engine,
            fundamentals_cache: DashMap::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    /// Seconds a fetched bundle stays reusable; 0 disables caching.
    pub fn with_cache_ttl(mut self, secs: i64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn engine(&self) -> &FundamentalAnalysisEngine {
        &self.engine
    }

    /// Full report for `symbol`, or `ReportUnavailable` when nothing could
    /// be fetched.
    pub async fn analyze(&self, symbol: &str) -> Result<Report, AnalysisError> {
        let symbol = self.provider.normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(AnalysisError::InvalidData("empty stock symbol".to_string()));
        }

        let fetched = self.get_fundamentals(&symbol).await;
        match self.engine.generate_report(fetched) {
            Some(report) => {
                tracing::info!(
                    symbol = %report.symbol,
                    final_score = report.final_score,
                    grade = %report.grade,
                    "Report generated"
                );
                Ok(report)
            }
            None => Err(AnalysisError::ReportUnavailable(symbol)),
        }
    }

    /// Fetched bundle for a normalized symbol (cached, TTL from config).
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<FundamentalData, AnalysisError> {
        if let Some(entry) = self.fundamentals_cache.get(symbol) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.cache_ttl_secs {
                tracing::debug!(symbol, age, "Fundamentals cache hit");
                return Ok(entry.data.clone());
            }
        }

        let data = self.provider.fetch_fundamentals(symbol).await.map_err(|e| {
            tracing::warn!(symbol, error = %e, "Market data fetch failed");
            e
        })?;

        if self.cache_ttl_secs > 0 {
            self.fundamentals_cache.insert(
                symbol.to_string(),
                CacheEntry {
                    data: data.clone(),
                    cached_at: Utc::now(),
                },
            );
        }
        Ok(data)
    }

    /// Drop cached bundles older than the TTL.
    pub fn evict_expired(&self) {
        let now = Utc::now();
        let ttl = self.cache_ttl_secs;
        self.fundamentals_cache
            .retain(|_, entry| (now - entry.cached_at).num_seconds() < ttl);
    }

    pub fn cached_symbols(&self) -> usize {
        self.fundamentals_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Category, StatementPeriod};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalData, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AnalysisError::ApiError(format!("unknown symbol {}", symbol)));
            }
            let mut data = FundamentalData::new(symbol);
            data.balance_sheet = vec![serde_json::from_value::<StatementPeriod>(json!({
                "totalDebt": 500,
                "totalStockholderEquity": 1000,
                "totalCurrentAssets": 800,
                "totalCurrentLiabilities": 400
            }))
            .unwrap()];
            data.income_statement = vec![StatementPeriod::new()];
            Ok(data)
        }
    }

    #[tokio::test]
    async fn test_analyze_builds_report() {
        let provider = StubProvider::new(false);
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), FundamentalAnalysisEngine::new());

        let report = orchestrator.analyze(" tcs ").await.unwrap();
        assert_eq!(report.symbol, "TCS");
        assert_eq!(report.category_scores.len(), Category::ALL.len());
        assert_eq!(report.ownership.average, 5.0);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetched_bundle_is_cached() {
        let provider = StubProvider::new(false);
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), FundamentalAnalysisEngine::new());

        let first = orchestrator.analyze("TCS").await.unwrap();
        let second = orchestrator.analyze("tcs").await.unwrap();
        assert_eq!(provider.calls(), 1);
        assert_eq!(first.final_score, second.final_score);
        assert_eq!(orchestrator.cached_symbols(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let provider = StubProvider::new(false);
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), FundamentalAnalysisEngine::new())
            .with_cache_ttl(0);

        orchestrator.analyze("TCS").await.unwrap();
        orchestrator.analyze("TCS").await.unwrap();
        assert_eq!(provider.calls(), 2);
        assert_eq!(orchestrator.cached_symbols(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_report_unavailable() {
        let provider = StubProvider::new(true);
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), FundamentalAnalysisEngine::new());

        let err = orchestrator.analyze("nosuch").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ReportUnavailable(ref s) if s == "NOSUCH"));

        // failures are not cached
        orchestrator.analyze("nosuch").await.unwrap_err();
        assert_eq!(provider.calls(), 2);
        assert_eq!(orchestrator.cached_symbols(), 0);
    }

    #[tokio::test]
    async fn test_blank_symbol_is_rejected_without_fetching() {
        let provider = StubProvider::new(false);
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), FundamentalAnalysisEngine::new());

        let err = orchestrator.analyze("   ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let provider = StubProvider::new(false);
        let orchestrator = AnalysisOrchestrator::new(provider, FundamentalAnalysisEngine::new());
        orchestrator.analyze("TCS").await.unwrap();
        orchestrator.evict_expired();
        assert_eq!(orchestrator.cached_symbols(), 1);

        let orchestrator = orchestrator.with_cache_ttl(-1);
        orchestrator.evict_expired();
        assert_eq!(orchestrator.cached_symbols(), 0);
    }
}
