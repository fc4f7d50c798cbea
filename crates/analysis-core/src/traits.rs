use async_trait::async_trait;
use crate::{AnalysisError, FundamentalData};

/// Source of raw statements and market snapshots for a ticker.
///
/// A fetch is all-or-nothing: either every section the provider knows about
/// comes back (possibly sparse), or the call fails and no report is built.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Canonical form of a user-supplied ticker for this provider.
    fn normalize_symbol(&self, symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalData, AnalysisError>;
}
