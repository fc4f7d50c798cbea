use analysis_core::{MarketSection, StatementKind};
use thiserror::Error;

/// Why a single category could not be computed.
///
/// Faults never abort a report: the aggregator logs them and scores the
/// category from an empty mapping.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationFault {
    #[error("no {0} period available")]
    MissingStatement(StatementKind),

    #[error("market data section '{0}' not available")]
    MissingMarketSection(MarketSection),
}
