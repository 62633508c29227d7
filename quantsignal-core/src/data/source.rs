//! The market-data contract consumed by the core, plus its error type.
//!
//! Implementations fetch from wherever the data lives (CSV directory, memory,
//! a vendor API). An `Ok` with an empty collection means "no data available"
//! and must never be read as zeros.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, DailyValuation, FundamentalSnapshot, InstrumentMeta, UniverseFilter};

/// Price adjustment applied to bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    None,
    /// Forward-adjusted (latest prices unchanged, history rescaled).
    #[default]
    Forward,
    Backward,
}

/// Structured errors for source operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("symbol not found: {code}")]
    SymbolNotFound { code: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Io(_) => Self::Io(e.to_string()),
            _ => Self::Parse(e.to_string()),
        }
    }
}

/// Source of bars, fundamentals, valuations and reference data.
///
/// Implementations do not retry; retry policy belongs to the implementation's
/// own transport, never to the core.
pub trait TimeSeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Daily bars for `code` with `start <= date <= end`, ascending.
    fn fetch_daily_bars(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjustment: Adjustment,
    ) -> Result<Vec<Bar>, DataError>;

    /// All known fundamental snapshots for `code`, any order.
    fn fetch_latest_fundamentals(&self, code: &str) -> Result<Vec<FundamentalSnapshot>, DataError>;

    /// Instruments matching `filter`, in the source's natural order.
    fn fetch_instrument_universe(
        &self,
        filter: &UniverseFilter,
    ) -> Result<Vec<InstrumentMeta>, DataError>;

    /// Daily valuation rows for the given codes. Several rows per code may be returned.
    fn fetch_daily_valuations(&self, codes: &[String]) -> Result<Vec<DailyValuation>, DataError>;
}
