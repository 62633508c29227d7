//! Error taxonomy shared by evaluators and the orchestrator.
//!
//! `StrategyError` rejects a whole request. `DataUnavailable` only skips the
//! instrument it was raised for.

use thiserror::Error;

use crate::data::DataError;
use crate::domain::BarError;
use crate::strategy::StrategyKind;

/// Request-fatal errors: unknown strategies and invalid parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("strategy not found: {0}")]
    UnknownStrategy(String),

    #[error("invalid strategy configuration: {0}")]
    Configuration(String),

    #[error("strategy '{id}' is not a {expected} strategy")]
    WrongKind { id: String, expected: StrategyKind },
}

impl StrategyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Per-instrument reasons for producing no result.
#[derive(Debug, Clone, Error)]
pub enum DataUnavailable {
    #[error("insufficient history: need {needed} bars, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("indicator undefined: {key}")]
    IndicatorUndefined { key: String },

    #[error("no usable fundamentals")]
    MissingFundamentals,

    #[error("no current price")]
    MissingPrice,

    #[error("holding {id} has non-positive cost or quantity")]
    InvalidHolding { id: u64 },

    #[error("invalid bar series: {0}")]
    InvalidSeries(#[from] BarError),

    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] DataError),
}

impl DataUnavailable {
    pub fn undefined(key: impl Into<String>) -> Self {
        Self::IndicatorUndefined { key: key.into() }
    }
}

/// Outcome of evaluating one instrument: skipped, evaluated with nothing to
/// report, or a result.
pub type Outcome<T> = Result<Option<T>, DataUnavailable>;
