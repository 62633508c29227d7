//! QuantSignal Core: domain types, indicators, signal evaluators, screening
//! engine, strategy registry and the market-data contract.
//!
//! - Indicators (RSI, SMA, lookback momentum) as NaN-sentinel series
//! - Timing evaluators (RSI oversold rebound, MA crossover) and the fixed
//!   take-profit / stop-loss exit rule
//! - Value-momentum and simple-value screens with composite scoring
//! - An immutable strategy registry with validated parameter schemas
//! - `TimeSeriesSource` with CSV and in-memory implementations, and the
//!   instrument reference cache

pub mod data;
pub mod domain;
pub mod error;
pub mod exit;
pub mod indicators;
pub mod screening;
pub mod strategy;
pub mod timing;

pub use error::{DataUnavailable, Outcome, StrategyError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across pipeline workers is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Holding>();
        require_sync::<domain::Holding>();
        require_send::<domain::InstrumentMeta>();
        require_sync::<domain::InstrumentMeta>();
        require_send::<domain::ScoredCandidate>();
        require_sync::<domain::ScoredCandidate>();

        // Errors cross worker boundaries inside per-instrument outcomes
        require_send::<DataUnavailable>();
        require_sync::<DataUnavailable>();
        require_send::<StrategyError>();
        require_sync::<StrategyError>();

        // Resolved strategies are shared by reference across workers
        require_send::<timing::TimingStrategy>();
        require_sync::<timing::TimingStrategy>();
        require_send::<exit::ExitStrategy>();
        require_sync::<exit::ExitStrategy>();
        require_send::<screening::ScreeningStrategy>();
        require_sync::<screening::ScreeningStrategy>();

        // Data access
        require_send::<data::CsvSource>();
        require_sync::<data::CsvSource>();
        require_send::<data::InMemorySource>();
        require_sync::<data::InMemorySource>();
        require_send::<data::ReferenceCache>();
        require_sync::<data::ReferenceCache>();
    }

    /// Evaluators see only a bar series; they cannot reach the data source or cache.
    #[test]
    fn signal_evaluator_takes_only_a_series() {
        fn _check_trait_object_builds(
            evaluator: &dyn timing::SignalEvaluator,
            series: &domain::BarSeries,
        ) -> Outcome<domain::Signal> {
            evaluator.evaluate(series)
        }
    }
}
