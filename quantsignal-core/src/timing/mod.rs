//! Timing evaluators: turn the current and previous indicator readings of one
//! instrument into at most one classified signal.
//!
//! Evaluation is stateless across calls. Each call gets a fresh series.

pub mod ma_crossover;
pub mod rsi_rebound;

pub use ma_crossover::{MaCrossover, VolumeFilter};
pub use rsi_rebound::RsiRebound;

use crate::domain::{BarSeries, Signal};
use crate::error::{Outcome, StrategyError};
use crate::strategy::{self, ResolvedParams, StrategyId, StrategyKind, StrategyParams};

/// Guard against division by zero when the previous reading equals the threshold.
pub const STRENGTH_EPSILON: f64 = 1e-6;

/// Trait for per-instrument timing rules.
pub trait SignalEvaluator: Send + Sync {
    fn strategy_id(&self) -> StrategyId;

    /// Minimum number of bars needed for a current and a previous reading.
    fn min_bars(&self) -> usize;

    /// Trading-day span of history the rule looks at; callers pad this with
    /// calendar days when requesting bars.
    fn history_bars(&self) -> usize;

    /// Evaluate the latest bar of `series`.
    ///
    /// `Err` means the instrument cannot be evaluated (too short, undefined
    /// indicator); `Ok(None)` means it was evaluated and nothing fired.
    fn evaluate(&self, series: &BarSeries) -> Outcome<Signal>;
}

/// A resolved, validated timing strategy.
#[derive(Debug, Clone)]
pub enum TimingStrategy {
    RsiRebound(RsiRebound),
    MaCross(MaCrossover),
}

impl TimingStrategy {
    /// Look up `id`, validate `params` against its schema and build the evaluator.
    pub fn resolve(id: &str, params: &StrategyParams) -> Result<Self, StrategyError> {
        let descriptor = strategy::find_kind(id, StrategyKind::Timing)?;
        let p = ResolvedParams::resolve(descriptor.params, params)?;
        match descriptor.id {
            StrategyId::RsiOversoldRebound => Ok(Self::RsiRebound(RsiRebound::new(
                p.integer("rsi_period")?,
                p.number("rsi_oversold_threshold")?,
            ))),
            StrategyId::MaCross => {
                let volume = if p.flag("enable_volume_filter")? {
                    Some(VolumeFilter {
                        avg_days: p.integer("volume_avg_days")?,
                        multiple: p.number("volume_multiple")?,
                    })
                } else {
                    None
                };
                Ok(Self::MaCross(MaCrossover::new(
                    p.integer("short_ma_period")?,
                    p.integer("long_ma_period")?,
                    volume,
                )?))
            }
            other => Err(StrategyError::WrongKind {
                id: other.to_string(),
                expected: StrategyKind::Timing,
            }),
        }
    }

    pub fn evaluator(&self) -> &dyn SignalEvaluator {
        match self {
            Self::RsiRebound(e) => e,
            Self::MaCross(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ParamValue;

    fn params(pairs: &[(&str, f64)]) -> StrategyParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
            .collect()
    }

    #[test]
    fn resolves_rsi_with_defaults() {
        let s = TimingStrategy::resolve("rsi_oversold_rebound", &StrategyParams::new()).unwrap();
        match s {
            TimingStrategy::RsiRebound(r) => {
                assert_eq!(r.period(), 14);
                assert_eq!(r.oversold_threshold(), 30.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn resolves_ma_alias() {
        let s = TimingStrategy::resolve("ma_golden_cross", &params(&[("short_ma_period", 10.0)]))
            .unwrap();
        assert_eq!(s.evaluator().strategy_id(), StrategyId::MaCross);
        assert_eq!(s.evaluator().min_bars(), 21);
    }

    #[test]
    fn short_not_below_long_is_configuration_error() {
        let err = TimingStrategy::resolve(
            "ma_cross",
            &params(&[("short_ma_period", 20.0), ("long_ma_period", 20.0)]),
        )
        .unwrap_err();
        assert!(matches!(err, StrategyError::Configuration(_)));
    }

    #[test]
    fn rejects_other_kinds_and_unknown_ids() {
        assert!(matches!(
            TimingStrategy::resolve("fixed_profit_loss", &StrategyParams::new()),
            Err(StrategyError::WrongKind { .. })
        ));
        assert!(matches!(
            TimingStrategy::resolve("nope", &StrategyParams::new()),
            Err(StrategyError::UnknownStrategy(_))
        ));
    }
}
