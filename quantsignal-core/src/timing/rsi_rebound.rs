//! RSI oversold rebound.
//!
//! OVERSOLD_TURN_UP when the current RSI is below the threshold and above the
//! previous reading; otherwise IN_OVERSOLD_ZONE when it is below the
//! threshold; otherwise nothing.

use std::collections::BTreeMap;

use super::{SignalEvaluator, STRENGTH_EPSILON};
use crate::domain::{BarSeries, Signal, SignalKind};
use crate::error::{DataUnavailable, Outcome};
use crate::indicators::{Indicator, IndicatorValues, Rsi};
use crate::strategy::StrategyId;

#[derive(Debug, Clone)]
pub struct RsiRebound {
    rsi: Rsi,
    oversold_threshold: f64,
}

impl RsiRebound {
    pub fn new(period: usize, oversold_threshold: f64) -> Self {
        Self {
            rsi: Rsi::new(period),
            oversold_threshold,
        }
    }

    pub fn period(&self) -> usize {
        self.rsi.period()
    }

    pub fn oversold_threshold(&self) -> f64 {
        self.oversold_threshold
    }

    /// Classify a (current, previous) RSI pair. Returns the kind and its strength.
    pub fn classify(&self, current: f64, previous: f64) -> Option<(SignalKind, f64)> {
        let threshold = self.oversold_threshold;
        if current >= threshold {
            return None;
        }
        if current > previous {
            let strength =
                ((current - previous) / (threshold - previous + STRENGTH_EPSILON)).clamp(0.1, 0.9);
            Some((SignalKind::OversoldTurnUp, strength))
        } else {
            Some((SignalKind::InOversoldZone, 1.0 - current / threshold))
        }
    }
}

impl SignalEvaluator for RsiRebound {
    fn strategy_id(&self) -> StrategyId {
        StrategyId::RsiOversoldRebound
    }

    fn min_bars(&self) -> usize {
        self.period() + 1
    }

    fn history_bars(&self) -> usize {
        self.period()
    }

    fn evaluate(&self, series: &BarSeries) -> Outcome<Signal> {
        let needed = self.min_bars();
        if series.len() < needed {
            return Err(DataUnavailable::InsufficientHistory {
                needed,
                got: series.len(),
            });
        }
        let Some(last) = series.last() else {
            return Err(DataUnavailable::InsufficientHistory { needed, got: 0 });
        };

        let mut values = IndicatorValues::new();
        values.compute_into(&self.rsi, &series.closes());
        let key = self.rsi.name();
        let (current, previous) = values
            .current_and_previous(key)
            .ok_or_else(|| DataUnavailable::undefined(key))?;

        log::debug!(
            "{} {}: {key} current={current:.2} previous={previous:.2} close={:.2}",
            series.code(),
            last.date,
            last.close
        );

        let Some((kind, strength)) = self.classify(current, previous) else {
            return Ok(None);
        };

        let period = self.period();
        let threshold = self.oversold_threshold;
        let mut indicators = BTreeMap::new();
        indicators.insert(key.to_string(), current);
        indicators.insert(format!("{key}_prev"), previous);
        indicators.insert("oversold_threshold".to_string(), threshold);

        let note = match kind {
            SignalKind::OversoldTurnUp => format!(
                "RSI({period}) turned up from {previous:.2} to {current:.2} inside the oversold zone (threshold {threshold})"
            ),
            _ => format!("RSI({period}) at {current:.2}, in the oversold zone (threshold {threshold})"),
        };

        Ok(Some(
            Signal::new(series.code(), kind, last.date, last.close, strength)
                .with_indicators(indicators)
                .with_note(note),
        ))
    }
}
