//! Moving average crossover: golden cross and death cross detection.
//!
//! Golden cross: previous short < previous long and current short >= current long.
//! Death cross: previous short > previous long and current short <= current long.
//! The two are mutually exclusive; golden is checked first.

use std::collections::BTreeMap;

use super::SignalEvaluator;
use crate::domain::{BarSeries, Signal, SignalKind};
use crate::error::{DataUnavailable, Outcome, StrategyError};
use crate::indicators::{trailing_mean_excluding_last, Indicator, IndicatorValues, Sma};
use crate::strategy::StrategyId;

pub const GOLDEN_CROSS_STRENGTH: f64 = 0.7;
pub const DEATH_CROSS_STRENGTH: f64 = 0.3;

/// Volume confirmation for golden crosses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFilter {
    /// Bars in the baseline average, all strictly before the signal bar.
    pub avg_days: usize,
    /// Signal-bar volume must be strictly greater than `multiple * average`.
    pub multiple: f64,
}

/// Result of the volume gate for one golden cross.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VolumeCheck {
    Disabled,
    /// Not enough prior bars (or an undefined average); the cross passes unconfirmed.
    Unavailable,
    Confirmed { average: f64, threshold: f64 },
    Rejected { average: f64, threshold: f64 },
}

#[derive(Debug, Clone)]
pub struct MaCrossover {
    short: Sma,
    long: Sma,
    volume: Option<VolumeFilter>,
}

impl MaCrossover {
    /// Fails with a configuration error unless `short_period < long_period`.
    pub fn new(
        short_period: usize,
        long_period: usize,
        volume: Option<VolumeFilter>,
    ) -> Result<Self, StrategyError> {
        if short_period == 0 {
            return Err(StrategyError::config("short_ma_period must be >= 1"));
        }
        if short_period >= long_period {
            return Err(StrategyError::config(format!(
                "short_ma_period ({short_period}) must be less than long_ma_period ({long_period})"
            )));
        }
        Ok(Self {
            short: Sma::new(short_period),
            long: Sma::new(long_period),
            volume,
        })
    }

    pub fn short_period(&self) -> usize {
        self.short.period()
    }

    pub fn long_period(&self) -> usize {
        self.long.period()
    }

    pub fn volume_filter(&self) -> Option<VolumeFilter> {
        self.volume
    }

    /// Crossover classification from the four MA readings.
    pub fn classify(
        prev_short: f64,
        prev_long: f64,
        cur_short: f64,
        cur_long: f64,
    ) -> Option<SignalKind> {
        if prev_short < prev_long && cur_short >= cur_long {
            Some(SignalKind::MaGoldenCross)
        } else if prev_short > prev_long && cur_short <= cur_long {
            Some(SignalKind::MaDeathCross)
        } else {
            None
        }
    }

    fn check_volume(&self, volumes: &[f64]) -> VolumeCheck {
        let Some(filter) = self.volume else {
            return VolumeCheck::Disabled;
        };
        let Some(current) = volumes.last().copied() else {
            return VolumeCheck::Unavailable;
        };
        let Some(average) = trailing_mean_excluding_last(volumes, filter.avg_days) else {
            return VolumeCheck::Unavailable;
        };
        let threshold = average * filter.multiple;
        if current > threshold {
            VolumeCheck::Confirmed { average, threshold }
        } else {
            VolumeCheck::Rejected { average, threshold }
        }
    }

    fn record_volume(&self, indicators: &mut BTreeMap<String, f64>, average: f64, threshold: f64) {
        let days = self.volume.map_or(0, |v| v.avg_days);
        indicators.insert(format!("avg_volume_{days}"), average);
        indicators.insert("volume_threshold".to_string(), threshold);
        indicators.insert("volume_confirmed".to_string(), 1.0);
    }
}

impl SignalEvaluator for MaCrossover {
    fn strategy_id(&self) -> StrategyId {
        StrategyId::MaCross
    }

    fn min_bars(&self) -> usize {
        self.long_period() + 1
    }

    fn history_bars(&self) -> usize {
        self.long_period() + 1
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

        let closes = series.closes();
        let mut values = IndicatorValues::new();
        values.compute_into(&self.short, &closes);
        values.compute_into(&self.long, &closes);

        let short_key = self.short.name();
        let long_key = self.long.name();
        let (cur_short, prev_short) = values
            .current_and_previous(short_key)
            .ok_or_else(|| DataUnavailable::undefined(short_key))?;
        let (cur_long, prev_long) = values
            .current_and_previous(long_key)
            .ok_or_else(|| DataUnavailable::undefined(long_key))?;

        log::debug!(
            "{} {}: {short_key} {prev_short:.2}->{cur_short:.2}, {long_key} {prev_long:.2}->{cur_long:.2}",
            series.code(),
            last.date
        );

        let Some(kind) = Self::classify(prev_short, prev_long, cur_short, cur_long) else {
            return Ok(None);
        };

        let mut indicators = BTreeMap::new();
        indicators.insert(short_key.to_string(), cur_short);
        indicators.insert(long_key.to_string(), cur_long);
        indicators.insert(format!("{short_key}_prev"), prev_short);
        indicators.insert(format!("{long_key}_prev"), prev_long);
        indicators.insert("volume".to_string(), last.volume);

        let (s, l) = (self.short_period(), self.long_period());
        let (strength, note) = match kind {
            SignalKind::MaGoldenCross => {
                let check = self.check_volume(&series.volumes());
                let suffix = match check {
                    VolumeCheck::Disabled => "",
                    VolumeCheck::Unavailable => {
                        indicators.insert("volume_confirmed".to_string(), 0.0);
                        " (volume baseline unavailable, unconfirmed)"
                    }
                    VolumeCheck::Confirmed { average, threshold } => {
                        self.record_volume(&mut indicators, average, threshold);
                        " (volume confirmed)"
                    }
                    VolumeCheck::Rejected { average, threshold } => {
                        log::debug!(
                            "{}: golden cross suppressed, volume {:.0} <= {threshold:.0} (avg {average:.0})",
                            series.code(),
                            last.volume
                        );
                        return Ok(None);
                    }
                };
                (
                    GOLDEN_CROSS_STRENGTH,
                    format!("SMA({s}) crossed above SMA({l}){suffix}"),
                )
            }
            _ => (DEATH_CROSS_STRENGTH, format!("SMA({s}) crossed below SMA({l})")),
        };

        Ok(Some(
            Signal::new(series.code(), kind, last.date, last.close, strength)
                .with_indicators(indicators)
                .with_note(note),
        ))
    }
}
