//! Windowed indicators over price and volume sequences.
//!
//! Every indicator is a pure function of its input slice and returns a vector
//! of the same length. Positions without enough history hold `f64::NAN`,
//! which callers read as "undefined" and never as zero.

pub mod momentum;
pub mod rsi;
pub mod sma;

use std::collections::HashMap;

pub use momentum::{momentum_ratio, momentum_start_index, TRADING_DAYS_PER_MONTH};
pub use rsi::{compute_rsi, Rsi};
pub use sma::{compute_sma, trailing_mean_excluding_last, Sma};

/// Trait for indicators.
///
/// `compute` returns a series aligned index-for-index with `values`; the
/// first `lookback()` entries are `f64::NAN`. No output at index t may depend
/// on input after t.
pub trait Indicator: Send + Sync {
    /// Key used in indicator maps (e.g. "rsi_14", "sma_5").
    fn name(&self) -> &str;

    /// Number of leading undefined entries.
    fn lookback(&self) -> usize;

    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Named indicator series computed for one instrument.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute `indicator` over `values` and store it under its name.
    pub fn compute_into(&mut self, indicator: &dyn Indicator, values: &[f64]) {
        self.insert(indicator.name().to_string(), indicator.compute(values));
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at `index`, or `None` if the series is missing, too short, or NaN there.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    /// Last and second-to-last defined values, i.e. (current, previous).
    pub fn current_and_previous(&self, name: &str) -> Option<(f64, f64)> {
        let series = self.series.get(name)?;
        let n = series.len();
        if n < 2 {
            return None;
        }
        let (cur, prev) = (series[n - 1], series[n - 2]);
        if cur.is_nan() || prev.is_nan() {
            return None;
        }
        Some((cur, prev))
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev close (or close for the first bar), high/low = max/min(open, close) ± 1,
/// volume = 1000, consecutive calendar days from 2024-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Validated series from closes, code "TEST".
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::BarSeries {
    crate::domain::BarSeries::new("TEST", make_bars(closes)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
