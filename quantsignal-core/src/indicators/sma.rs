//! Simple Moving Average (SMA).
//!
//! Rolling arithmetic mean over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// `period` of 0 is treated as 1.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        compute_sma(values, self.period)
    }
}

/// SMA series aligned with `values`. A window containing NaN yields NaN.
pub fn compute_sma(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }

    if !nan_in_window {
        result[period - 1] = sum / period as f64;
    }

    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        sum = sum - leaving + entering;

        // A NaN poisons the running sum; rescan the window until it leaves.
        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            let window = &values[(i + 1 - period)..=i];
            nan_in_window = window.iter().any(|v| v.is_nan());
            sum = window.iter().sum();
            if nan_in_window {
                continue;
            }
        }

        result[i] = sum / period as f64;
    }

    result
}

/// Mean of the `period` values immediately before the last one.
///
/// Used for "average volume over the N days before today". `None` when fewer
/// than `period` prior values exist or any of them is NaN.
pub fn trailing_mean_excluding_last(values: &[f64], period: usize) -> Option<f64> {
    let prior = values.split_last()?.1;
    if period == 0 || prior.len() < period {
        return None;
    }
    compute_sma(prior, period)
        .last()
        .copied()
        .filter(|v| !v.is_nan())
}
