//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (the seed needs `period` price changes).
//! Edge cases: no movement → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    /// `period` of 0 is treated as 1.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        compute_rsi(closes, self.period)
    }
}

/// RSI series aligned with `closes`. Inputs shorter than `period + 1` yield all NaN.
///
/// A NaN inside the seed window leaves the whole series undefined; a NaN
/// later on makes every value from that point undefined.
pub fn compute_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if n < period + 1 {
        return result;
    }

    let change = |i: usize| closes[i] - closes[i - 1];

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let ch = change(i);
        if ch.is_nan() {
            return result;
        }
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = rsi_from_averages(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let ch = change(i);
        if ch.is_nan() {
            break;
        }
        let gain = ch.max(0.0);
        let loss = (-ch).max(0.0);

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains() {
        let result = compute_rsi(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0], 3);
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let result = compute_rsi(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0], 3);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_is_fifty() {
        let result = compute_rsi(&[10.0; 6], 3);
        assert_approx(result[4], 50.0, 1e-9);
    }

    #[test]
    fn rsi_seed_value() {
        // Changes: +0.34, -0.25, -0.48 → avg_gain 0.34/3, avg_loss 0.73/3
        // RSI[3] = 100 - 100 / (1 + 0.34/0.73)
        let result = compute_rsi(&[44.0, 44.34, 44.09, 43.61, 44.33], 3);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);
        // Wilder step with +0.72
        let g = (0.34 / 3.0) * (2.0 / 3.0) + 0.72 / 3.0;
        let l = (0.73 / 3.0) * (2.0 / 3.0);
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + g / l), 1e-9);
    }

    #[test]
    fn rsi_short_input_all_undefined() {
        let result = compute_rsi(&[1.0, 2.0, 3.0], 3);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|v| v.is_nan()));
        assert!(compute_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_nan_in_seed() {
        let result = compute_rsi(&[100.0, 101.0, f64::NAN, 103.0, 104.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_nan_after_seed_stops_series() {
        let result = compute_rsi(&[100.0, 101.0, 100.5, 102.0, f64::NAN, 103.0], 3);
        assert!(!result[3].is_nan());
        assert!(result[4].is_nan());
        assert!(result[5].is_nan());
    }

    #[test]
    fn rsi_trait_matches_function() {
        let closes = [10.0, 10.5, 10.2, 10.8, 10.1, 9.9, 10.4];
        let rsi = Rsi::new(3);
        assert_eq!(rsi.name(), "rsi_3");
        assert_eq!(rsi.lookback(), 3);
        let a = rsi.compute(&closes);
        let b = compute_rsi(&closes, 3);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x.is_nan() && y.is_nan()) || x == y);
        }
    }
}
