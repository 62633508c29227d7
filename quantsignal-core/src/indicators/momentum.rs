//! Lookback return used by the value-momentum screen.
//!
//! momentum = (close[last] - close[start]) / close[start]
//! where start sits `window_months * 21` bars before the last bar, or at the
//! earliest bar when the history is shorter than that.

/// Approximate trading days per month.
pub const TRADING_DAYS_PER_MONTH: usize = 21;

/// Index of the start bar for a series of `len` closes.
///
/// `None` when fewer than two bars exist. With `lookback = window_months * 21`:
/// `len <= lookback` uses index 0; otherwise the index is `len - 1 - lookback`.
pub fn momentum_start_index(len: usize, window_months: usize) -> Option<usize> {
    if len < 2 {
        return None;
    }
    let lookback = window_months * TRADING_DAYS_PER_MONTH;
    Some(if len <= lookback {
        0
    } else {
        len - 1 - lookback
    })
}

/// Fractional return over the lookback window, or `None` if undefined
/// (too short, non-finite prices, or a zero start price).
pub fn momentum_ratio(closes: &[f64], window_months: usize) -> Option<f64> {
    let start_idx = momentum_start_index(closes.len(), window_months)?;
    let start = closes[start_idx];
    let end = *closes.last()?;
    if !start.is_finite() || !end.is_finite() || start == 0.0 {
        return None;
    }
    Some((end - start) / start)
}
