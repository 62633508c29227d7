//! Daily OHLCV bars and the ordered per-instrument series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV observation for one instrument on one trading day.
///
/// Prices are forward-adjusted when the series was requested that way.
/// Volume is a float because adjustment can make it fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic sanity check: positive prices, high/low envelope, non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Violations of the series invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bars out of order at {date}")]
    Unordered { date: NaiveDate },

    #[error("duplicate bar for {date}")]
    Duplicate { date: NaiveDate },

    #[error("non-positive price on {date}")]
    NonPositivePrice { date: NaiveDate },

    #[error("negative volume on {date}")]
    NegativeVolume { date: NaiveDate },
}

/// Ascending, duplicate-free sequence of bars for a single instrument.
///
/// Owned by one pipeline invocation; never cached across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    code: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, checking ordering and per-bar value constraints.
    ///
    /// NaN prices are allowed through: indicators propagate them as undefined.
    pub fn new(code: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarError> {
        for (i, bar) in bars.iter().enumerate() {
            if i > 0 {
                let prev = bars[i - 1].date;
                if bar.date == prev {
                    return Err(BarError::Duplicate { date: bar.date });
                }
                if bar.date < prev {
                    return Err(BarError::Unordered { date: bar.date });
                }
            }
            if bar.open <= 0.0 || bar.close <= 0.0 || bar.high <= 0.0 || bar.low <= 0.0 {
                return Err(BarError::NonPositivePrice { date: bar.date });
            }
            if bar.volume < 0.0 {
                return Err(BarError::NegativeVolume { date: bar.date });
            }
        }
        Ok(Self {
            code: code.into(),
            bars,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Date of the most recent bar, used for freshness reporting.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}
