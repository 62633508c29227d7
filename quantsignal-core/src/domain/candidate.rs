//! Screening outputs: scored candidates and plain filter hits.

use serde::{Deserialize, Serialize};

/// A value-momentum survivor with its raw factors and composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub code: String,
    pub name: Option<String>,
    pub industry: Option<String>,
    /// Fraction (0.18 = 18%).
    pub roe: f64,
    pub pb: f64,
    /// Fraction over the lookback window.
    pub momentum: f64,
    /// 0..=100.
    pub composite_score: u32,
}

/// An instrument that passed every simple-value condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueScreenHit {
    pub code: String,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub pe_ttm: f64,
    pub pb: f64,
    /// Fraction.
    pub dividend_yield: f64,
    /// Hundred-million units.
    pub total_market_value: f64,
}

/// Screening result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum ScreeningPool {
    /// Sorted by descending composite score, stable on scan order.
    Ranked(Vec<ScoredCandidate>),
    /// Universe order, unscored.
    Filtered(Vec<ValueScreenHit>),
}

impl ScreeningPool {
    pub fn len(&self) -> usize {
        match self {
            Self::Ranked(v) => v.len(),
            Self::Filtered(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn codes(&self) -> Vec<&str> {
        match self {
            Self::Ranked(v) => v.iter().map(|c| c.code.as_str()).collect(),
            Self::Filtered(v) => v.iter().map(|c| c.code.as_str()).collect(),
        }
    }
}
