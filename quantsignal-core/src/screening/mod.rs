//! Screening engine: ordered filter chains over a universe, plus composite
//! scoring and ranking for the value-momentum strategy.

pub mod simple_value;
pub mod value_momentum;

pub use simple_value::SimpleValue;
pub use value_momentum::{rank, ValueMomentum};

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::strategy::{self, ResolvedParams, StrategyId, StrategyKind, StrategyParams};

/// Outcome of one screening stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenVerdict {
    Passed,
    FilteredByPb,
    FilteredByRoe,
    FilteredByMomentum,
    FilteredByValuation,
    FilteredBySpecialTreatment,
}

impl ScreenVerdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Final screening result for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum Screened<T> {
    Selected(T),
    Rejected(ScreenVerdict),
}

/// Per-stage rejection tallies, reported with every pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub pb: usize,
    pub roe: usize,
    pub momentum: usize,
    pub valuation: usize,
    pub special_treatment: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, verdict: ScreenVerdict) {
        match verdict {
            ScreenVerdict::Passed => {}
            ScreenVerdict::FilteredByPb => self.pb += 1,
            ScreenVerdict::FilteredByRoe => self.roe += 1,
            ScreenVerdict::FilteredByMomentum => self.momentum += 1,
            ScreenVerdict::FilteredByValuation => self.valuation += 1,
            ScreenVerdict::FilteredBySpecialTreatment => self.special_treatment += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pb + self.roe + self.momentum + self.valuation + self.special_treatment
    }
}

/// A resolved, validated selection strategy.
#[derive(Debug, Clone)]
pub enum ScreeningStrategy {
    ValueMomentum(ValueMomentum),
    SimpleValue(SimpleValue),
}

impl ScreeningStrategy {
    pub fn resolve(id: &str, params: &StrategyParams) -> Result<Self, StrategyError> {
        let descriptor = strategy::find_kind(id, StrategyKind::Selection)?;
        let p = ResolvedParams::resolve(descriptor.params, params)?;
        match descriptor.id {
            StrategyId::ValueMomentum => Ok(Self::ValueMomentum(ValueMomentum::from_percent(
                p.integer("momentum_window_months")?,
                p.number("min_momentum_percent")?,
                p.number("roe_threshold_percent")?,
                p.number("max_pb_value")?,
            ))),
            StrategyId::SimpleValue => Ok(Self::SimpleValue(SimpleValue::from_percent(
                p.number("max_pe_ttm")?,
                p.number("max_pb")?,
                p.number("min_dividend_yield")?,
                p.number("min_total_mv")?,
                p.flag("exclude_st")?,
            ))),
            other => Err(StrategyError::WrongKind {
                id: other.to_string(),
                expected: StrategyKind::Selection,
            }),
        }
    }

    pub fn strategy_id(&self) -> StrategyId {
        match self {
            Self::ValueMomentum(_) => StrategyId::ValueMomentum,
            Self::SimpleValue(_) => StrategyId::SimpleValue,
        }
    }
}
