//! Exit evaluators: decide whether an open holding should be closed at the
//! current quote.

pub mod fixed_profit_loss;

pub use fixed_profit_loss::FixedProfitLoss;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Holding, Signal};
use crate::error::{Outcome, StrategyError};
use crate::strategy::{self, ResolvedParams, StrategyId, StrategyKind, StrategyParams};

/// Latest price observation used for exit checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub date: NaiveDate,
    pub price: f64,
}

/// Trait for exit rules.
pub trait ExitEvaluator: Send + Sync {
    fn strategy_id(&self) -> StrategyId;

    fn evaluate(&self, holding: &Holding, quote: Quote) -> Outcome<Signal>;
}

/// A resolved, validated exit strategy.
#[derive(Debug, Clone)]
pub enum ExitStrategy {
    FixedProfitLoss(FixedProfitLoss),
}

impl ExitStrategy {
    pub fn resolve(id: &str, params: &StrategyParams) -> Result<Self, StrategyError> {
        let descriptor = strategy::find_kind(id, StrategyKind::Exit)?;
        let p = ResolvedParams::resolve(descriptor.params, params)?;
        match descriptor.id {
            StrategyId::FixedProfitLoss => Ok(Self::FixedProfitLoss(FixedProfitLoss::from_percent(
                p.number("take_profit_percent")?,
                p.number("stop_loss_percent")?,
            )?)),
            other => Err(StrategyError::WrongKind {
                id: other.to_string(),
                expected: StrategyKind::Exit,
            }),
        }
    }

    pub fn evaluator(&self) -> &dyn ExitEvaluator {
        match self {
            Self::FixedProfitLoss(e) => e,
        }
    }
}
