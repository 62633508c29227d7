//! Fixed take-profit / stop-loss.
//!
//! profit_target = cost * (1 + take_profit)
//! loss_target   = cost * (1 + stop_loss), stop_loss < 0
//! Take-profit is checked first; when it fires stop-loss is not evaluated.

use std::collections::BTreeMap;

use super::{ExitEvaluator, Quote};
use crate::domain::{Holding, Signal, SignalKind};
use crate::error::{DataUnavailable, Outcome, StrategyError};
use crate::strategy::StrategyId;

/// Exits either fire or they don't; strength carries no gradation.
pub const EXIT_STRENGTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedProfitLoss {
    /// Fraction above cost (0.2 = +20%).
    take_profit: f64,
    /// Fraction below cost, negative (-0.1 = -10%).
    stop_loss: f64,
}

impl FixedProfitLoss {
    /// Build from percentages as callers supply them (20, -10).
    pub fn from_percent(take_profit_pct: f64, stop_loss_pct: f64) -> Result<Self, StrategyError> {
        if take_profit_pct <= 0.0 {
            return Err(StrategyError::config(format!(
                "take_profit_percent must be positive, got {take_profit_pct}"
            )));
        }
        if stop_loss_pct >= 0.0 || stop_loss_pct < -100.0 {
            return Err(StrategyError::config(format!(
                "stop_loss_percent must be in [-100, 0), got {stop_loss_pct}"
            )));
        }
        Ok(Self {
            take_profit: take_profit_pct / 100.0,
            stop_loss: stop_loss_pct / 100.0,
        })
    }

    pub fn profit_target(&self, cost: f64) -> f64 {
        cost * (1.0 + self.take_profit)
    }

    pub fn loss_target(&self, cost: f64) -> f64 {
        cost * (1.0 + self.stop_loss)
    }

    /// Which exit, if any, fires at `price`, with the target that was crossed.
    pub fn classify(&self, cost: f64, price: f64) -> Option<(SignalKind, f64)> {
        let profit_target = self.profit_target(cost);
        if price >= profit_target {
            return Some((SignalKind::TakeProfitFixed, profit_target));
        }
        let loss_target = self.loss_target(cost);
        if price <= loss_target {
            return Some((SignalKind::StopLossFixed, loss_target));
        }
        None
    }
}

impl ExitEvaluator for FixedProfitLoss {
    fn strategy_id(&self) -> StrategyId {
        StrategyId::FixedProfitLoss
    }

    fn evaluate(&self, holding: &Holding, quote: Quote) -> Outcome<Signal> {
        if !holding.is_valid() {
            return Err(DataUnavailable::InvalidHolding { id: holding.id });
        }
        let Some(pnl) = holding.profit_loss(quote.price) else {
            return Err(DataUnavailable::MissingPrice);
        };
        let Some((kind, target)) = self.classify(holding.cost_price, quote.price) else {
            return Ok(None);
        };

        let mut indicators = BTreeMap::new();
        indicators.insert("target_price".to_string(), target);
        indicators.insert("cost_price".to_string(), holding.cost_price);
        indicators.insert("pnl_percent".to_string(), pnl.percent);

        let note = match kind {
            SignalKind::TakeProfitFixed => format!(
                "price {:.2} reached take-profit target {target:.2} (+{:.1}% over cost {:.2})",
                quote.price,
                self.take_profit * 100.0,
                holding.cost_price
            ),
            _ => format!(
                "price {:.2} fell to stop-loss target {target:.2} ({:.1}% from cost {:.2})",
                quote.price,
                self.stop_loss * 100.0,
                holding.cost_price
            ),
        };

        Ok(Some(
            Signal::new(&holding.code, kind, quote.date, quote.price, EXIT_STRENGTH)
                .with_indicators(indicators)
                .with_holding(holding.id)
                .with_note(note),
        ))
    }
}
