//! Open positions checked by exit strategies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A position held by the caller. Persistence is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: u64,
    pub code: String,
    pub cost_price: f64,
    pub quantity: f64,
    pub open_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

/// Profit or loss of a holding at a given price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitLoss {
    pub amount: f64,
    /// Percent of cost (12.5 = +12.5%).
    pub percent: f64,
}

impl Holding {
    /// Cost and quantity must both be positive for exit checks to be meaningful.
    pub fn is_valid(&self) -> bool {
        self.cost_price > 0.0 && self.quantity > 0.0
    }

    pub fn profit_loss(&self, price: f64) -> Option<ProfitLoss> {
        if !self.is_valid() || !price.is_finite() {
            return None;
        }
        Some(ProfitLoss {
            amount: (price - self.cost_price) * self.quantity,
            percent: (price - self.cost_price) / self.cost_price * 100.0,
        })
    }
}
