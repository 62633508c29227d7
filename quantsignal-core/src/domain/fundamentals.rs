//! Fundamental snapshots (per reporting period) and daily valuation rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Disclosed quality/value figures for one instrument and one reporting period.
///
/// ROE fields are fractions (0.18 = 18%). Any of them may be absent for a
/// given period; [`FundamentalSnapshot::resolved_roe`] applies the fallback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub code: String,
    /// Announcement date, when known.
    pub ann_date: Option<NaiveDate>,
    /// Reporting period end date.
    pub end_date: NaiveDate,
    /// Annualized ROE.
    pub roe_yearly: Option<f64>,
    /// Weighted-average ROE.
    pub roe_waa: Option<f64>,
    /// Raw ROE.
    pub roe: Option<f64>,
    pub pb: Option<f64>,
}

impl FundamentalSnapshot {
    /// ROE with fallback: annualized, then weighted-average, then raw.
    pub fn resolved_roe(&self) -> Option<f64> {
        [self.roe_yearly, self.roe_waa, self.roe]
            .into_iter()
            .flatten()
            .find(|v| v.is_finite())
    }

    /// PB if present and finite.
    pub fn resolved_pb(&self) -> Option<f64> {
        self.pb.filter(|v| v.is_finite())
    }
}

/// Pick the snapshot with the latest reporting period end date.
///
/// Ties keep the first occurrence in input order.
pub fn latest_snapshot(snapshots: &[FundamentalSnapshot]) -> Option<&FundamentalSnapshot> {
    snapshots.iter().fold(None, |best, s| match best {
        Some(b) if b.end_date >= s.end_date => Some(b),
        _ => Some(s),
    })
}

/// Per-day valuation metrics for one instrument.
///
/// `dividend_yield` is a fraction; `total_market_value` is in units of
/// one hundred million of the listing currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValuation {
    pub code: String,
    pub trade_date: NaiveDate,
    pub close: Option<f64>,
    pub pe_ttm: Option<f64>,
    pub pb: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub total_market_value: Option<f64>,
}

/// Keep only the latest row per code, preserving first-seen code order.
pub fn latest_valuations(rows: Vec<DailyValuation>) -> Vec<DailyValuation> {
    let mut out: Vec<DailyValuation> = Vec::new();
    for row in rows {
        match out.iter_mut().find(|r| r.code == row.code) {
            Some(existing) => {
                if row.trade_date > existing.trade_date {
                    *existing = row;
                }
            }
            None => out.push(row),
        }
    }
    out
}
