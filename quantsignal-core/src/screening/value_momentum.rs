//! Value-momentum screen.
//!
//! Filters in order: PB in (0, max_pb], ROE >= threshold, momentum >= minimum.
//! Survivors get a 0-100 composite score:
//!
//! | factor   | tiers                                                  |
//! |----------|--------------------------------------------------------|
//! | ROE      | >= 20% → 40, >= 15% → 30, >= 10% → 20, else 0          |
//! | PB       | <= 1.0 → 30, <= 1.5 → 20, <= 2.0 → 10, <= max_pb → 5   |
//! | momentum | >= 20% → 30, >= 10% → 20, >= minimum → 10              |

use super::{ScreenVerdict, Screened};
use crate::domain::{InstrumentMeta, ScoredCandidate};
use crate::indicators::{momentum_ratio, TRADING_DAYS_PER_MONTH};

const DAYS_PER_MONTH: f64 = 30.44;
/// Calendar-day slack so the window still covers `window * 21` trading days
/// across holidays.
const HISTORY_SLACK_DAYS: i64 = 45;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueMomentum {
    window_months: usize,
    /// Fractions.
    min_momentum: f64,
    roe_threshold: f64,
    max_pb: f64,
}

impl ValueMomentum {
    /// Build from caller-facing percentages (momentum and ROE) and a plain PB cap.
    pub fn from_percent(
        window_months: usize,
        min_momentum_pct: f64,
        roe_threshold_pct: f64,
        max_pb: f64,
    ) -> Self {
        Self {
            window_months: window_months.max(1),
            min_momentum: min_momentum_pct / 100.0,
            roe_threshold: roe_threshold_pct / 100.0,
            max_pb,
        }
    }

    pub fn window_months(&self) -> usize {
        self.window_months
    }

    pub fn min_momentum(&self) -> f64 {
        self.min_momentum
    }

    pub fn roe_threshold(&self) -> f64 {
        self.roe_threshold
    }

    pub fn max_pb(&self) -> f64 {
        self.max_pb
    }

    /// Trading bars in the momentum lookback.
    pub fn lookback_bars(&self) -> usize {
        self.window_months * TRADING_DAYS_PER_MONTH
    }

    /// Calendar days of bars to request for momentum.
    pub fn history_calendar_days(&self) -> i64 {
        (self.window_months as f64 * DAYS_PER_MONTH + HISTORY_SLACK_DAYS as f64) as i64
    }

    /// Stages 1 and 2. A missing or non-positive PB, or a missing ROE, fails.
    pub fn screen_fundamentals(&self, pb: Option<f64>, roe: Option<f64>) -> ScreenVerdict {
        match pb {
            Some(pb) if pb > 0.0 && pb <= self.max_pb => {}
            _ => return ScreenVerdict::FilteredByPb,
        }
        match roe {
            Some(roe) if roe >= self.roe_threshold => ScreenVerdict::Passed,
            _ => ScreenVerdict::FilteredByRoe,
        }
    }

    /// Stage 3. Undefined momentum fails.
    pub fn screen_momentum(&self, momentum: Option<f64>) -> ScreenVerdict {
        match momentum {
            Some(m) if m >= self.min_momentum => ScreenVerdict::Passed,
            _ => ScreenVerdict::FilteredByMomentum,
        }
    }

    /// Composite score. Each factor is scored on its own; a factor outside
    /// every tier contributes 0 without affecting the others.
    pub fn composite_score(&self, roe: f64, pb: f64, momentum: f64) -> u32 {
        let roe_points = if roe >= 0.20 {
            40
        } else if roe >= 0.15 {
            30
        } else if roe >= 0.10 {
            20
        } else {
            0
        };

        let pb_points = if pb <= 0.0 || pb.is_nan() {
            0
        } else if pb <= 1.0 {
            30
        } else if pb <= 1.5 {
            20
        } else if pb <= 2.0 {
            10
        } else if pb <= self.max_pb {
            5
        } else {
            0
        };

        let momentum_points = if momentum >= 0.20 {
            30
        } else if momentum >= 0.10 {
            20
        } else if momentum >= self.min_momentum {
            10
        } else {
            0
        };

        roe_points + pb_points + momentum_points
    }

    /// Run the full chain for one instrument whose PB, ROE and closes are known.
    ///
    /// `closes` is only consulted when the fundamental stages pass.
    pub fn screen(
        &self,
        meta: &InstrumentMeta,
        pb: Option<f64>,
        roe: Option<f64>,
        closes: impl FnOnce() -> Vec<f64>,
    ) -> Screened<ScoredCandidate> {
        let verdict = self.screen_fundamentals(pb, roe);
        if !verdict.is_passed() {
            return Screened::Rejected(verdict);
        }
        let momentum = momentum_ratio(&closes(), self.window_months);
        let verdict = self.screen_momentum(momentum);
        match (verdict, pb, roe, momentum) {
            (ScreenVerdict::Passed, Some(pb), Some(roe), Some(momentum)) => {
                Screened::Selected(self.candidate(meta, roe, pb, momentum))
            }
            (ScreenVerdict::Passed, ..) => Screened::Rejected(ScreenVerdict::FilteredByMomentum),
            (rejected, ..) => Screened::Rejected(rejected),
        }
    }

    /// Score an instrument that has passed every stage.
    pub fn candidate(&self, meta: &InstrumentMeta, roe: f64, pb: f64, momentum: f64) -> ScoredCandidate {
        ScoredCandidate {
            code: meta.code.clone(),
            name: Some(meta.name.clone()),
            industry: meta.industry.clone(),
            roe,
            pb,
            momentum,
            composite_score: self.composite_score(roe, pb, momentum),
        }
    }
}

/// Sort by descending composite score and keep the first `limit`.
///
/// The sort is stable: equal scores keep their scan order.
pub fn rank(mut candidates: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.composite_score.cmp(&a.composite_score));
    candidates.truncate(limit);
    candidates
}
