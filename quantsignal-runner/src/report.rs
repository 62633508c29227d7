//! Report types returned by the pipeline, with content fingerprints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quantsignal_core::domain::{ScreeningPool, Signal};
use quantsignal_core::screening::RejectionCounts;

/// Content hash of a report (BLAKE3 hex of its JSON form).
pub type Fingerprint = String;

fn fingerprint_of<T: Serialize>(value: &T) -> Result<Fingerprint, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

/// An instrument (or holding) left out of a report, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub strategy: String,
    /// Signals in request order.
    pub signals: Vec<Signal>,
    /// Freshest bar date among instruments that were evaluated.
    pub latest_data_date: Option<NaiveDate>,
    pub skipped: Vec<SkippedInstrument>,
}

impl TimingReport {
    pub fn fingerprint(&self) -> Result<Fingerprint, serde_json::Error> {
        fingerprint_of(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitReport {
    pub strategy: String,
    /// Signals in holdings order; each carries its holding id.
    pub signals: Vec<Signal>,
    /// Freshest quote date among holdings that were evaluated.
    pub latest_data_date: Option<NaiveDate>,
    pub skipped: Vec<SkippedInstrument>,
}

impl ExitReport {
    pub fn fingerprint(&self) -> Result<Fingerprint, serde_json::Error> {
        fingerprint_of(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub strategy: String,
    pub pool: ScreeningPool,
    /// Per-stage rejection tallies.
    pub rejections: RejectionCounts,
    /// Number of instruments scanned after sampling.
    pub universe_size: usize,
    /// Instruments dropped for missing data rather than failing a screen.
    pub skipped: Vec<SkippedInstrument>,
}

impl ScreeningReport {
    /// An empty pool of the shape the strategy would produce.
    pub fn empty(strategy: impl Into<String>, pool: ScreeningPool) -> Self {
        Self {
            strategy: strategy.into(),
            pool,
            rejections: RejectionCounts::default(),
            universe_size: 0,
            skipped: Vec::new(),
        }
    }

    pub fn fingerprint(&self) -> Result<Fingerprint, serde_json::Error> {
        fingerprint_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantsignal_core::domain::SignalKind;

    fn report(price: f64) -> TimingReport {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        TimingReport {
            strategy: "rsi_oversold_rebound".into(),
            signals: vec![Signal::new("600000.SH", SignalKind::InOversoldZone, date, price, 0.4)],
            latest_data_date: Some(date),
            skipped: vec![SkippedInstrument {
                code: "000002.SZ".into(),
                reason: "insufficient history: need 15 bars, got 3".into(),
            }],
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = report(10.0).fingerprint().unwrap();
        let b = report(10.0).fingerprint().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        assert_ne!(
            report(10.0).fingerprint().unwrap(),
            report(10.01).fingerprint().unwrap()
        );
    }

    #[test]
    fn screening_pool_serializes_tagged() {
        let r = ScreeningReport::empty("value_momentum", ScreeningPool::Ranked(Vec::new()));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["pool"]["type"], "ranked");
        assert_eq!(json["universe_size"], 0);
    }
}
