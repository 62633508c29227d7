//! Classified signals emitted by timing and exit evaluation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Signal category. Serialized in the wire form callers already consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    /// RSI below the oversold threshold and rising.
    OversoldTurnUp,
    /// RSI below the oversold threshold, not rising.
    InOversoldZone,
    MaGoldenCross,
    MaDeathCross,
    TakeProfitFixed,
    StopLossFixed,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OversoldTurnUp => "OVERSOLD_TURN_UP",
            Self::InOversoldZone => "IN_OVERSOLD_ZONE",
            Self::MaGoldenCross => "MA_GOLDEN_CROSS",
            Self::MaDeathCross => "MA_DEATH_CROSS",
            Self::TakeProfitFixed => "TAKE_PROFIT_FIXED",
            Self::StopLossFixed => "STOP_LOSS_FIXED",
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Self::TakeProfitFixed | Self::StopLossFixed)
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The atomic evaluation output. Immutable once produced.
///
/// `indicators` is a `BTreeMap` so serialization order is stable, which
/// keeps report fingerprints reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub code: String,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub kind: SignalKind,
    pub trigger_date: NaiveDate,
    pub trigger_price: f64,
    /// Normalized to [0, 1]; semantics depend on `kind`.
    pub strength: f64,
    pub indicators: BTreeMap<String, f64>,
    /// Set for exit signals: the holding that triggered.
    pub holding_id: Option<u64>,
    pub note: String,
}

impl Signal {
    /// Create a signal with empty enrichment fields. Strength is clamped to [0, 1].
    pub fn new(
        code: impl Into<String>,
        kind: SignalKind,
        trigger_date: NaiveDate,
        trigger_price: f64,
        strength: f64,
    ) -> Self {
        Self {
            code: code.into(),
            name: None,
            industry: None,
            kind,
            trigger_date,
            trigger_price,
            strength: strength.clamp(0.0, 1.0),
            indicators: BTreeMap::new(),
            holding_id: None,
            note: String::new(),
        }
    }

    pub fn with_indicators(mut self, indicators: BTreeMap<String, f64>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_holding(mut self, holding_id: u64) -> Self {
        self.holding_id = Some(holding_id);
        self
    }

    /// Attach display name and industry from reference data.
    pub fn enrich(mut self, name: Option<String>, industry: Option<String>) -> Self {
        self.name = name;
        self.industry = industry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&SignalKind::OversoldTurnUp).unwrap();
        assert_eq!(json, "\"OVERSOLD_TURN_UP\"");
        let back: SignalKind = serde_json::from_str("\"MA_DEATH_CROSS\"").unwrap();
        assert_eq!(back, SignalKind::MaDeathCross);
        assert_eq!(SignalKind::StopLossFixed.to_string(), "STOP_LOSS_FIXED");
    }

    #[test]
    fn strength_is_clamped() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(Signal::new("X", SignalKind::MaGoldenCross, d, 1.0, 1.7).strength, 1.0);
        assert_eq!(Signal::new("X", SignalKind::MaGoldenCross, d, 1.0, -0.2).strength, 0.0);
    }

    #[test]
    fn exit_kinds() {
        assert!(SignalKind::TakeProfitFixed.is_exit());
        assert!(!SignalKind::InOversoldZone.is_exit());
    }
}
