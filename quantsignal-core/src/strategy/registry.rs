//! Immutable strategy registry.
//!
//! One static descriptor per strategy: its identifier, kind, display text and
//! parameter schema. Lookup accepts the canonical id or a legacy alias.

use std::fmt;

use serde::Serialize;

use super::params::ParamSpec;
use crate::error::StrategyError;

/// What a strategy produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Timing,
    Exit,
    Selection,
}

impl StrategyKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "timing" => Some(Self::Timing),
            "exit" => Some(Self::Exit),
            "selection" | "screening" => Some(Self::Selection),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timing => "timing",
            Self::Exit => "exit",
            Self::Selection => "selection",
        })
    }
}

/// Tag for each registered strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    RsiOversoldRebound,
    MaCross,
    FixedProfitLoss,
    ValueMomentum,
    SimpleValue,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsiOversoldRebound => "rsi_oversold_rebound",
            Self::MaCross => "ma_cross",
            Self::FixedProfitLoss => "fixed_profit_loss",
            Self::ValueMomentum => "value_momentum",
            Self::SimpleValue => "simple_value",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyDescriptor {
    pub id: StrategyId,
    pub aliases: &'static [&'static str],
    pub kind: StrategyKind,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub tags: &'static [&'static str],
}

impl StrategyDescriptor {
    fn answers_to(&self, id: &str) -> bool {
        self.id.as_str() == id || self.aliases.contains(&id)
    }
}

// ─── Parameter schemas ───────────────────────────────────────────────

const RSI_PARAMS: &[ParamSpec] = &[
    ParamSpec::integer("rsi_period", 14.0, 5.0, 30.0)
        .unit("bars")
        .describe("RSI lookback period"),
    ParamSpec::number("rsi_oversold_threshold", 30.0, 10.0, 50.0, 1.0)
        .describe("RSI level below which the instrument counts as oversold"),
];

const MA_CROSS_PARAMS: &[ParamSpec] = &[
    ParamSpec::integer("short_ma_period", 5.0, 3.0, 60.0)
        .unit("bars")
        .describe("Short moving average period"),
    ParamSpec::integer("long_ma_period", 20.0, 10.0, 200.0)
        .unit("bars")
        .describe("Long moving average period; must exceed the short period"),
    ParamSpec::flag("enable_volume_filter", false)
        .describe("Require a volume surge to confirm golden crosses"),
    ParamSpec::integer("volume_avg_days", 10.0, 3.0, 30.0)
        .unit("bars")
        .describe("Days in the average volume baseline (excluding the signal day)"),
    ParamSpec::number("volume_multiple", 1.5, 1.0, 5.0, 0.1)
        .describe("Signal-day volume must exceed this multiple of the baseline"),
];

const FIXED_PROFIT_LOSS_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("take_profit_percent", 20.0, 1.0, 200.0, 1.0)
        .unit("%")
        .describe("Gain over cost that triggers take-profit"),
    ParamSpec::number("stop_loss_percent", -10.0, -100.0, -1.0, 1.0)
        .unit("%")
        .describe("Loss versus cost (negative) that triggers stop-loss"),
];

const VALUE_MOMENTUM_PARAMS: &[ParamSpec] = &[
    ParamSpec::integer("momentum_window_months", 6.0, 1.0, 24.0)
        .unit("months")
        .describe("Momentum lookback, 21 trading days per month"),
    ParamSpec::number("min_momentum_percent", 5.0, -50.0, 200.0, 1.0)
        .unit("%")
        .describe("Minimum price return over the window"),
    ParamSpec::number("roe_threshold_percent", 10.0, 0.0, 50.0, 0.5)
        .unit("%")
        .describe("Minimum return on equity"),
    ParamSpec::number("max_pb_value", 2.5, 0.1, 10.0, 0.1)
        .describe("Maximum price-to-book ratio"),
];

const SIMPLE_VALUE_PARAMS: &[ParamSpec] = &[
    ParamSpec::number("max_pe_ttm", 20.0, 1.0, 100.0, 1.0)
        .describe("Maximum trailing price-to-earnings ratio"),
    ParamSpec::number("max_pb", 2.0, 0.1, 10.0, 0.1).describe("Maximum price-to-book ratio"),
    ParamSpec::number("min_dividend_yield", 2.0, 0.0, 15.0, 0.1)
        .unit("%")
        .describe("Minimum dividend yield"),
    ParamSpec::number("min_total_mv", 50.0, 0.0, 10_000.0, 10.0)
        .unit("hundred million")
        .describe("Minimum total market value"),
    ParamSpec::flag("exclude_st", true).describe("Drop special-treatment (ST) names"),
];

// ─── Registry ────────────────────────────────────────────────────────

static REGISTRY: &[StrategyDescriptor] = &[
    StrategyDescriptor {
        id: StrategyId::RsiOversoldRebound,
        aliases: &[],
        kind: StrategyKind::Timing,
        name: "RSI oversold rebound",
        description: "Flags instruments whose RSI sits below the oversold threshold, \
                      distinguishing a fresh turn-up from still being in the zone.",
        params: RSI_PARAMS,
        tags: &["rsi", "mean-reversion"],
    },
    StrategyDescriptor {
        id: StrategyId::MaCross,
        aliases: &["ma_golden_cross"],
        kind: StrategyKind::Timing,
        name: "Moving average cross",
        description: "Golden and death crosses of a short SMA over a long SMA, \
                      with optional volume confirmation of golden crosses.",
        params: MA_CROSS_PARAMS,
        tags: &["sma", "trend"],
    },
    StrategyDescriptor {
        id: StrategyId::FixedProfitLoss,
        aliases: &[],
        kind: StrategyKind::Exit,
        name: "Fixed take-profit / stop-loss",
        description: "Exits a holding once its price reaches a fixed gain or loss versus cost.",
        params: FIXED_PROFIT_LOSS_PARAMS,
        tags: &["exit", "risk"],
    },
    StrategyDescriptor {
        id: StrategyId::ValueMomentum,
        aliases: &[],
        kind: StrategyKind::Selection,
        name: "Value momentum",
        description: "Low price-to-book, high ROE names with positive price momentum, \
                      ranked by a composite score.",
        params: VALUE_MOMENTUM_PARAMS,
        tags: &["value", "quality", "momentum"],
    },
    StrategyDescriptor {
        id: StrategyId::SimpleValue,
        aliases: &["simple_value_screen"],
        kind: StrategyKind::Selection,
        name: "Simple value screen",
        description: "Cheap, dividend-paying, sizeable names: PE, PB, yield and market value limits.",
        params: SIMPLE_VALUE_PARAMS,
        tags: &["value", "dividend"],
    },
];

/// Find a strategy by id or alias.
pub fn find(id: &str) -> Result<&'static StrategyDescriptor, StrategyError> {
    REGISTRY
        .iter()
        .find(|d| d.answers_to(id))
        .ok_or_else(|| StrategyError::UnknownStrategy(id.to_string()))
}

/// Find a strategy and require it to be of `kind`.
pub fn find_kind(
    id: &str,
    kind: StrategyKind,
) -> Result<&'static StrategyDescriptor, StrategyError> {
    let descriptor = find(id)?;
    if descriptor.kind != kind {
        return Err(StrategyError::WrongKind {
            id: id.to_string(),
            expected: kind,
        });
    }
    Ok(descriptor)
}

/// Registered strategies in registry order, optionally restricted to one kind.
pub fn list(kind: Option<StrategyKind>) -> Vec<&'static StrategyDescriptor> {
    REGISTRY
        .iter()
        .filter(|d| kind.map_or(true, |k| d.kind == k))
        .collect()
}
