//! Static instrument reference data.

use serde::{Deserialize, Serialize};

/// Listing status as reported by the reference-data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Listed,
    Delisted,
    Suspended,
}

impl ListStatus {
    /// Parse the single-letter codes used by exchange listings (L/D/P).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "L" | "listed" => Some(Self::Listed),
            "D" | "delisted" => Some(Self::Delisted),
            "P" | "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// Instrument metadata: code, display name, industry classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMeta {
    pub code: String,
    pub name: String,
    pub industry: Option<String>,
    pub list_status: ListStatus,
}

impl InstrumentMeta {
    /// Special-treatment names carry an "ST" marker (e.g. "ST Foo", "*ST Bar",
    /// "ST康美"): either as the name's prefix or as a standalone word.
    /// Matching is case-sensitive and ignores "ST" inside ordinary words.
    pub fn is_special_treatment(&self) -> bool {
        let name = self.name.trim_start();
        let unstarred = name.strip_prefix('*').unwrap_or(name);
        if let Some(rest) = unstarred.strip_prefix("ST") {
            if rest.chars().next().map_or(true, |c| !c.is_ascii_alphanumeric()) {
                return true;
            }
        }
        name.split_whitespace().any(|word| word == "ST" || word == "*ST")
    }
}

/// Selection criteria for a universe fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseFilter {
    /// Restrict to this listing status; `None` returns everything.
    pub list_status: Option<ListStatus>,
    /// Restrict to one industry.
    pub industry: Option<String>,
}

impl UniverseFilter {
    pub fn listed() -> Self {
        Self {
            list_status: Some(ListStatus::Listed),
            industry: None,
        }
    }

    pub fn matches(&self, meta: &InstrumentMeta) -> bool {
        self.list_status.map_or(true, |s| s == meta.list_status)
            && self
                .industry
                .as_deref()
                .map_or(true, |i| meta.industry.as_deref() == Some(i))
    }
}
