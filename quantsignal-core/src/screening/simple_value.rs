//! Simple value screen: PE-TTM, PB, dividend yield and market value limits,
//! all required. No scoring; hits keep universe order.

use super::{ScreenVerdict, Screened};
use crate::domain::{DailyValuation, InstrumentMeta, ValueScreenHit};

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleValue {
    max_pe_ttm: f64,
    max_pb: f64,
    /// Fraction.
    min_dividend_yield: f64,
    /// Hundred-million units.
    min_total_mv: f64,
    exclude_st: bool,
}

impl SimpleValue {
    /// `min_dividend_yield_pct` is a percentage (2.0 = 2%).
    pub fn from_percent(
        max_pe_ttm: f64,
        max_pb: f64,
        min_dividend_yield_pct: f64,
        min_total_mv: f64,
        exclude_st: bool,
    ) -> Self {
        Self {
            max_pe_ttm,
            max_pb,
            min_dividend_yield: min_dividend_yield_pct / 100.0,
            min_total_mv,
            exclude_st,
        }
    }

    pub fn exclude_st(&self) -> bool {
        self.exclude_st
    }

    /// Check one instrument against its latest valuation row.
    pub fn screen(
        &self,
        meta: &InstrumentMeta,
        valuation: Option<&DailyValuation>,
    ) -> Screened<ValueScreenHit> {
        if self.exclude_st && meta.is_special_treatment() {
            return Screened::Rejected(ScreenVerdict::FilteredBySpecialTreatment);
        }
        let Some(v) = valuation else {
            return Screened::Rejected(ScreenVerdict::FilteredByValuation);
        };
        let positive_within = |x: Option<f64>, max: f64| x.filter(|x| *x > 0.0 && *x <= max);
        let at_least = |x: Option<f64>, min: f64| x.filter(|x| *x >= min);

        match (
            positive_within(v.pe_ttm, self.max_pe_ttm),
            positive_within(v.pb, self.max_pb),
            at_least(v.dividend_yield, self.min_dividend_yield),
            at_least(v.total_market_value, self.min_total_mv),
        ) {
            (Some(pe_ttm), Some(pb), Some(dividend_yield), Some(total_market_value)) => {
                Screened::Selected(ValueScreenHit {
                    code: meta.code.clone(),
                    name: Some(meta.name.clone()),
                    industry: meta.industry.clone(),
                    pe_ttm,
                    pb,
                    dividend_yield,
                    total_market_value,
                })
            }
            _ => Screened::Rejected(ScreenVerdict::FilteredByValuation),
        }
    }
}
