//! In-memory source for tests, benchmarks and embedding callers.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;

use super::source::{Adjustment, DataError, TimeSeriesSource};
use crate::domain::{Bar, DailyValuation, FundamentalSnapshot, InstrumentMeta, UniverseFilter};

/// A `TimeSeriesSource` backed by plain collections.
///
/// Codes registered with [`InMemorySource::fail_code`] return
/// `NetworkUnreachable` from every per-code fetch. Universe fetches are
/// counted so cache refresh behaviour can be observed.
#[derive(Debug, Default)]
pub struct InMemorySource {
    instruments: Vec<InstrumentMeta>,
    bars: HashMap<String, Vec<Bar>>,
    fundamentals: HashMap<String, Vec<FundamentalSnapshot>>,
    valuations: Vec<DailyValuation>,
    failing_codes: HashSet<String>,
    fail_universe: bool,
    fail_valuations: bool,
    universe_fetches: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instrument(mut self, meta: InstrumentMeta) -> Self {
        self.instruments.push(meta);
        self
    }

    pub fn with_bars(mut self, code: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.bars.insert(code.into(), bars);
        self
    }

    pub fn with_fundamentals(mut self, snapshot: FundamentalSnapshot) -> Self {
        self.fundamentals
            .entry(snapshot.code.clone())
            .or_default()
            .push(snapshot);
        self
    }

    pub fn with_valuation(mut self, row: DailyValuation) -> Self {
        self.valuations.push(row);
        self
    }

    pub fn fail_code(mut self, code: impl Into<String>) -> Self {
        self.failing_codes.insert(code.into());
        self
    }

    pub fn fail_universe(mut self) -> Self {
        self.fail_universe = true;
        self
    }

    pub fn fail_valuations(mut self) -> Self {
        self.fail_valuations = true;
        self
    }

    /// Number of universe fetches served so far.
    pub fn universe_fetches(&self) -> usize {
        self.universe_fetches.load(Ordering::SeqCst)
    }

    fn check(&self, code: &str) -> Result<(), DataError> {
        if self.failing_codes.contains(code) {
            return Err(DataError::NetworkUnreachable(format!(
                "simulated outage for {code}"
            )));
        }
        Ok(())
    }
}

impl TimeSeriesSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_daily_bars(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjustment: Adjustment,
    ) -> Result<Vec<Bar>, DataError> {
        self.check(code)?;
        Ok(self
            .bars
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_latest_fundamentals(&self, code: &str) -> Result<Vec<FundamentalSnapshot>, DataError> {
        self.check(code)?;
        Ok(self.fundamentals.get(code).cloned().unwrap_or_default())
    }

    fn fetch_instrument_universe(
        &self,
        filter: &UniverseFilter,
    ) -> Result<Vec<InstrumentMeta>, DataError> {
        self.universe_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_universe {
            return Err(DataError::NetworkUnreachable(
                "simulated universe outage".into(),
            ));
        }
        Ok(self
            .instruments
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    fn fetch_daily_valuations(&self, codes: &[String]) -> Result<Vec<DailyValuation>, DataError> {
        if self.fail_valuations {
            return Err(DataError::RateLimited {
                retry_after_secs: 60,
            });
        }
        Ok(self
            .valuations
            .iter()
            .filter(|v| codes.contains(&v.code) && !self.failing_codes.contains(&v.code))
            .cloned()
            .collect())
    }
}
