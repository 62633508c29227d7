use std::collections::HashMap;

use chrono::NaiveDate;

use quantsignal_core::data::Adjustment;
use quantsignal_core::domain::{
    latest_snapshot, BarSeries, DailyValuation, InstrumentMeta, ScoredCandidate, ScreeningPool,
    UniverseFilter,
};
use quantsignal_core::screening::{
    rank, RejectionCounts, ScreeningStrategy, Screened, SimpleValue, ValueMomentum,
};
use quantsignal_core::strategy::{StrategyId, StrategyParams};
use quantsignal_core::DataUnavailable;

use super::{window_start, Pipeline, PipelineError};
use crate::report::{ScreeningReport, SkippedInstrument};

impl Pipeline {
    /// Screen a sample of the listed universe and return the candidate pool.
    ///
    /// A failed or empty universe fetch yields an empty pool, not an error.
    pub fn generate_screening_pool(
        &self,
        strategy_id: &str,
        params: &StrategyParams,
        as_of: NaiveDate,
    ) -> Result<ScreeningReport, PipelineError> {
        match ScreeningStrategy::resolve(strategy_id, params)? {
            ScreeningStrategy::ValueMomentum(vm) => self.screen_value_momentum(&vm, as_of),
            ScreeningStrategy::SimpleValue(sv) => Ok(self.screen_simple_value(&sv, as_of)),
        }
    }

    /// First `sample` listed instruments in source order, or `None` when the
    /// universe is unavailable.
    fn sampled_universe(&self, id: StrategyId, sample: usize) -> Option<Vec<InstrumentMeta>> {
        match self
            .source
            .fetch_instrument_universe(&UniverseFilter::listed())
        {
            Ok(universe) if universe.is_empty() => {
                log::error!("{id}: universe from {} is empty, pool will be empty", self.source.name());
                None
            }
            Ok(universe) => Some(universe.into_iter().take(sample).collect()),
            Err(e) => {
                log::error!(
                    "{id}: universe fetch from {} failed, pool will be empty: {e}",
                    self.source.name()
                );
                None
            }
        }
    }

    fn screen_value_momentum(
        &self,
        vm: &ValueMomentum,
        as_of: NaiveDate,
    ) -> Result<ScreeningReport, PipelineError> {
        let id = StrategyId::ValueMomentum;
        let settings = &self.config.screening;
        let Some(universe) = self.sampled_universe(id, settings.value_momentum_sample) else {
            return Ok(ScreeningReport::empty(id.as_str(), ScreeningPool::Ranked(Vec::new())));
        };

        let codes: Vec<String> = universe.iter().map(|m| m.code.clone()).collect();
        let valuations: HashMap<String, DailyValuation> = self
            .latest_valuations(&codes, as_of)
            .unwrap_or_default()
            .into_iter()
            .map(|v| (v.code.clone(), v))
            .collect();
        let start = window_start(as_of, vm.history_calendar_days().max(0) as usize);

        log::info!(
            "{id}: screening {} instruments (window {} months, momentum bars from {start})",
            universe.len(),
            vm.window_months()
        );

        let results = self.map_instruments(&universe, |meta| {
            self.value_momentum_one(vm, meta, valuations.get(&meta.code), start, as_of)
        })?;

        let mut rejections = RejectionCounts::default();
        let mut skipped = Vec::new();
        let mut survivors = Vec::new();
        for (meta, result) in universe.iter().zip(results) {
            match result {
                Ok(Screened::Selected(candidate)) => survivors.push(candidate),
                Ok(Screened::Rejected(verdict)) => {
                    log::debug!("{id}: {} {verdict:?}", meta.code);
                    rejections.record(verdict);
                }
                Err(reason) => {
                    log::warn!("{id}: skipping {}: {reason}", meta.code);
                    skipped.push(SkippedInstrument {
                        code: meta.code.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        let survivor_count = survivors.len();
        let pool = rank(survivors, settings.pool_size);
        log::info!(
            "{id}: {survivor_count} survivors, pool of {}, rejected pb={} roe={} momentum={}, {} skipped",
            pool.len(),
            rejections.pb,
            rejections.roe,
            rejections.momentum,
            skipped.len()
        );

        Ok(ScreeningReport {
            strategy: id.as_str().to_string(),
            pool: ScreeningPool::Ranked(pool),
            rejections,
            universe_size: universe.len(),
            skipped,
        })
    }

    /// PB and ROE first; bars are only fetched for instruments that pass both.
    fn value_momentum_one(
        &self,
        vm: &ValueMomentum,
        meta: &InstrumentMeta,
        valuation: Option<&DailyValuation>,
        start: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Screened<ScoredCandidate>, DataUnavailable> {
        let snapshots = self.source.fetch_latest_fundamentals(&meta.code)?;
        let Some(snapshot) = latest_snapshot(&snapshots) else {
            return Err(DataUnavailable::MissingFundamentals);
        };
        let roe = snapshot.resolved_roe();
        let pb = valuation
            .and_then(|v| v.pb)
            .filter(|pb| pb.is_finite())
            .or_else(|| snapshot.resolved_pb());

        let verdict = vm.screen_fundamentals(pb, roe);
        if !verdict.is_passed() {
            return Ok(Screened::Rejected(verdict));
        }

        let bars = self
            .source
            .fetch_daily_bars(&meta.code, start, as_of, Adjustment::Forward)?;
        let series = BarSeries::new(meta.code.as_str(), bars)?;
        log::debug!(
            "{}: pb={pb:?} roe={roe:?} over {} bars",
            meta.code,
            series.len()
        );
        Ok(vm.screen(meta, pb, roe, || series.closes()))
    }

    fn screen_simple_value(&self, sv: &SimpleValue, as_of: NaiveDate) -> ScreeningReport {
        let id = StrategyId::SimpleValue;
        let empty = || ScreeningReport::empty(id.as_str(), ScreeningPool::Filtered(Vec::new()));
        let Some(universe) = self.sampled_universe(id, self.config.screening.simple_value_sample)
        else {
            return empty();
        };

        let codes: Vec<String> = universe.iter().map(|m| m.code.clone()).collect();
        let Some(rows) = self.latest_valuations(&codes, as_of) else {
            log::error!("{id}: no valuation data, pool will be empty");
            return empty();
        };
        let by_code: HashMap<&str, &DailyValuation> =
            rows.iter().map(|v| (v.code.as_str(), v)).collect();

        log::info!(
            "{id}: screening {} instruments, {} with valuations (exclude ST: {})",
            universe.len(),
            by_code.len(),
            sv.exclude_st()
        );

        let mut rejections = RejectionCounts::default();
        let mut hits = Vec::new();
        for meta in &universe {
            match sv.screen(meta, by_code.get(meta.code.as_str()).copied()) {
                Screened::Selected(hit) => hits.push(hit),
                Screened::Rejected(verdict) => rejections.record(verdict),
            }
        }

        log::info!("{id}: {} hits, {} rejected", hits.len(), rejections.total());

        ScreeningReport {
            strategy: id.as_str().to_string(),
            pool: ScreeningPool::Filtered(hits),
            rejections,
            universe_size: universe.len(),
            skipped: Vec::new(),
        }
    }
}
