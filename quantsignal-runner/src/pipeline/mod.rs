//! Pipeline orchestrator: resolve a strategy, fan out per instrument on a
//! bounded worker pool, fold the outcomes into a report.
//!
//! Per-instrument failures never abort a request. Each instrument yields
//! `Ok(Some(_))` (a result), `Ok(None)` (evaluated, nothing to report) or
//! `Err(DataUnavailable)` (skipped, logged and listed in the report). Only
//! strategy resolution and input validation fail the whole request.

mod exit;
mod screening;
mod timing;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use thiserror::Error;

use quantsignal_core::data::{DataError, ReferenceCache, TimeSeriesSource};
use quantsignal_core::domain::{DailyValuation, Signal};
use quantsignal_core::strategy::{self, StrategyDescriptor, StrategyKind};
use quantsignal_core::{DataUnavailable, StrategyError};

use crate::config::PipelineConfig;
use crate::report::SkippedInstrument;

/// Request-level failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("instrument list is empty")]
    EmptyInstrumentList,

    #[error("holdings list is empty")]
    EmptyHoldings,

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of one instrument: the evaluation outcome plus the freshest data
/// date it was computed from.
pub(crate) type Evaluated<T> = Result<(Option<T>, Option<NaiveDate>), DataUnavailable>;

/// Orchestrates timing, exit and screening requests against one source.
///
/// The reference cache is the only state that outlives a request.
pub struct Pipeline {
    source: Arc<dyn TimeSeriesSource>,
    reference: ReferenceCache,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(source: Arc<dyn TimeSeriesSource>, config: PipelineConfig) -> Self {
        let reference = ReferenceCache::new(config.reference.min_refresh_interval());
        Self {
            source,
            reference,
            config,
        }
    }

    /// Load the reference cache up front. Without this the first lookup miss loads it.
    pub fn warm_reference(&self) -> Result<usize, DataError> {
        self.reference.load(self.source.as_ref())
    }

    pub fn source(&self) -> &dyn TimeSeriesSource {
        self.source.as_ref()
    }

    pub fn reference(&self) -> &ReferenceCache {
        &self.reference
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Registered strategies, optionally restricted to one kind.
    pub fn list_strategies(kind: Option<StrategyKind>) -> Vec<&'static StrategyDescriptor> {
        strategy::list(kind)
    }

    /// Map `f` over `items` on a pool of at most `max_workers` threads.
    ///
    /// Output order matches input order regardless of scheduling.
    fn map_instruments<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>, PipelineError>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let workers = self.config.pipeline.max_workers.min(items.len());
        if workers <= 1 {
            return Ok(items.iter().map(f).collect());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        Ok(pool.install(|| items.par_iter().map(&f).collect()))
    }

    /// Fold per-instrument signal outcomes: enrich signals from reference
    /// data, track the freshest date, record skips.
    fn collect_signals(
        &self,
        strategy_id: &str,
        results: Vec<(String, Evaluated<Signal>)>,
    ) -> Collected {
        let mut collected = Collected::default();
        for (label, result) in results {
            match result {
                Ok((signal, date)) => {
                    if date > collected.latest_data_date {
                        collected.latest_data_date = date;
                    }
                    if let Some(signal) = signal {
                        collected.signals.push(self.enrich(signal));
                    }
                }
                Err(reason) => {
                    log::warn!("{strategy_id}: skipping {label}: {reason}");
                    collected.skipped.push(SkippedInstrument {
                        code: label,
                        reason: reason.to_string(),
                    });
                }
            }
        }
        collected
    }

    fn enrich(&self, signal: Signal) -> Signal {
        match self
            .reference
            .lookup_or_refresh(&signal.code, self.source.as_ref())
        {
            Some(meta) => signal.enrich(Some(meta.name), meta.industry),
            None => signal,
        }
    }

    /// Latest valuation per code with `trade_date <= as_of`. A failed batch is
    /// logged and treated as no rows.
    fn latest_valuations(&self, codes: &[String], as_of: NaiveDate) -> Option<Vec<DailyValuation>> {
        match self.source.fetch_daily_valuations(codes) {
            Ok(rows) => Some(quantsignal_core::domain::latest_valuations(
                rows.into_iter().filter(|r| r.trade_date <= as_of).collect(),
            )),
            Err(e) => {
                log::warn!(
                    "valuation batch for {} codes failed on {}: {e}",
                    codes.len(),
                    self.source.name()
                );
                None
            }
        }
    }
}

/// Inclusive calendar window ending at `as_of`.
pub(crate) fn window_start(as_of: NaiveDate, days: usize) -> NaiveDate {
    as_of - Duration::days(days as i64)
}

#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub signals: Vec<Signal>,
    pub latest_data_date: Option<NaiveDate>,
    pub skipped: Vec<SkippedInstrument>,
}
