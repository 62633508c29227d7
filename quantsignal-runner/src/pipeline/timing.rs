use chrono::NaiveDate;

use quantsignal_core::data::Adjustment;
use quantsignal_core::domain::{BarSeries, Signal};
use quantsignal_core::strategy::StrategyParams;
use quantsignal_core::timing::{SignalEvaluator, TimingStrategy};

use super::{window_start, Evaluated, Pipeline, PipelineError};
use crate::report::TimingReport;

impl Pipeline {
    /// Evaluate a timing strategy for each code as of `as_of`.
    ///
    /// Fails only on an empty code list or an unresolvable strategy.
    pub fn generate_timing_signals(
        &self,
        codes: &[String],
        strategy_id: &str,
        params: &StrategyParams,
        as_of: NaiveDate,
    ) -> Result<TimingReport, PipelineError> {
        if codes.is_empty() {
            return Err(PipelineError::EmptyInstrumentList);
        }
        let strategy = TimingStrategy::resolve(strategy_id, params)?;
        let evaluator = strategy.evaluator();
        let start = window_start(as_of, self.timing_window_days(&strategy));
        let id = evaluator.strategy_id();

        log::info!(
            "{id}: evaluating {} instruments over {start}..={as_of}",
            codes.len()
        );

        let results = self.map_instruments(codes, |code| {
            (code.clone(), self.evaluate_timing(code, evaluator, start, as_of))
        })?;
        let collected = self.collect_signals(id.as_str(), results);

        log::info!(
            "{id}: {} signals, {} skipped, latest data {}",
            collected.signals.len(),
            collected.skipped.len(),
            collected
                .latest_data_date
                .map_or_else(|| "n/a".to_string(), |d| d.to_string())
        );

        Ok(TimingReport {
            strategy: id.as_str().to_string(),
            signals: collected.signals,
            latest_data_date: collected.latest_data_date,
            skipped: collected.skipped,
        })
    }

    /// Calendar days of history to request: the indicator window plus padding
    /// for weekends and holidays.
    fn timing_window_days(&self, strategy: &TimingStrategy) -> usize {
        let settings = &self.config.pipeline;
        let padding = match strategy {
            TimingStrategy::RsiRebound(_) => settings.rsi_padding_days,
            TimingStrategy::MaCross(_) => settings.ma_padding_days,
        };
        strategy.evaluator().history_bars() + padding as usize
    }

    fn evaluate_timing(
        &self,
        code: &str,
        evaluator: &dyn SignalEvaluator,
        start: NaiveDate,
        as_of: NaiveDate,
    ) -> Evaluated<Signal> {
        let bars = self
            .source
            .fetch_daily_bars(code, start, as_of, Adjustment::Forward)?;
        let series = BarSeries::new(code, bars)?;
        let signal = evaluator.evaluate(&series)?;
        Ok((signal, series.latest_date()))
    }
}
