use std::collections::HashMap;

use chrono::NaiveDate;

use quantsignal_core::data::Adjustment;
use quantsignal_core::domain::{DailyValuation, Holding, Signal};
use quantsignal_core::exit::{ExitEvaluator, ExitStrategy, Quote};
use quantsignal_core::strategy::StrategyParams;
use quantsignal_core::DataUnavailable;

use super::{window_start, Evaluated, Pipeline, PipelineError};
use crate::report::ExitReport;

impl Pipeline {
    /// Check each holding against an exit strategy using the latest quote on
    /// or before `as_of`.
    pub fn generate_exit_signals(
        &self,
        holdings: &[Holding],
        strategy_id: &str,
        params: &StrategyParams,
        as_of: NaiveDate,
    ) -> Result<ExitReport, PipelineError> {
        if holdings.is_empty() {
            return Err(PipelineError::EmptyHoldings);
        }
        let strategy = ExitStrategy::resolve(strategy_id, params)?;
        let evaluator = strategy.evaluator();
        let id = evaluator.strategy_id();

        log::info!("{id}: checking {} holdings as of {as_of}", holdings.len());

        let mut codes: Vec<String> = holdings.iter().map(|h| h.code.clone()).collect();
        codes.sort();
        codes.dedup();
        let quotes: HashMap<String, DailyValuation> = self
            .latest_valuations(&codes, as_of)
            .unwrap_or_default()
            .into_iter()
            .map(|v| (v.code.clone(), v))
            .collect();

        let results = self.map_instruments(holdings, |holding| {
            (
                holding.code.clone(),
                self.evaluate_exit(holding, evaluator, quotes.get(&holding.code), as_of),
            )
        })?;
        let collected = self.collect_signals(id.as_str(), results);

        log::info!(
            "{id}: {} exit signals, {} skipped",
            collected.signals.len(),
            collected.skipped.len()
        );

        Ok(ExitReport {
            strategy: id.as_str().to_string(),
            signals: collected.signals,
            latest_data_date: collected.latest_data_date,
            skipped: collected.skipped,
        })
    }

    fn evaluate_exit(
        &self,
        holding: &Holding,
        evaluator: &dyn ExitEvaluator,
        valuation: Option<&DailyValuation>,
        as_of: NaiveDate,
    ) -> Evaluated<Signal> {
        let quote = self.current_quote(&holding.code, valuation, as_of)?;
        let signal = evaluator.evaluate(holding, quote)?;
        Ok((signal, Some(quote.date)))
    }

    /// Latest valuation close, else the last bar close within
    /// `quote_lookback_days` of `as_of`.
    fn current_quote(
        &self,
        code: &str,
        valuation: Option<&DailyValuation>,
        as_of: NaiveDate,
    ) -> Result<Quote, DataUnavailable> {
        let usable = |p: f64| p.is_finite() && p > 0.0;
        if let Some(v) = valuation {
            if let Some(price) = v.close.filter(|p| usable(*p)) {
                return Ok(Quote {
                    date: v.trade_date,
                    price,
                });
            }
        }
        let start = window_start(as_of, self.config.pipeline.quote_lookback_days as usize);
        let bars = self
            .source
            .fetch_daily_bars(code, start, as_of, Adjustment::Forward)?;
        bars.iter()
            .rev()
            .find(|b| usable(b.close))
            .map(|b| Quote {
                date: b.date,
                price: b.close,
            })
            .ok_or(DataUnavailable::MissingPrice)
    }
}
