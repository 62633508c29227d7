//! End-to-end pipeline requests against an in-memory source.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use quantsignal_core::data::InMemorySource;
use quantsignal_core::domain::{
    Bar, DailyValuation, FundamentalSnapshot, Holding, InstrumentMeta, ListStatus, ScreeningPool,
    SignalKind,
};
use quantsignal_core::strategy::{ParamValue, StrategyKind, StrategyParams};
use quantsignal_core::StrategyError;
use quantsignal_runner::{Pipeline, PipelineConfig, PipelineError};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

fn days_before(n: i64) -> NaiveDate {
    as_of() - Duration::days(n)
}

/// One bar per calendar day, the last one on `end`.
fn bars_ending(end: NaiveDate, closes: &[f64]) -> Vec<Bar> {
    let n = closes.len() as i64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: end - Duration::days(n - 1 - i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 80_000.0,
        })
        .collect()
}

fn meta(code: &str, name: &str, status: ListStatus) -> InstrumentMeta {
    InstrumentMeta {
        code: code.into(),
        name: name.into(),
        industry: Some("Industrials".into()),
        list_status: status,
    }
}

fn listed(code: &str) -> InstrumentMeta {
    meta(code, &format!("{code} Holdings"), ListStatus::Listed)
}

fn fundamentals(code: &str, roe: Option<f64>, pb: Option<f64>) -> FundamentalSnapshot {
    FundamentalSnapshot {
        code: code.into(),
        ann_date: Some(NaiveDate::from_ymd_opt(2024, 4, 25).unwrap()),
        end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        roe_yearly: roe,
        roe_waa: None,
        roe: None,
        pb,
    }
}

fn valuation(code: &str, date: NaiveDate, close: Option<f64>) -> DailyValuation {
    DailyValuation {
        code: code.into(),
        trade_date: date,
        close,
        pe_ttm: None,
        pb: None,
        dividend_yield: None,
        total_market_value: None,
    }
}

fn params(pairs: &[(&str, f64)]) -> StrategyParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
        .collect()
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

fn pipeline_with(source: InMemorySource, workers: usize) -> Pipeline {
    let mut config = PipelineConfig::default();
    config.pipeline.max_workers = workers;
    Pipeline::new(Arc::new(source), config)
}

/// Steady decline into oversold territory, bouncing on the final bar.
fn falling_then_bounce() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..12).map(|i| 40.0 - i as f64).collect();
    closes.push(29.6);
    closes
}

fn timing_source() -> InMemorySource {
    InMemorySource::new()
        .with_instrument(listed("DOWN"))
        .with_instrument(listed("FLAT"))
        .with_bars("DOWN", bars_ending(days_before(2), &falling_then_bounce()))
        .with_bars("FLAT", bars_ending(days_before(1), &[10.0; 14]))
        .with_bars("SHORT", bars_ending(as_of(), &[10.0, 9.5, 9.0]))
        .with_bars("GONE", bars_ending(as_of(), &[10.0; 14]))
        .fail_code("GONE")
}

// ─── Timing ──────────────────────────────────────────────────────────

#[test]
fn timing_skips_bad_instruments_and_keeps_the_rest() {
    let pipeline = pipeline_with(timing_source(), 4);
    let report = pipeline
        .generate_timing_signals(
            &codes(&["DOWN", "FLAT", "SHORT", "GONE", "MISSING"]),
            "rsi_oversold_rebound",
            &params(&[("rsi_period", 6.0)]),
            as_of(),
        )
        .unwrap();

    assert_eq!(report.strategy, "rsi_oversold_rebound");
    assert_eq!(report.signals.len(), 1);
    let signal = &report.signals[0];
    assert_eq!(signal.code, "DOWN");
    assert_eq!(signal.kind, SignalKind::OversoldTurnUp);
    assert_eq!(signal.trigger_date, days_before(2));
    assert_eq!(signal.trigger_price, 29.6);
    assert_eq!(signal.name.as_deref(), Some("DOWN Holdings"));
    assert_eq!(signal.industry.as_deref(), Some("Industrials"));

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(skipped, vec!["SHORT", "GONE", "MISSING"]);
    assert!(report.skipped[0].reason.contains("insufficient history"));
    assert!(report.skipped[1].reason.contains("upstream"));

    // FLAT produced no signal but was evaluated, so its date counts; SHORT's
    // newer bars do not, because it was skipped.
    assert_eq!(report.latest_data_date, Some(days_before(1)));
}

#[test]
fn timing_with_no_usable_instrument_has_no_date() {
    let pipeline = pipeline_with(timing_source(), 2);
    let report = pipeline
        .generate_timing_signals(&codes(&["SHORT"]), "rsi_oversold_rebound", &params(&[]), as_of())
        .unwrap();
    assert!(report.signals.is_empty());
    assert_eq!(report.latest_data_date, None);
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn ma_short_not_below_long_rejects_the_request() {
    let pipeline = pipeline_with(timing_source(), 1);
    let err = pipeline
        .generate_timing_signals(
            &codes(&["DOWN"]),
            "ma_cross",
            &params(&[("short_ma_period", 30.0), ("long_ma_period", 20.0)]),
            as_of(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Strategy(StrategyError::Configuration(_))
    ));
}

#[test]
fn unknown_and_mismatched_strategies_reject_the_request() {
    let pipeline = pipeline_with(timing_source(), 1);
    let err = pipeline
        .generate_timing_signals(&codes(&["DOWN"]), "macd_magic", &params(&[]), as_of())
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Strategy(StrategyError::UnknownStrategy(_))
    ));
    assert_eq!(err.to_string(), "strategy not found: macd_magic");

    let err = pipeline
        .generate_timing_signals(&codes(&["DOWN"]), "value_momentum", &params(&[]), as_of())
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Strategy(StrategyError::WrongKind { .. })
    ));

    let err = pipeline
        .generate_screening_pool("nope", &params(&[]), as_of())
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Strategy(StrategyError::UnknownStrategy(_))
    ));
}

#[test]
fn empty_inputs_are_rejected() {
    let pipeline = pipeline_with(timing_source(), 1);
    assert!(matches!(
        pipeline.generate_timing_signals(&[], "ma_cross", &params(&[]), as_of()),
        Err(PipelineError::EmptyInstrumentList)
    ));
    assert!(matches!(
        pipeline.generate_exit_signals(&[], "fixed_profit_loss", &params(&[]), as_of()),
        Err(PipelineError::EmptyHoldings)
    ));
}

#[test]
fn timing_fingerprint_is_independent_of_worker_count() {
    let request = codes(&["DOWN", "FLAT", "SHORT", "GONE"]);
    let run = |workers| {
        pipeline_with(timing_source(), workers)
            .generate_timing_signals(
                &request,
                "rsi_oversold_rebound",
                &params(&[("rsi_period", 6.0)]),
                as_of(),
            )
            .unwrap()
    };
    let sequential = run(1);
    let parallel = run(4);
    assert_eq!(sequential, parallel);
    assert_eq!(
        sequential.fingerprint().unwrap(),
        parallel.fingerprint().unwrap()
    );
}

#[test]
fn warm_reference_avoids_refresh_on_lookup() {
    let source = Arc::new(timing_source());
    let pipeline = Pipeline::new(source.clone(), PipelineConfig::default());
    assert_eq!(pipeline.warm_reference().unwrap(), 2);
    pipeline
        .generate_timing_signals(
            &codes(&["DOWN"]),
            "rsi_oversold_rebound",
            &params(&[("rsi_period", 6.0)]),
            as_of(),
        )
        .unwrap();
    assert_eq!(source.universe_fetches(), 1);
}

// ─── Exit ────────────────────────────────────────────────────────────

fn holding(id: u64, code: &str, cost: f64, quantity: f64) -> Holding {
    Holding {
        id,
        code: code.into(),
        cost_price: cost,
        quantity,
        open_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        note: None,
    }
}

fn exit_source() -> InMemorySource {
    InMemorySource::new()
        .with_instrument(listed("TP"))
        .with_instrument(listed("SL"))
        .with_valuation(valuation("TP", days_before(1), Some(120.0)))
        // After the request date; must be ignored.
        .with_valuation(valuation("TP", as_of() + Duration::days(1), Some(130.0)))
        .with_valuation(valuation("HOLD", days_before(1), Some(105.0)))
        .with_valuation(valuation("BAD", days_before(1), Some(50.0)))
        .with_bars("SL", bars_ending(days_before(2), &[95.0, 92.0, 89.0]))
        .with_bars("STALE", bars_ending(days_before(20), &[10.0, 10.0]))
}

fn exit_holdings() -> Vec<Holding> {
    vec![
        holding(1, "TP", 100.0, 200.0),
        holding(2, "SL", 100.0, 100.0),
        holding(3, "HOLD", 100.0, 300.0),
        holding(4, "STALE", 10.0, 100.0),
        holding(5, "BAD", 40.0, 0.0),
    ]
}

#[test]
fn exit_signals_use_valuation_then_bar_quotes() {
    let pipeline = pipeline_with(exit_source(), 3);
    let report = pipeline
        .generate_exit_signals(&exit_holdings(), "fixed_profit_loss", &params(&[]), as_of())
        .unwrap();

    assert_eq!(report.strategy, "fixed_profit_loss");
    assert_eq!(report.signals.len(), 2);

    let tp = &report.signals[0];
    assert_eq!(tp.kind, SignalKind::TakeProfitFixed);
    assert_eq!(tp.holding_id, Some(1));
    assert_eq!(tp.trigger_price, 120.0);
    assert_eq!(tp.trigger_date, days_before(1));
    assert_eq!(tp.strength, 1.0);
    assert!((tp.indicators["target_price"] - 120.0).abs() < 1e-9);
    assert_eq!(tp.name.as_deref(), Some("TP Holdings"));

    let sl = &report.signals[1];
    assert_eq!(sl.kind, SignalKind::StopLossFixed);
    assert_eq!(sl.holding_id, Some(2));
    assert_eq!(sl.trigger_price, 89.0);
    assert_eq!(sl.trigger_date, days_before(2));

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(skipped, vec!["STALE", "BAD"]);
    assert!(report.skipped[0].reason.contains("no current price"));
    assert!(report.skipped[1].reason.contains("holding 5"));

    assert_eq!(report.latest_data_date, Some(days_before(1)));
}

#[test]
fn exit_falls_back_to_bars_when_valuations_fail() {
    let source = exit_source()
        .with_bars("TP", bars_ending(days_before(3), &[118.0, 121.0]))
        .fail_valuations();
    let report = pipeline_with(source, 1)
        .generate_exit_signals(&exit_holdings()[..1], "fixed_profit_loss", &params(&[]), as_of())
        .unwrap();
    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].trigger_price, 121.0);
    assert_eq!(report.signals[0].trigger_date, days_before(3));
}

#[test]
fn exit_take_profit_boundary() {
    let source = InMemorySource::new()
        .with_valuation(valuation("AT", days_before(1), Some(120.0)))
        .with_valuation(valuation("UNDER", days_before(1), Some(119.99)));
    let report = pipeline_with(source, 1)
        .generate_exit_signals(
            &[holding(1, "AT", 100.0, 10.0), holding(2, "UNDER", 100.0, 10.0)],
            "fixed_profit_loss",
            &params(&[("take_profit_percent", 20.0)]),
            as_of(),
        )
        .unwrap();
    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].code, "AT");
    assert!(report.skipped.is_empty());
}

// ─── Screening ───────────────────────────────────────────────────────

fn screening_source() -> InMemorySource {
    let with_pb = |code: &str, pb: Option<f64>| DailyValuation {
        pb,
        ..valuation(code, days_before(1), Some(10.0))
    };
    InMemorySource::new()
        .with_instrument(listed("A"))
        .with_instrument(listed("B"))
        .with_instrument(listed("C"))
        .with_instrument(listed("D"))
        .with_instrument(listed("E"))
        .with_instrument(listed("F"))
        .with_instrument(meta("G", "Gone Corp", ListStatus::Delisted))
        // A: PB from valuations, all top tiers.
        .with_valuation(with_pb("A", Some(0.9)))
        .with_fundamentals(fundamentals("A", Some(0.22), Some(5.0)))
        .with_bars("A", bars_ending(days_before(1), &[10.0, 11.0, 12.5]))
        // B: no valuation PB, falls back to the snapshot.
        .with_valuation(with_pb("B", None))
        .with_fundamentals(fundamentals("B", Some(0.16), Some(1.2)))
        .with_bars("B", bars_ending(days_before(1), &[10.0, 11.2]))
        // C: PB too high.
        .with_fundamentals(fundamentals("C", Some(0.30), Some(3.0)))
        // D: ROE too low.
        .with_fundamentals(fundamentals("D", Some(0.05), Some(1.0)))
        // E: momentum too weak.
        .with_fundamentals(fundamentals("E", Some(0.12), Some(1.8)))
        .with_bars("E", bars_ending(days_before(1), &[10.0, 10.1]))
        // F: no fundamentals at all.
        .with_bars("F", bars_ending(days_before(1), &[10.0, 20.0]))
        .with_bars("G", bars_ending(days_before(1), &[10.0, 20.0]))
        .with_fundamentals(fundamentals("G", Some(0.40), Some(0.5)))
}

#[test]
fn value_momentum_filters_scores_and_ranks() {
    let report = pipeline_with(screening_source(), 4)
        .generate_screening_pool("value_momentum", &params(&[]), as_of())
        .unwrap();

    assert_eq!(report.strategy, "value_momentum");
    assert_eq!(report.universe_size, 6);
    let ScreeningPool::Ranked(pool) = &report.pool else {
        panic!("expected a ranked pool, got {:?}", report.pool);
    };
    let got: Vec<(&str, u32)> = pool
        .iter()
        .map(|c| (c.code.as_str(), c.composite_score))
        .collect();
    assert_eq!(got, vec![("A", 100), ("B", 70)]);
    assert!((pool[0].momentum - 0.25).abs() < 1e-12);
    assert_eq!(pool[0].pb, 0.9);
    assert_eq!(pool[1].pb, 1.2);

    assert_eq!(report.rejections.pb, 1);
    assert_eq!(report.rejections.roe, 1);
    assert_eq!(report.rejections.momentum, 1);
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(skipped, vec!["F"]);
}

#[test]
fn value_momentum_respects_pool_size_and_sample() {
    let mut config = PipelineConfig::default();
    config.screening.pool_size = 1;
    config.screening.value_momentum_sample = 2;
    let report = Pipeline::new(Arc::new(screening_source()), config)
        .generate_screening_pool("value_momentum", &params(&[]), as_of())
        .unwrap();
    assert_eq!(report.universe_size, 2);
    assert_eq!(report.pool.codes(), vec!["A"]);
}

#[test]
fn screening_is_idempotent() {
    let run = || {
        pipeline_with(screening_source(), 3)
            .generate_screening_pool("value_momentum", &params(&[]), as_of())
            .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn universe_failure_yields_empty_pool() {
    let report = pipeline_with(screening_source().fail_universe(), 2)
        .generate_screening_pool("value_momentum", &params(&[]), as_of())
        .unwrap();
    assert!(report.pool.is_empty());
    assert!(matches!(report.pool, ScreeningPool::Ranked(_)));
    assert_eq!(report.universe_size, 0);
}

fn simple_value_source() -> InMemorySource {
    let full = |code: &str, pe: f64, pb: f64, dy: f64, mv: f64| DailyValuation {
        pe_ttm: Some(pe),
        pb: Some(pb),
        dividend_yield: Some(dy),
        total_market_value: Some(mv),
        ..valuation(code, days_before(1), Some(8.0))
    };
    InMemorySource::new()
        .with_instrument(listed("H"))
        .with_instrument(meta("S", "ST Widget", ListStatus::Listed))
        .with_instrument(listed("I"))
        .with_instrument(listed("J"))
        .with_instrument(meta("K", "Industrial Bank", ListStatus::Listed))
        .with_valuation(full("H", 10.0, 1.0, 0.03, 120.0))
        .with_valuation(full("S", 10.0, 1.0, 0.03, 120.0))
        .with_valuation(full("J", -5.0, 1.0, 0.03, 120.0))
        .with_valuation(full("K", 19.0, 1.9, 0.021, 51.0))
}

#[test]
fn simple_value_requires_every_condition() {
    let report = pipeline_with(simple_value_source(), 2)
        .generate_screening_pool("simple_value_screen", &params(&[]), as_of())
        .unwrap();
    assert_eq!(report.strategy, "simple_value");
    assert!(matches!(report.pool, ScreeningPool::Filtered(_)));
    // "Industrial Bank" contains "st" but is not special treatment.
    assert_eq!(report.pool.codes(), vec!["H", "K"]);
    assert_eq!(report.rejections.special_treatment, 1);
    assert_eq!(report.rejections.valuation, 2);
    assert_eq!(report.universe_size, 5);
}

#[test]
fn simple_value_without_valuations_is_empty() {
    let report = pipeline_with(simple_value_source().fail_valuations(), 2)
        .generate_screening_pool("simple_value", &params(&[]), as_of())
        .unwrap();
    assert!(report.pool.is_empty());
    assert!(matches!(report.pool, ScreeningPool::Filtered(_)));
}

// ─── Registry and config ─────────────────────────────────────────────

#[test]
fn list_strategies_by_kind() {
    let timing: Vec<&str> = Pipeline::list_strategies(Some(StrategyKind::Timing))
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(timing, vec!["rsi_oversold_rebound", "ma_cross"]);
    assert_eq!(Pipeline::list_strategies(None).len(), 5);
}

#[test]
fn config_file_drives_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    std::fs::write(
        &path,
        "[pipeline]\nmax_workers = 1\nrsi_padding_days = 0\n\n[reference]\nmin_refresh_interval_secs = 0\n",
    )
    .unwrap();
    let config = PipelineConfig::load(&path).unwrap();
    assert_eq!(config.pipeline.max_workers, 1);

    // Without padding a 6-bar RSI only looks 6 calendar days back: 5 bars for DOWN.
    let pipeline = Pipeline::new(Arc::new(timing_source()), config);
    let report = pipeline
        .generate_timing_signals(
            &codes(&["DOWN"]),
            "rsi_oversold_rebound",
            &params(&[("rsi_period", 6.0)]),
            as_of(),
        )
        .unwrap();
    assert!(report.signals.is_empty());
    assert_eq!(report.skipped.len(), 1);
}
