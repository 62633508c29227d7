//! QuantSignal CLI: strategy listing, timing and exit signals, screening pools.
//!
//! Commands:
//! - `strategies`: list registered strategies and their parameter schemas
//! - `timing`: evaluate a timing strategy for a list of instrument codes
//! - `exit`: check holdings from a CSV file against an exit strategy
//! - `screen`: build a candidate pool from the listed universe
//!
//! Market data is read from a CSV directory (see `quantsignal_core::data::CsvSource`).
//! Reports are printed to stdout as pretty JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use quantsignal_core::data::CsvSource;
use quantsignal_core::domain::Holding;
use quantsignal_core::strategy::{ParamValue, StrategyKind, StrategyParams};
use quantsignal_runner::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "quantsignal",
    about = "QuantSignal CLI: timing, exit and screening signals over daily market data"
)]
struct Cli {
    /// Pipeline config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered strategies.
    Strategies {
        /// Only strategies of this kind: timing, exit or selection.
        #[arg(long, value_parser = parse_kind)]
        kind: Option<StrategyKind>,
    },
    /// Generate timing signals for instrument codes.
    Timing {
        /// Market data directory.
        #[arg(long)]
        data: PathBuf,

        /// Strategy id (e.g. rsi_oversold_rebound, ma_cross).
        #[arg(long)]
        strategy: String,

        /// Strategy parameter override, repeatable (e.g. --param rsi_period=10).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,

        /// Instrument codes (e.g. 600000.SH 000001.SZ).
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Generate exit signals for holdings.
    Exit {
        /// Market data directory.
        #[arg(long)]
        data: PathBuf,

        /// Strategy id (e.g. fixed_profit_loss).
        #[arg(long)]
        strategy: String,

        /// Holdings CSV: id,code,cost_price,quantity,open_date[,note].
        #[arg(long)]
        holdings: PathBuf,

        /// Strategy parameter override, repeatable.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,
    },
    /// Build a screening pool from the listed universe.
    Screen {
        /// Market data directory.
        #[arg(long)]
        data: PathBuf,

        /// Strategy id (e.g. value_momentum, simple_value).
        #[arg(long)]
        strategy: String,

        /// Strategy parameter override, repeatable.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Strategies { kind } => print_json(&Pipeline::list_strategies(kind)),
        Commands::Timing {
            data,
            strategy,
            params,
            codes,
        } => {
            let pipeline = build_pipeline(&data, config)?;
            let report =
                pipeline.generate_timing_signals(&codes, &strategy, &to_params(params), as_of)?;
            log::info!("report fingerprint {}", report.fingerprint()?);
            print_json(&report)
        }
        Commands::Exit {
            data,
            strategy,
            holdings,
            params,
        } => {
            let holdings = read_holdings(&holdings)?;
            let pipeline = build_pipeline(&data, config)?;
            let report =
                pipeline.generate_exit_signals(&holdings, &strategy, &to_params(params), as_of)?;
            log::info!("report fingerprint {}", report.fingerprint()?);
            print_json(&report)
        }
        Commands::Screen {
            data,
            strategy,
            params,
        } => {
            let pipeline = build_pipeline(&data, config)?;
            let report = pipeline.generate_screening_pool(&strategy, &to_params(params), as_of)?;
            log::info!("report fingerprint {}", report.fingerprint()?);
            print_json(&report)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn build_pipeline(data: &Path, config: PipelineConfig) -> Result<Pipeline> {
    if !data.is_dir() {
        bail!("data directory '{}' does not exist", data.display());
    }
    let pipeline = Pipeline::new(Arc::new(CsvSource::new(data)), config);
    if let Err(e) = pipeline.warm_reference() {
        log::warn!("could not load instrument reference data: {e}");
    }
    Ok(pipeline)
}

fn read_holdings(path: &Path) -> Result<Vec<Holding>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open holdings file '{}'", path.display()))?;
    let mut holdings = Vec::new();
    for (i, row) in reader.deserialize::<Holding>().enumerate() {
        // Line 1 is the header.
        let holding = row.with_context(|| format!("holdings line {}", i + 2))?;
        holdings.push(holding);
    }
    Ok(holdings)
}

fn to_params(pairs: Vec<(String, ParamValue)>) -> StrategyParams {
    pairs.into_iter().collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    let value = ParamValue::parse(value)
        .ok_or_else(|| format!("'{value}' is neither a number nor true/false"))?;
    Ok((key.to_string(), value))
}

fn parse_kind(raw: &str) -> Result<StrategyKind, String> {
    StrategyKind::parse(raw).ok_or_else(|| format!("unknown strategy kind '{raw}'"))
}
