//! CSV directory source.
//!
//! Layout under the root directory:
//!
//! ```text
//! instruments.csv     code,name,industry,list_status
//! bars/{code}.csv     date,open,high,low,close,volume
//! fundamentals.csv    code,ann_date,end_date,roe_yearly,roe_waa,roe,pb
//! valuations.csv      code,trade_date,close,pe_ttm,pb,dividend_yield,total_mv
//! ```
//!
//! A missing file means "no data". Stored bars are assumed already adjusted.
//! `fundamentals.csv` is parsed once per source and indexed by code.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use serde::Deserialize;

use super::source::{Adjustment, DataError, TimeSeriesSource};
use crate::domain::{
    Bar, DailyValuation, FundamentalSnapshot, InstrumentMeta, ListStatus, UniverseFilter,
};

#[derive(Debug, Deserialize)]
struct InstrumentRow {
    code: String,
    name: String,
    #[serde(default)]
    industry: Option<String>,
    list_status: String,
}

#[derive(Debug, Deserialize)]
struct BarRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct FundamentalRow {
    code: String,
    #[serde(default)]
    ann_date: Option<NaiveDate>,
    end_date: NaiveDate,
    #[serde(default)]
    roe_yearly: Option<f64>,
    #[serde(default)]
    roe_waa: Option<f64>,
    #[serde(default)]
    roe: Option<f64>,
    #[serde(default)]
    pb: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ValuationRow {
    code: String,
    trade_date: NaiveDate,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    pe_ttm: Option<f64>,
    #[serde(default)]
    pb: Option<f64>,
    #[serde(default)]
    dividend_yield: Option<f64>,
    #[serde(default)]
    total_mv: Option<f64>,
}

type FundamentalIndex = HashMap<String, Vec<FundamentalSnapshot>>;

/// Reads market data from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvSource {
    root: PathBuf,
    fundamentals: OnceLock<FundamentalIndex>,
}

impl CsvSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fundamentals: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bars_path(&self, code: &str) -> PathBuf {
        self.root.join("bars").join(format!("{code}.csv"))
    }

    /// Deserialize every row of `path`, or nothing if the file does not exist.
    fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, DataError> {
        if !path.exists() {
            log::debug!("{} not present, treating as empty", path.display());
            return Ok(Vec::new());
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut rows = Vec::new();
        for record in rdr.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    /// Snapshots grouped by code. A failed read is not cached.
    fn fundamentals_index(&self) -> Result<&FundamentalIndex, DataError> {
        if let Some(index) = self.fundamentals.get() {
            return Ok(index);
        }
        let rows: Vec<FundamentalRow> = Self::read_rows(&self.root.join("fundamentals.csv"))?;
        let mut index = FundamentalIndex::new();
        for r in rows {
            index
                .entry(r.code.clone())
                .or_default()
                .push(FundamentalSnapshot {
                    code: r.code,
                    ann_date: r.ann_date,
                    end_date: r.end_date,
                    roe_yearly: r.roe_yearly,
                    roe_waa: r.roe_waa,
                    roe: r.roe,
                    pb: r.pb,
                });
        }
        log::debug!("indexed fundamentals for {} codes", index.len());
        Ok(self.fundamentals.get_or_init(|| index))
    }
}

impl TimeSeriesSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_daily_bars(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjustment: Adjustment,
    ) -> Result<Vec<Bar>, DataError> {
        let rows: Vec<BarRow> = Self::read_rows(&self.bars_path(code))?;
        let mut bars: Vec<Bar> = rows
            .into_iter()
            .filter(|r| r.date >= start && r.date <= end)
            .map(|r| Bar {
                date: r.date,
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
            })
            .collect();
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn fetch_latest_fundamentals(&self, code: &str) -> Result<Vec<FundamentalSnapshot>, DataError> {
        Ok(self
            .fundamentals_index()?
            .get(code)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_instrument_universe(
        &self,
        filter: &UniverseFilter,
    ) -> Result<Vec<InstrumentMeta>, DataError> {
        let rows: Vec<InstrumentRow> = Self::read_rows(&self.root.join("instruments.csv"))?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let list_status = ListStatus::from_code(&row.list_status).ok_or_else(|| {
                DataError::Parse(format!(
                    "unknown list_status '{}' for {}",
                    row.list_status, row.code
                ))
            })?;
            let meta = InstrumentMeta {
                code: row.code,
                name: row.name,
                industry: row.industry.filter(|s| !s.is_empty()),
                list_status,
            };
            if filter.matches(&meta) {
                out.push(meta);
            }
        }
        Ok(out)
    }

    fn fetch_daily_valuations(&self, codes: &[String]) -> Result<Vec<DailyValuation>, DataError> {
        let wanted: HashSet<&str> = codes.iter().map(String::as_str).collect();
        let rows: Vec<ValuationRow> = Self::read_rows(&self.root.join("valuations.csv"))?;
        Ok(rows
            .into_iter()
            .filter(|r| wanted.contains(r.code.as_str()))
            .map(|r| DailyValuation {
                code: r.code,
                trade_date: r.trade_date,
                close: r.close,
                pe_ttm: r.pe_ttm,
                pb: r.pb,
                dividend_yield: r.dividend_yield,
                total_market_value: r.total_mv,
            })
            .collect())
    }
}
