//! Domain types: bars, fundamentals, instruments, holdings, signals, candidates.

pub mod bar;
pub mod candidate;
pub mod fundamentals;
pub mod holding;
pub mod instrument;
pub mod signal;

pub use bar::{Bar, BarError, BarSeries};
pub use candidate::{ScoredCandidate, ScreeningPool, ValueScreenHit};
pub use fundamentals::{latest_snapshot, latest_valuations, DailyValuation, FundamentalSnapshot};
pub use holding::{Holding, ProfitLoss};
pub use instrument::{InstrumentMeta, ListStatus, UniverseFilter};
pub use signal::{Signal, SignalKind};
