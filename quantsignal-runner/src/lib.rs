//! QuantSignal Runner: request orchestration over `quantsignal-core`.
//!
//! This crate provides:
//! - `Pipeline`: timing, exit and screening requests fanned out over a
//!   bounded worker pool, with per-instrument skip semantics
//! - `PipelineConfig`: TOML configuration for worker count, history
//!   padding, screening sample sizes and reference-cache refresh policy
//! - Report types with BLAKE3 content fingerprints

pub mod config;
pub mod pipeline;
pub mod report;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{Pipeline, PipelineError};
pub use report::{ExitReport, Fingerprint, ScreeningReport, SkippedInstrument, TimingReport};
