//! SwingScan Core: momentum screening over a universe of equities.
//!
//! This crate contains the pure part of the screener:
//! - Domain inputs (daily bars, stock snapshots, benchmark)
//! - Indicator library and the per-symbol indicator snapshot
//! - Market regime detection from the benchmark index
//! - Adaptive threshold resolution (reference values, regime, overrides)
//! - Sector rotation ranking with score bonus/penalty
//! - Six-phase pipeline, scoring and signal classification
//! - Result aggregation (funnel, signal counts, snapshot summary)
//!
//! Nothing here performs I/O or keeps state between runs.

pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod regime;
pub mod result;
pub mod sector;
pub mod thresholds;

pub use pipeline::{screen_universe, ScreenRequest, Screener, Signal};
pub use regime::{MarketRegime, MarketRegimeInfo};
pub use result::{ScreenOutcome, ScreenerResult, SnapshotSummary};
pub use thresholds::{AdaptiveThresholds, ScreenerConfig};
