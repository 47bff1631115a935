//! Screen runner: wires universe, settings and persistence around the core
//! pipeline.
//!
//! Two entry points:
//! - `fetch_universe()`: pulls a universe from a source under its fetch lock.
//! - `run_screen()`: regime, thresholds, sectors and screening for a loaded
//!   universe, then hands the summary to a snapshot sink off-thread.

use std::sync::Arc;
use std::thread::JoinHandle;

use swingscan_core::{
    screen_universe, AdaptiveThresholds, ScreenOutcome, ScreenRequest, SnapshotSummary,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, FetchSettings, RunSettings};
use crate::data_loader::{LoadError, Universe, UniverseSource};
use crate::fetch_lock::{FetchLockRegistry, LockError};
use crate::snapshot::{persist_detached, JsonFileSink, SnapshotRecord, SnapshotSink};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("fetch lock error: {0}")]
    Lock(#[from] LockError),
}

/// A finished screen plus the pending snapshot write, if any.
#[derive(Debug)]
pub struct ScreenRun {
    pub outcome: ScreenOutcome,
    pub snapshot: Option<JoinHandle<()>>,
}

impl ScreenRun {
    /// Block until the background snapshot write finishes.
    pub fn wait_for_snapshot(&mut self) {
        if let Some(handle) = self.snapshot.take() {
            if handle.join().is_err() {
                warn!("snapshot writer panicked");
            }
        }
    }
}

/// Fetch a universe while holding the source credential's fetch lock.
pub fn fetch_universe(
    source: &dyn UniverseSource,
    locks: &FetchLockRegistry,
    fetch: &FetchSettings,
) -> Result<Universe, RunError> {
    let lock = locks.lock_for(source.credential());
    let universe = lock.with_lock(fetch.lock_timeout(), || source.fetch())??;
    Ok(universe)
}

/// The sink configured by `settings.snapshot_dir`, if any.
pub fn snapshot_sink(settings: &RunSettings) -> Option<Arc<dyn SnapshotSink>> {
    settings
        .snapshot_dir
        .as_ref()
        .map(|dir| Arc::new(JsonFileSink::new(dir.clone())) as Arc<dyn SnapshotSink>)
}

/// Screen a loaded universe.
///
/// The benchmark comes from the universe file, else from the member named by
/// `settings.benchmark_symbol`; without one the regime is neutral sideways.
/// `settings.volatility_index` overrides the benchmark's own reading.
pub fn run_screen(
    universe: &Universe,
    settings: &RunSettings,
    sink: Option<Arc<dyn SnapshotSink>>,
) -> Result<ScreenRun, RunError> {
    settings.validate()?;

    let mut benchmark = universe.resolve_benchmark(settings.benchmark_symbol.as_deref());
    match benchmark.as_mut() {
        Some(b) => {
            if let Some(vix) = settings.volatility_index {
                b.volatility_index = Some(vix);
            }
        }
        None => warn!("no benchmark available, regime falls back to sideways"),
    }

    let request = ScreenRequest {
        benchmark: benchmark.as_ref(),
        config: Some(&settings.screener),
        parallel: settings.parallel,
        ..ScreenRequest::new(&universe.stocks)
    };
    let outcome = screen_universe(request, &AdaptiveThresholds::reference());

    let snapshot = sink.and_then(|sink| {
        let summary = SnapshotSummary::from_outcome(&outcome, settings.top_n);
        info!(digest = %summary.digest, top = summary.top.len(), "persisting snapshot");
        persist_detached(sink, SnapshotRecord::new(summary))
    });

    Ok(ScreenRun { outcome, snapshot })
}
