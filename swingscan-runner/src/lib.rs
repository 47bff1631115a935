//! SwingScan Runner: the boundary around `swingscan-core`.
//!
//! This crate provides:
//! - Run settings (TOML) with range validation
//! - Universe loading from JSON files and deterministic synthetic universes
//! - A per-credential FIFO fetch lock for market-data requests
//! - Background snapshot persistence that never blocks or fails a screen
//! - JSON, CSV and Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod fetch_lock;
pub mod runner;
pub mod snapshot;

pub use config::{ConfigError, FetchSettings, RunSettings};
pub use data_loader::{
    load_universe, synthetic_universe, FileSource, LoadError, SyntheticSource, Universe,
    UniverseSource,
};
pub use export::{export_json, export_results_csv, generate_report, import_json, write_exports};
pub use fetch_lock::{FetchGuard, FetchLock, FetchLockRegistry, LockError};
pub use runner::{fetch_universe, run_screen, snapshot_sink, RunError, ScreenRun};
pub use snapshot::{persist_detached, JsonFileSink, SnapshotError, SnapshotRecord, SnapshotSink};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn settings_are_send_sync() {
        assert_send::<RunSettings>();
        assert_sync::<RunSettings>();
        assert_send::<FetchSettings>();
        assert_sync::<FetchSettings>();
    }

    #[test]
    fn universe_is_send_sync() {
        assert_send::<Universe>();
        assert_sync::<Universe>();
    }

    #[test]
    fn fetch_lock_is_send_sync() {
        assert_send::<FetchLock>();
        assert_sync::<FetchLock>();
        assert_send::<FetchLockRegistry>();
        assert_sync::<FetchLockRegistry>();
    }

    #[test]
    fn snapshot_types_are_send_sync() {
        assert_send::<SnapshotRecord>();
        assert_sync::<SnapshotRecord>();
        assert_send::<JsonFileSink>();
        assert_sync::<JsonFileSink>();
    }
}
