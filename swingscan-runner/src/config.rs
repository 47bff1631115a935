//! Run settings: TOML loading and boundary validation.
//!
//! The core clamps bad thresholds and carries on; this layer is where a bad
//! file is rejected outright, with the offending key named.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use swingscan_core::thresholds::{field_range, ScreenerConfig};
use thiserror::Error;

/// Errors from loading or validating run settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(String),

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

const TOP_LEVEL_KEYS: &[&str] = &[
    "screener",
    "top_n",
    "parallel",
    "snapshot_dir",
    "benchmark_symbol",
    "volatility_index",
    "fetch",
];
const FETCH_KEYS: &[&str] = &["lock_timeout_ms", "stale_after_ms"];
const MAX_TOP_N: usize = 500;
const MAX_VOLATILITY_INDEX: f64 = 200.0;

/// Market-data fetch lock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    /// How long a caller waits for the lock before giving up.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// A holder older than this is treated as abandoned.
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            stale_after_ms: default_stale_after_ms(),
        }
    }
}

impl FetchSettings {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

fn default_lock_timeout_ms() -> u64 {
    30_000
}

fn default_stale_after_ms() -> u64 {
    120_000
}

fn default_top_n() -> usize {
    25
}

fn default_parallel() -> bool {
    true
}

/// Everything a screening run is configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    /// Threshold overrides, merged over the regime-adjusted reference values.
    #[serde(default)]
    pub screener: ScreenerConfig,

    /// Results kept in the persisted snapshot summary.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Evaluate symbols on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Where snapshot summaries are written; none disables persistence.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,

    /// Universe symbol to use as benchmark when the file carries none.
    #[serde(default)]
    pub benchmark_symbol: Option<String>,

    /// Overrides the benchmark's volatility index reading.
    #[serde(default)]
    pub volatility_index: Option<f64>,

    #[serde(default)]
    pub fetch: FetchSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            screener: ScreenerConfig::default(),
            top_n: default_top_n(),
            parallel: default_parallel(),
            snapshot_dir: None,
            benchmark_symbol: None,
            volatility_index: None,
            fetch: FetchSettings::default(),
        }
    }
}

impl RunSettings {
    /// Load and validate a TOML settings file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML settings. Unknown keys are reported by their
    /// dotted path before any typed parsing happens.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        check_keys(&table)?;
        let settings: RunSettings =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Range-check every present value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.screener.numeric_fields() {
            let Some(value) = value else { continue };
            if let Some((min, max)) = field_range(field) {
                if !(min..=max).contains(&value) {
                    return Err(ConfigError::OutOfRange {
                        field: format!("screener.{field}"),
                        value,
                        min,
                        max,
                    });
                }
            }
        }

        let s = &self.screener;
        if let (Some(lo), Some(hi)) = (s.rsi_min, s.rsi_max) {
            if lo > hi {
                return Err(ConfigError::Invalid(format!(
                    "screener.rsi_min ({lo}) exceeds screener.rsi_max ({hi})"
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (s.mfi_min, s.mfi_max) {
            if lo > hi {
                return Err(ConfigError::Invalid(format!(
                    "screener.mfi_min ({lo}) exceeds screener.mfi_max ({hi})"
                )));
            }
        }

        if self.top_n == 0 || self.top_n > MAX_TOP_N {
            return Err(ConfigError::OutOfRange {
                field: "top_n".into(),
                value: self.top_n as f64,
                min: 1.0,
                max: MAX_TOP_N as f64,
            });
        }
        if let Some(vix) = self.volatility_index {
            if !(0.0..=MAX_VOLATILITY_INDEX).contains(&vix) {
                return Err(ConfigError::OutOfRange {
                    field: "volatility_index".into(),
                    value: vix,
                    min: 0.0,
                    max: MAX_VOLATILITY_INDEX,
                });
            }
        }
        if self.fetch.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid("fetch.lock_timeout_ms must be > 0".into()));
        }
        if self.fetch.stale_after_ms < self.fetch.lock_timeout_ms {
            return Err(ConfigError::Invalid(
                "fetch.stale_after_ms must be >= fetch.lock_timeout_ms".into(),
            ));
        }
        Ok(())
    }
}

fn check_keys(table: &toml::Table) -> Result<(), ConfigError> {
    for (key, value) in table {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::UnknownKey(key.clone()));
        }
        let Some(inner) = value.as_table() else {
            continue;
        };
        let known = |k: &str| match key.as_str() {
            "screener" => field_range(k).is_some() || k == "exclude_surveillance",
            "fetch" => FETCH_KEYS.contains(&k),
            _ => false,
        };
        if let Some(bad) = inner.keys().find(|k| !known(k)) {
            return Err(ConfigError::UnknownKey(format!("{key}.{bad}")));
        }
    }
    Ok(())
}
