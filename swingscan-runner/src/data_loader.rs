//! Universe loading: JSON files and deterministic synthetic universes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use swingscan_core::domain::{Bar, Benchmark, StockSnapshot, Surveillance};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read universe '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid universe file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate symbol '{0}' in universe")]
    DuplicateSymbol(String),
}

/// Symbols to screen plus an optional benchmark index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub benchmark: Option<Benchmark>,
    pub stocks: Vec<StockSnapshot>,
}

impl Universe {
    /// Parse a universe from JSON and normalize bar order.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, LoadError> {
        let mut universe: Universe =
            serde_json::from_str(json).map_err(|source| LoadError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;

        let mut seen = HashSet::new();
        for stock in &universe.stocks {
            if !seen.insert(stock.symbol.as_str()) {
                return Err(LoadError::DuplicateSymbol(stock.symbol.clone()));
            }
        }

        for stock in &mut universe.stocks {
            normalize_bars(&stock.symbol, &mut stock.bars);
        }
        if let Some(b) = universe.benchmark.as_mut() {
            normalize_bars(&b.symbol, &mut b.bars);
        }
        Ok(universe)
    }

    /// Benchmark from the file, else the named universe member.
    pub fn resolve_benchmark(&self, fallback_symbol: Option<&str>) -> Option<Benchmark> {
        if let Some(b) = &self.benchmark {
            return Some(b.clone());
        }
        let symbol = fallback_symbol?;
        let stock = self.stocks.iter().find(|s| s.symbol == symbol)?;
        Some(Benchmark {
            symbol: stock.symbol.clone(),
            bars: stock.bars.clone(),
            volatility_index: None,
        })
    }
}

/// Load a universe JSON file (`{ "benchmark": {...}, "stocks": [...] }`).
pub fn load_universe(path: &Path) -> Result<Universe, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let universe = Universe::from_json(&json, path)?;
    info!(
        path = %path.display(),
        stocks = universe.stocks.len(),
        benchmark = universe.benchmark.as_ref().map(|b| b.symbol.as_str()).unwrap_or("-"),
        "universe loaded"
    );
    Ok(universe)
}

/// Somewhere a universe can be fetched from. Fetches sharing a credential
/// are serialized through the fetch lock.
pub trait UniverseSource: Send + Sync {
    /// Key the upstream provider rate-limits by.
    fn credential(&self) -> &str;

    fn fetch(&self) -> Result<Universe, LoadError>;
}

/// Universe JSON file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    credential: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            credential: "local-file".to_string(),
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = credential.into();
        self
    }
}

impl UniverseSource for FileSource {
    fn credential(&self) -> &str {
        &self.credential
    }

    fn fetch(&self) -> Result<Universe, LoadError> {
        load_universe(&self.path)
    }
}

/// Generated universe; see [`synthetic_universe`].
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSource {
    pub n_symbols: usize,
    pub n_bars: usize,
    pub seed: u64,
}

impl UniverseSource for SyntheticSource {
    fn credential(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self) -> Result<Universe, LoadError> {
        Ok(synthetic_universe(self.n_symbols, self.n_bars, self.seed))
    }
}

/// Sort bars oldest first and keep the last bar of any repeated date.
fn normalize_bars(symbol: &str, bars: &mut Vec<Bar>) {
    if !bars.windows(2).all(|w| w[0].date < w[1].date) {
        warn!(symbol, "bars out of order or duplicated, normalizing");
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars.drain(..) {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        *bars = deduped;
    }
    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        debug!(symbol, insane, "bars failing OHLC sanity checks");
    }
}

// ─── Synthetic universe ─────────────────────────────────────────────

const SECTORS: &[&str] = &[
    "Information Technology",
    "Financial Services",
    "Healthcare",
    "Automobile",
    "FMCG",
    "Metals & Mining",
    "Oil & Gas",
    "Capital Goods",
    "Realty",
];

/// Derive a per-symbol seed from the run seed.
fn symbol_seed(seed: u64, symbol: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    *hasher.finalize().as_bytes()
}

fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut current = start;
    while days.len() < n {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current += chrono::Duration::days(1);
    }
    days
}

/// Random walk with a drift. Prices stay positive.
fn random_walk(rng: &mut StdRng, dates: &[NaiveDate], start: f64, drift: f64, vol: f64) -> Vec<Bar> {
    let mut price = start;
    let base_volume: u64 = rng.gen_range(200_000..3_000_000);
    dates
        .iter()
        .map(|&date| {
            let ret = drift + rng.gen_range(-vol..vol);
            let open = price;
            let close = (price * (1.0 + ret)).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..vol / 2.0));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..vol / 2.0));
            let surge = if ret > vol / 2.0 { 2 } else { 1 };
            let volume = rng.gen_range(base_volume / 2..base_volume * 3 / 2) * surge;
            price = close;
            Bar {
                date,
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}

fn mean_turnover(bars: &[Bar], window: usize) -> f64 {
    let tail = &bars[bars.len().saturating_sub(window)..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().map(Bar::turnover).sum::<f64>() / tail.len() as f64
}

/// Deterministic multi-sector universe with a benchmark. Identical
/// arguments always produce identical data.
pub fn synthetic_universe(n_symbols: usize, n_bars: usize, seed: u64) -> Universe {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default();
    let dates = trading_days(start, n_bars);

    let mut bench_rng = StdRng::from_seed(symbol_seed(seed, "NIFTY50"));
    let bench_drift = bench_rng.gen_range(-0.0008..0.0012);
    let benchmark = Benchmark {
        symbol: "NIFTY50".into(),
        bars: random_walk(&mut bench_rng, &dates, 18_000.0, bench_drift, 0.012),
        volatility_index: Some(bench_rng.gen_range(11.0..30.0)),
    };

    let stocks = (0..n_symbols)
        .map(|i| {
            let symbol = format!("SYN{i:03}");
            let mut rng = StdRng::from_seed(symbol_seed(seed, &symbol));
            let sector = SECTORS[i % SECTORS.len()];
            let drift = rng.gen_range(-0.0015..0.0030);
            let vol = rng.gen_range(0.010..0.035);
            let start_price = rng.gen_range(50.0..3_000.0);
            let bars = random_walk(&mut rng, &dates, start_price, drift, vol);

            let last = bars.last().map_or(start_price, |b| b.close);
            let prev = bars.iter().rev().nth(1).map_or(last, |b| b.close);
            let surveillance = match rng.gen_range(0..100) {
                0..=2 => Some(Surveillance::Asm),
                3 => Some(Surveillance::Gsm),
                _ => None,
            };

            StockSnapshot {
                symbol: symbol.clone(),
                exchange: "NSE".into(),
                name: format!("Synthetic {sector} {i}"),
                sector: sector.into(),
                last_price: last,
                change_percent: (last - prev) / prev * 100.0,
                market_cap: last * rng.gen_range(1e7..5e8),
                avg_turnover: mean_turnover(&bars, 20),
                surveillance,
                bars,
            }
        })
        .collect();

    Universe {
        benchmark: Some(benchmark),
        stocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_is_deterministic() {
        let a = synthetic_universe(5, 60, 7);
        let b = synthetic_universe(5, 60, 7);
        let c = synthetic_universe(5, 60, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_shape() {
        let u = synthetic_universe(12, 100, 1);
        assert_eq!(u.stocks.len(), 12);
        assert!(u.stocks.iter().all(|s| s.bars.len() == 100));
        assert!(u.stocks.iter().all(|s| s.bars.iter().all(Bar::is_sane)));
        assert_eq!(u.benchmark.as_ref().unwrap().bars.len(), 100);
        let sectors: HashSet<&str> = u.stocks.iter().map(|s| s.sector.as_str()).collect();
        assert_eq!(sectors.len(), 9);
        // weekdays only
        assert!(u.stocks[0]
            .bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn json_round_trip_normalizes_order() {
        let mut u = synthetic_universe(2, 10, 3);
        u.stocks[0].bars.swap(0, 5);
        let json = serde_json::to_string(&u).unwrap();
        let parsed = Universe::from_json(&json, Path::new("mem")).unwrap();
        assert!(parsed.stocks[0]
            .bars
            .windows(2)
            .all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn duplicate_symbols_rejected() {
        let mut u = synthetic_universe(2, 5, 3);
        u.stocks[1].symbol = u.stocks[0].symbol.clone();
        let json = serde_json::to_string(&u).unwrap();
        assert!(matches!(
            Universe::from_json(&json, Path::new("mem")),
            Err(LoadError::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn benchmark_falls_back_to_member() {
        let mut u = synthetic_universe(3, 5, 3);
        u.benchmark = None;
        let b = u.resolve_benchmark(Some("SYN001")).unwrap();
        assert_eq!(b.symbol, "SYN001");
        assert!(u.resolve_benchmark(Some("NOPE")).is_none());
    }
}
