//! StockSnapshot: the immutable per-symbol input to one screening run.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Exchange surveillance regimes that make a symbol ineligible when
/// surveillance exclusion is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Surveillance {
    /// Additional Surveillance Measure.
    Asm,
    /// Graded Surveillance Measure.
    Gsm,
}

impl fmt::Display for Surveillance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surveillance::Asm => f.write_str("ASM"),
            Surveillance::Gsm => f.write_str("GSM"),
        }
    }
}

/// Point-in-time view of one listed symbol plus its daily history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub exchange: String,
    pub name: String,
    pub sector: String,
    pub last_price: f64,
    pub change_percent: f64,
    pub market_cap: f64,
    /// Average daily traded value in the listing currency.
    pub avg_turnover: f64,
    #[serde(default)]
    pub surveillance: Option<Surveillance>,
    /// Oldest first. Depth should cover the longest lookback (200 sessions).
    pub bars: Vec<Bar>,
}

impl StockSnapshot {
    /// Sector label used for grouping; blank sectors collapse into one bucket.
    pub fn sector_key(&self) -> &str {
        let trimmed = self.sector.trim();
        if trimmed.is_empty() {
            UNCLASSIFIED_SECTOR
        } else {
            trimmed
        }
    }

    /// Latest close from history, falling back to the quoted last price.
    pub fn latest_close(&self) -> f64 {
        self.bars
            .last()
            .map(|b| b.close)
            .filter(|c| c.is_finite())
            .unwrap_or(self.last_price)
    }
}

/// Bucket name for symbols without a sector.
pub const UNCLASSIFIED_SECTOR: &str = "Unclassified";

/// A benchmark index series (e.g. NIFTY 50) used for regime detection and
/// relative strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub symbol: String,
    pub bars: Vec<Bar>,
    /// Latest volatility index reading (e.g. India VIX), if known.
    #[serde(default)]
    pub volatility_index: Option<f64>,
}
