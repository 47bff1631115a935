//! Screener configuration and adaptive threshold resolution.
//!
//! Resolution precedence, highest first:
//! 1. explicit fields of the caller's [`ScreenerConfig`]
//! 2. the regime adjustment applied to the reference values
//! 3. the reference values themselves ([`AdaptiveThresholds::reference`])
//!
//! The reference values are an ordinary value handed to [`resolve`] on every
//! call; nothing here reads global state.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::regime::MarketRegime;

/// Declared range of every numeric [`ScreenerConfig`] field, `(name, min, max)`.
pub const FIELD_RANGES: &[(&str, f64, f64)] = &[
    ("min_turnover", 0.0, 1e15),
    ("min_adx", 0.0, 100.0),
    ("rsi_min", 0.0, 100.0),
    ("rsi_max", 0.0, 100.0),
    ("ema_proximity_pct", 0.0, 50.0),
    ("volume_multiplier", 0.1, 10.0),
    ("mfi_min", 0.0, 100.0),
    ("mfi_max", 0.0, 100.0),
    ("max_atr_percent", 0.1, 100.0),
    ("atr_stop_multiple", 0.1, 10.0),
    ("min_risk_reward", 0.1, 20.0),
    ("max_capital_risk_pct", 0.01, 100.0),
    ("min_bb_bandwidth", 0.0, 5.0),
    ("account_capital", 1.0, 1e15),
];

/// Declared `(min, max)` for a field name.
pub fn field_range(name: &str) -> Option<(f64, f64)> {
    FIELD_RANGES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, lo, hi)| (lo, hi))
}

/// Partial threshold overrides. Every field is optional; unset fields take
/// the regime-adjusted reference value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenerConfig {
    /// Minimum average daily turnover (price × volume).
    #[serde(default)]
    pub min_turnover: Option<f64>,
    #[serde(default)]
    pub min_adx: Option<f64>,
    #[serde(default)]
    pub rsi_min: Option<f64>,
    #[serde(default)]
    pub rsi_max: Option<f64>,
    /// Max distance of close from EMA20, percent, that still counts as a pullback.
    #[serde(default)]
    pub ema_proximity_pct: Option<f64>,
    /// Latest volume must exceed this multiple of the 20-day average.
    #[serde(default)]
    pub volume_multiplier: Option<f64>,
    #[serde(default)]
    pub mfi_min: Option<f64>,
    #[serde(default)]
    pub mfi_max: Option<f64>,
    /// ATR as percent of price, upper bound.
    #[serde(default)]
    pub max_atr_percent: Option<f64>,
    #[serde(default)]
    pub atr_stop_multiple: Option<f64>,
    #[serde(default)]
    pub min_risk_reward: Option<f64>,
    /// Percent of account capital risked per position.
    #[serde(default)]
    pub max_capital_risk_pct: Option<f64>,
    /// Skip symbols under ASM/GSM surveillance.
    #[serde(default)]
    pub exclude_surveillance: Option<bool>,
    #[serde(default)]
    pub min_bb_bandwidth: Option<f64>,
    #[serde(default)]
    pub account_capital: Option<f64>,
}

impl ScreenerConfig {
    /// Numeric fields by name, in [`FIELD_RANGES`] order.
    pub fn numeric_fields(&self) -> [(&'static str, Option<f64>); 14] {
        [
            ("min_turnover", self.min_turnover),
            ("min_adx", self.min_adx),
            ("rsi_min", self.rsi_min),
            ("rsi_max", self.rsi_max),
            ("ema_proximity_pct", self.ema_proximity_pct),
            ("volume_multiplier", self.volume_multiplier),
            ("mfi_min", self.mfi_min),
            ("mfi_max", self.mfi_max),
            ("max_atr_percent", self.max_atr_percent),
            ("atr_stop_multiple", self.atr_stop_multiple),
            ("min_risk_reward", self.min_risk_reward),
            ("max_capital_risk_pct", self.max_capital_risk_pct),
            ("min_bb_bandwidth", self.min_bb_bandwidth),
            ("account_capital", self.account_capital),
        ]
    }

    /// Copy with every numeric field clamped into its declared range, NaN
    /// fields dropped, and inverted RSI/MFI bands swapped. Each adjustment
    /// logs a warning; nothing fails.
    pub fn sanitized(&self) -> Self {
        let clamp = |name: &'static str, value: Option<f64>| -> Option<f64> {
            let v = value?;
            if v.is_nan() {
                warn!(field = name, "dropping NaN threshold override");
                return None;
            }
            let (lo, hi) = field_range(name)?;
            let clamped = v.clamp(lo, hi);
            if clamped != v {
                warn!(field = name, value = v, clamped, "threshold override out of range");
            }
            Some(clamped)
        };

        let mut out = Self {
            min_turnover: clamp("min_turnover", self.min_turnover),
            min_adx: clamp("min_adx", self.min_adx),
            rsi_min: clamp("rsi_min", self.rsi_min),
            rsi_max: clamp("rsi_max", self.rsi_max),
            ema_proximity_pct: clamp("ema_proximity_pct", self.ema_proximity_pct),
            volume_multiplier: clamp("volume_multiplier", self.volume_multiplier),
            mfi_min: clamp("mfi_min", self.mfi_min),
            mfi_max: clamp("mfi_max", self.mfi_max),
            max_atr_percent: clamp("max_atr_percent", self.max_atr_percent),
            atr_stop_multiple: clamp("atr_stop_multiple", self.atr_stop_multiple),
            min_risk_reward: clamp("min_risk_reward", self.min_risk_reward),
            max_capital_risk_pct: clamp("max_capital_risk_pct", self.max_capital_risk_pct),
            exclude_surveillance: self.exclude_surveillance,
            min_bb_bandwidth: clamp("min_bb_bandwidth", self.min_bb_bandwidth),
            account_capital: clamp("account_capital", self.account_capital),
        };

        if let (Some(lo), Some(hi)) = (out.rsi_min, out.rsi_max) {
            if lo > hi {
                warn!(rsi_min = lo, rsi_max = hi, "inverted RSI band, swapping");
                out.rsi_min = Some(hi);
                out.rsi_max = Some(lo);
            }
        }
        if let (Some(lo), Some(hi)) = (out.mfi_min, out.mfi_max) {
            if lo > hi {
                warn!(mfi_min = lo, mfi_max = hi, "inverted MFI band, swapping");
                out.mfi_min = Some(hi);
                out.mfi_max = Some(lo);
            }
        }
        out
    }
}

/// Fully resolved thresholds: the values every phase evaluates against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    pub regime: MarketRegime,
    pub min_turnover: f64,
    pub min_adx: f64,
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub ema_proximity_pct: f64,
    pub volume_multiplier: f64,
    pub mfi_min: f64,
    pub mfi_max: f64,
    pub max_atr_percent: f64,
    pub atr_stop_multiple: f64,
    pub min_risk_reward: f64,
    pub max_capital_risk_pct: f64,
    pub exclude_surveillance: bool,
    pub min_bb_bandwidth: f64,
    pub account_capital: f64,
}

impl AdaptiveThresholds {
    /// Reference values before any regime adjustment.
    pub fn reference() -> Self {
        Self {
            regime: MarketRegime::Sideways,
            min_turnover: 1e8,
            min_adx: 20.0,
            rsi_min: 40.0,
            rsi_max: 70.0,
            ema_proximity_pct: 2.0,
            volume_multiplier: 1.5,
            mfi_min: 40.0,
            mfi_max: 80.0,
            max_atr_percent: 5.0,
            atr_stop_multiple: 2.0,
            min_risk_reward: 2.0,
            max_capital_risk_pct: 1.0,
            exclude_surveillance: true,
            min_bb_bandwidth: 0.04,
            account_capital: 1_000_000.0,
        }
    }

    fn adjusted_for(&self, regime: MarketRegime) -> Self {
        let mut t = self.clone();
        t.regime = regime;
        match regime {
            MarketRegime::Bull => {
                t.min_adx -= 2.0;
                t.volume_multiplier -= 0.2;
                t.max_atr_percent += 1.0;
                t.min_risk_reward -= 0.2;
            }
            MarketRegime::Bear => {
                t.min_adx += 5.0;
                (t.rsi_min, t.rsi_max) = narrow((t.rsi_min, t.rsi_max), (45.0, 65.0));
                (t.mfi_min, t.mfi_max) = narrow((t.mfi_min, t.mfi_max), (45.0, 75.0));
                t.volume_multiplier += 0.3;
                t.max_atr_percent -= 1.0;
                t.min_risk_reward += 0.5;
                t.max_capital_risk_pct *= 0.75;
            }
            MarketRegime::Sideways => {}
        }
        t.min_adx = bounded("min_adx", t.min_adx);
        t.volume_multiplier = bounded("volume_multiplier", t.volume_multiplier);
        t.max_atr_percent = bounded("max_atr_percent", t.max_atr_percent);
        t.min_risk_reward = bounded("min_risk_reward", t.min_risk_reward);
        t.max_capital_risk_pct = bounded("max_capital_risk_pct", t.max_capital_risk_pct);
        t
    }
}

/// Resolve the thresholds for one run.
pub fn resolve(
    regime: MarketRegime,
    config: Option<&ScreenerConfig>,
    reference: &AdaptiveThresholds,
) -> AdaptiveThresholds {
    let mut t = reference.adjusted_for(regime);
    let Some(config) = config else {
        return t;
    };
    let c = config.sanitized();

    t.min_turnover = c.min_turnover.unwrap_or(t.min_turnover);
    t.min_adx = c.min_adx.unwrap_or(t.min_adx);
    (t.rsi_min, t.rsi_max) = fit_band((t.rsi_min, t.rsi_max), (c.rsi_min, c.rsi_max));
    t.ema_proximity_pct = c.ema_proximity_pct.unwrap_or(t.ema_proximity_pct);
    t.volume_multiplier = c.volume_multiplier.unwrap_or(t.volume_multiplier);
    (t.mfi_min, t.mfi_max) = fit_band((t.mfi_min, t.mfi_max), (c.mfi_min, c.mfi_max));
    t.max_atr_percent = c.max_atr_percent.unwrap_or(t.max_atr_percent);
    t.atr_stop_multiple = c.atr_stop_multiple.unwrap_or(t.atr_stop_multiple);
    t.min_risk_reward = c.min_risk_reward.unwrap_or(t.min_risk_reward);
    t.max_capital_risk_pct = c.max_capital_risk_pct.unwrap_or(t.max_capital_risk_pct);
    t.exclude_surveillance = c.exclude_surveillance.unwrap_or(t.exclude_surveillance);
    t.min_bb_bandwidth = c.min_bb_bandwidth.unwrap_or(t.min_bb_bandwidth);
    t.account_capital = c.account_capital.unwrap_or(t.account_capital);
    t
}

/// Apply explicit band bounds over the regime band. An explicit bound never
/// moves; when only one end is given, the other end yields to it.
fn fit_band(regime_band: (f64, f64), explicit: (Option<f64>, Option<f64>)) -> (f64, f64) {
    let (lo, hi) = regime_band;
    match explicit {
        (Some(min), Some(max)) => (min, max),
        (Some(min), None) => (min, hi.max(min)),
        (None, Some(max)) => (lo.min(max), max),
        (None, None) => regime_band,
    }
}

/// Intersect `band` with `target`; keep `band` if the intersection is empty.
fn narrow(band: (f64, f64), target: (f64, f64)) -> (f64, f64) {
    let lo = band.0.max(target.0);
    let hi = band.1.min(target.1);
    if lo <= hi {
        (lo, hi)
    } else {
        band
    }
}

fn bounded(name: &str, value: f64) -> f64 {
    match field_range(name) {
        Some((lo, hi)) => value.clamp(lo, hi),
        None => value,
    }
}
