//! Market regime detection from the benchmark index.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::{last_finite, Adx, Ema, Indicator};

/// ADX at or above this marks a trending benchmark.
pub const TRENDING_ADX: f64 = 25.0;
/// Volatility-index level that earns an "elevated volatility" note.
pub const ELEVATED_VOLATILITY: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    Bull,
    Bear,
    Sideways,
}

impl MarketRegime {
    pub fn label(&self) -> &'static str {
        match self {
            MarketRegime::Bull => "BULL",
            MarketRegime::Bear => "BEAR",
            MarketRegime::Sideways => "SIDEWAYS",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Detected regime plus the benchmark readings it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRegimeInfo {
    pub regime: MarketRegime,
    pub description: String,
    pub close: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub adx: f64,
    pub volatility_index: Option<f64>,
}

impl MarketRegimeInfo {
    /// Stand-in when no benchmark history is available.
    pub fn neutral() -> Self {
        Self {
            regime: MarketRegime::Sideways,
            description: "Benchmark data unavailable; using neutral sideways regime".into(),
            close: 0.0,
            ema20: 0.0,
            ema50: 0.0,
            adx: 0.0,
            volatility_index: None,
        }
    }
}

/// Classify the benchmark.
///
/// BULL when close > EMA20 > EMA50 and ADX >= 25, BEAR when
/// close < EMA20 < EMA50, SIDEWAYS otherwise.
pub fn detect(
    close: f64,
    ema20: f64,
    ema50: f64,
    adx: f64,
    volatility_index: Option<f64>,
) -> MarketRegimeInfo {
    let (regime, mut description) = if close > ema20 && ema20 > ema50 && adx >= TRENDING_ADX {
        (
            MarketRegime::Bull,
            format!("Benchmark above rising averages with ADX {adx:.1}"),
        )
    } else if close < ema20 && ema20 < ema50 {
        (
            MarketRegime::Bear,
            format!("Benchmark below falling averages (close {close:.2} < EMA20 {ema20:.2})"),
        )
    } else {
        (
            MarketRegime::Sideways,
            format!("No clear benchmark trend (ADX {adx:.1})"),
        )
    };

    if let Some(vix) = volatility_index.filter(|v| *v >= ELEVATED_VOLATILITY) {
        description.push_str(&format!("; elevated volatility (VIX {vix:.1})"));
    }

    MarketRegimeInfo {
        regime,
        description,
        close,
        ema20,
        ema50,
        adx,
        volatility_index,
    }
}

/// Run [`detect`] on benchmark history. `None` when the history is too short
/// for EMA50 or ADX14.
pub fn detect_from_history(bars: &[Bar], volatility_index: Option<f64>) -> Option<MarketRegimeInfo> {
    let close = bars.last().map(|b| b.close).filter(|c| c.is_finite())?;
    let ema20 = last_finite(&Ema::new(20).compute(bars))?;
    let ema50 = last_finite(&Ema::new(50).compute(bars))?;
    let adx = last_finite(&Adx::new(14).compute(bars))?;
    Some(detect(close, ema20, ema50, adx, volatility_index))
}
