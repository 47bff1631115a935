//! Concrete indicator implementations.
//!
//! Every series indicator implements [`Indicator`]: full bar history in, one
//! value per bar out, with `f64::NAN` during warm-up. Multi-line indicators
//! (Bollinger, MACD, ADX/DI, Stochastic, Ichimoku) are exposed as separate
//! instances per line so the single-series trait stays unchanged.
//!
//! [`IndicatorSet::compute`] folds the latest value of each series into the
//! per-symbol snapshot the screening phases consume.

pub mod ad_line;
pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod ichimoku;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod parabolic_sar;
pub mod relative_strength;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod stochastic;
pub mod supertrend;
pub mod weekly;
pub mod williams_r;

pub use ad_line::AdLine;
pub use adx::{Adx, AdxLine};
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use cci::Cci;
pub use ema::Ema;
pub use ichimoku::{CloudPosition, Ichimoku, IchimokuLine};
pub use macd::{Macd, MacdLine};
pub use mfi::Mfi;
pub use obv::Obv;
pub use parabolic_sar::ParabolicSar;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::Sma;
pub use snapshot::{
    BollingerSnapshot, DirectionalSnapshot, IndicatorSet, MacdSnapshot, StochasticSnapshot,
    TrendDirection, TrendState, EMA_LONG_PERIOD,
};
pub use stochastic::{Stochastic, StochasticLine};
pub use supertrend::Supertrend;
pub use weekly::{weekly_bars, WeeklyTrend};
pub use williams_r::WilliamsR;

use crate::domain::Bar;

/// Trait for series indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warm-up).
///
/// No value at bar t may depend on bars after t; truncating the history must
/// leave every earlier value unchanged.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Last element of a series if it is finite.
pub fn last_finite(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}

/// Element `k` bars before the last one, if present and finite.
pub fn finite_back(series: &[f64], k: usize) -> Option<f64> {
    let n = series.len();
    if k >= n {
        return None;
    }
    Some(series[n - 1 - k]).filter(|v| v.is_finite())
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples, volume 1000.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_finite_skips_nan_tail() {
        assert_eq!(last_finite(&[1.0, 2.0]), Some(2.0));
        assert_eq!(last_finite(&[1.0, f64::NAN]), None);
        assert_eq!(last_finite(&[]), None);
    }

    #[test]
    fn finite_back_indexes_from_end() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(finite_back(&s, 0), Some(4.0));
        assert_eq!(finite_back(&s, 3), Some(1.0));
        assert_eq!(finite_back(&s, 4), None);
    }
}
