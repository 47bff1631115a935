//! On-Balance Volume: cumulative volume signed by the close-to-close move.
//!
//! OBV[0] = 0; OBV[t] = OBV[t-1] ± volume[t] (unchanged on a flat close).
//! Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut total = 0.0;
        for (i, bar) in bars.iter().enumerate() {
            if i > 0 {
                let prev = bars[i - 1].close;
                if bar.close.is_nan() || prev.is_nan() {
                    result.push(f64::NAN);
                    continue;
                }
                if bar.close > prev {
                    total += bar.volume as f64;
                } else if bar.close < prev {
                    total -= bar.volume as f64;
                }
            }
            result.push(total);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn obv_accumulates_signed_volume() {
        // +1000, -1000, flat, +1000
        let bars = make_bars(&[10.0, 11.0, 10.5, 10.5, 12.0]);
        let result = Obv::new().compute(&bars);
        assert_approx(result[0], 0.0, DEFAULT_EPSILON);
        assert_approx(result[1], 1000.0, DEFAULT_EPSILON);
        assert_approx(result[2], 0.0, DEFAULT_EPSILON);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
        assert_approx(result[4], 1000.0, DEFAULT_EPSILON);
    }

    #[test]
    fn obv_skips_nan_bar() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        bars[2].close = f64::NAN;
        let result = Obv::new().compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }
}
