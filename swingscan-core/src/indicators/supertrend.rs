//! SuperTrend: ATR-banded trend flip indicator.
//!
//! Basic bands are hl2 ± multiplier × ATR. The final upper band may only
//! tighten while price stays below it, the final lower band only rise while
//! price stays above it. Direction flips when the close crosses the active
//! band.
//!
//! Output: the active band, i.e. the lower band (support) when trending up, upper
//! band (resistance) when trending down. `direction()` gives +1 / -1.
//! Lookback: period.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }

    /// ATR(10) × 3, the common charting default.
    pub fn default_params() -> Self {
        Self::new(10, 3.0)
    }

    /// +1.0 while trending up, -1.0 while trending down, NaN during warm-up.
    pub fn direction(&self, bars: &[Bar]) -> Vec<f64> {
        self.run(bars).1
    }

    fn run(&self, bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
        let n = bars.len();
        let mut band = vec![f64::NAN; n];
        let mut direction = vec![f64::NAN; n];

        let mut tr = true_range(bars);
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }
        let atr = wilder_smooth(&tr, self.period);

        let Some(start) = atr.iter().position(|v| !v.is_nan()) else {
            return (band, direction);
        };

        let hl2 = (bars[start].high + bars[start].low) / 2.0;
        let mut upper = hl2 + self.multiplier * atr[start];
        let mut lower = hl2 - self.multiplier * atr[start];
        let mut trending_up = bars[start].close >= hl2;
        band[start] = if trending_up { lower } else { upper };
        direction[start] = if trending_up { 1.0 } else { -1.0 };

        for i in (start + 1)..n {
            if atr[i].is_nan() || bars[i].is_void() {
                break;
            }

            let hl2 = (bars[i].high + bars[i].low) / 2.0;
            let basic_upper = hl2 + self.multiplier * atr[i];
            let basic_lower = hl2 - self.multiplier * atr[i];
            let prev_close = bars[i - 1].close;

            upper = if prev_close <= upper {
                basic_upper.min(upper)
            } else {
                basic_upper
            };
            lower = if prev_close >= lower {
                basic_lower.max(lower)
            } else {
                basic_lower
            };

            if trending_up && bars[i].close < lower {
                trending_up = false;
            } else if !trending_up && bars[i].close > upper {
                trending_up = true;
            }

            band[i] = if trending_up { lower } else { upper };
            direction[i] = if trending_up { 1.0 } else { -1.0 };
        }

        (band, direction)
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.run(bars).0
    }
}
