//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; both zero → 50.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                continue;
            }
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }
        wilder_ratio_index(&gains, &losses, self.period)
    }
}

/// Wilder-smoothed up flow vs down flow, scaled to 0..100.
/// Index 0 of both inputs is ignored (no prior bar).
fn wilder_ratio_index(up: &[f64], down: &[f64], period: usize) -> Vec<f64> {
    let n = up.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let mut avg_up = 0.0;
    let mut avg_down = 0.0;
    for i in 1..=period {
        if up[i].is_nan() || down[i].is_nan() {
            return result;
        }
        avg_up += up[i];
        avg_down += down[i];
    }
    avg_up /= period as f64;
    avg_down /= period as f64;
    result[period] = ratio_index(avg_up, avg_down);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        if up[i].is_nan() || down[i].is_nan() {
            return result;
        }
        avg_up = alpha * up[i] + (1.0 - alpha) * avg_up;
        avg_down = alpha * down[i] + (1.0 - alpha) * avg_down;
        result[i] = ratio_index(avg_up, avg_down);
    }

    result
}

pub(crate) fn ratio_index(up: f64, down: f64) -> f64 {
    if up == 0.0 && down == 0.0 {
        50.0
    } else if down == 0.0 {
        100.0
    } else if up == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + up / down)
    }
}
