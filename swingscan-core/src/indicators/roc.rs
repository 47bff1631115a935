//! Rate of Change (ROC).
//!
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        for i in self.period..bars.len() {
            result[i] = percent_change(bars[i - self.period].close, bars[i].close);
        }
        result
    }
}

/// Percent change from `from` to `to`; NaN when either side is NaN or `from` is zero.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from.is_nan() || to.is_nan() || from == 0.0 {
        f64::NAN
    } else {
        (to - from) / from * 100.0
    }
}
