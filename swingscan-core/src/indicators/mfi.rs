//! Money Flow Index: volume-weighted RSI over typical price.
//!
//! raw flow = typical price × volume, positive when typical price rose,
//! negative when it fell. MFI = 100 - 100 / (1 + Σpos / Σneg) over `period`
//! flows. Lookback: period.

use super::rsi::ratio_index;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
    name: String,
}

impl Mfi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "MFI period must be >= 1");
        Self {
            period,
            name: format!("mfi_{period}"),
        }
    }
}

impl Indicator for Mfi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period + 1 {
            return result;
        }

        let mut pos = vec![f64::NAN; n];
        let mut neg = vec![f64::NAN; n];
        for i in 1..n {
            let tp = bars[i].typical_price();
            let prev = bars[i - 1].typical_price();
            if tp.is_nan() || prev.is_nan() {
                continue;
            }
            let flow = tp * bars[i].volume as f64;
            pos[i] = if tp > prev { flow } else { 0.0 };
            neg[i] = if tp < prev { flow } else { 0.0 };
        }

        for i in self.period..n {
            let window = (i + 1 - self.period)..=i;
            let p = &pos[window.clone()];
            let m = &neg[window];
            if p.iter().chain(m).any(|v| v.is_nan()) {
                continue;
            }
            result[i] = ratio_index(p.iter().sum(), m.iter().sum());
        }

        result
    }
}
