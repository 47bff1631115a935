//! Parabolic SAR: Wilder's accelerating stop-and-reverse.
//!
//! State: direction, extreme point (EP) and acceleration factor (AF).
//! Parameters: af_start (0.02), af_step (0.02), af_max (0.20).
//! Lookback: 1 (needs two bars to pick the initial direction).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    af_start: f64,
    af_step: f64,
    af_max: f64,
    name: String,
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        assert!(af_start > 0.0, "AF start must be > 0");
        assert!(af_step > 0.0, "AF step must be > 0");
        assert!(af_max >= af_start, "AF max must be >= AF start");
        Self {
            af_start,
            af_step,
            af_max,
            name: format!("psar_{af_start}_{af_step}_{af_max}"),
        }
    }

    /// Default parameters: 0.02, 0.02, 0.20
    pub fn default_params() -> Self {
        Self::new(0.02, 0.02, 0.20)
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < 2 || bars[0].is_void() || bars[1].is_void() {
            return result;
        }

        let mut is_long = bars[1].close >= bars[0].close;
        let mut af = self.af_start;
        let (mut sar, mut ep) = if is_long {
            (bars[0].low, bars[1].high)
        } else {
            (bars[0].high, bars[1].low)
        };
        result[1] = sar;

        for i in 2..n {
            let bar = &bars[i];
            if bar.is_void() {
                continue;
            }

            let mut next = sar + af * (ep - sar);

            if is_long {
                // never above the two prior lows
                next = next.min(bars[i - 1].low).min(bars[i - 2].low);
                if bar.low < next {
                    is_long = false;
                    next = ep;
                    ep = bar.low;
                    af = self.af_start;
                } else if bar.high > ep {
                    ep = bar.high;
                    af = (af + self.af_step).min(self.af_max);
                }
            } else {
                // never below the two prior highs
                next = next.max(bars[i - 1].high).max(bars[i - 2].high);
                if bar.high > next {
                    is_long = true;
                    next = ep;
                    ep = bar.high;
                    af = self.af_start;
                } else if bar.low < ep {
                    ep = bar.low;
                    af = (af + self.af_step).min(self.af_max);
                }
            }

            sar = next;
            result[i] = sar;
        }

        result
    }
}
