//! Accumulation/Distribution line.
//!
//! multiplier = ((close - low) - (high - close)) / (high - low), 0 on a zero range
//! AD[t] = AD[t-1] + multiplier × volume

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct AdLine;

impl AdLine {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for AdLine {
    fn name(&self) -> &str {
        "ad_line"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut total = 0.0;
        bars.iter()
            .map(|bar| {
                if bar.is_void() {
                    return f64::NAN;
                }
                let range = bar.high - bar.low;
                let multiplier = if range == 0.0 {
                    0.0
                } else {
                    ((bar.close - bar.low) - (bar.high - bar.close)) / range
                };
                total += multiplier * bar.volume as f64;
                total
            })
            .collect()
    }
}
