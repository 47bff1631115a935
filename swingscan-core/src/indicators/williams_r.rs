//! Williams %R: the stochastic range position inverted onto -100..0.
//!
//! %R = -100 × (highest high - close) / (highest high - lowest low)

use super::stochastic::range_position;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        range_position(bars, self.period)
            .into_iter()
            .map(|p| (p - 1.0) * 100.0)
            .collect()
    }
}
