//! Bollinger Bands: SMA(close, period) +/- mult × population stddev.
//!
//! Five outputs, one instance each:
//! - Upper / Middle / Lower bands
//! - %B = (close - lower) / (upper - lower)
//! - Bandwidth = (upper - lower) / middle
//!
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

/// Which Bollinger output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
    PercentB,
    Bandwidth,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
            BollingerBand::PercentB => "percent_b",
            BollingerBand::Bandwidth => "bandwidth",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }

    pub fn bandwidth(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Bandwidth)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            if window.iter().any(|b| b.close.is_nan()) {
                continue;
            }

            let mean = window.iter().map(|b| b.close).sum::<f64>() / self.period as f64;
            let variance = window
                .iter()
                .map(|b| (b.close - mean).powi(2))
                .sum::<f64>()
                / self.period as f64;
            let half_width = self.multiplier * variance.sqrt();
            let upper = mean + half_width;
            let lower = mean - half_width;

            result[i] = match self.band {
                BollingerBand::Upper => upper,
                BollingerBand::Middle => mean,
                BollingerBand::Lower => lower,
                BollingerBand::PercentB => {
                    if upper == lower {
                        0.5
                    } else {
                        (bars[i].close - lower) / (upper - lower)
                    }
                }
                BollingerBand::Bandwidth => {
                    if mean == 0.0 {
                        f64::NAN
                    } else {
                        (upper - lower) / mean
                    }
                }
            };
        }

        result
    }
}
