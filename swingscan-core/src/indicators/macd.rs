//! MACD: EMA(fast) − EMA(slow), signal = EMA(signal) of the MACD line,
//! histogram = MACD − signal.
//!
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal/histogram.

use super::ema::{ema_after_warmup, ema_of_series};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        let label = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// 12 / 26 / 9.
    pub fn standard(line: MacdLine) -> Self {
        Self::new(12, 26, 9, line)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        if self.line == MacdLine::Macd {
            return macd;
        }
        let signal = ema_after_warmup(&macd, self.signal);
        match self.line {
            MacdLine::Signal => signal,
            _ => macd.iter().zip(&signal).map(|(m, s)| m - s).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn ramp(n: usize, step: f64) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * step).collect();
        make_bars(&closes)
    }

    #[test]
    fn warmup_lengths() {
        let bars = ramp(40, 1.0);
        let line = Macd::standard(MacdLine::Macd).compute(&bars);
        let signal = Macd::standard(MacdLine::Signal).compute(&bars);
        assert!(line[24].is_nan());
        assert!(!line[25].is_nan());
        assert!(signal[32].is_nan());
        assert!(!signal[33].is_nan());
    }

    #[test]
    fn rising_prices_give_positive_macd() {
        let bars = ramp(60, 1.0);
        let line = Macd::standard(MacdLine::Macd).compute(&bars);
        assert!(line[59] > 0.0);
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let bars = ramp(60, 0.5);
        let line = Macd::standard(MacdLine::Macd).compute(&bars);
        let signal = Macd::standard(MacdLine::Signal).compute(&bars);
        let hist = Macd::standard(MacdLine::Histogram).compute(&bars);
        assert!((hist[59] - (line[59] - signal[59])).abs() < 1e-12);
    }

    #[test]
    fn macd_lookback() {
        assert_eq!(Macd::standard(MacdLine::Macd).lookback(), 25);
        assert_eq!(Macd::standard(MacdLine::Histogram).lookback(), 33);
    }
}
