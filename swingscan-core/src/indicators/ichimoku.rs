//! Ichimoku Kinko Hyo.
//!
//! - Tenkan-sen: midpoint of the 9-bar high/low range
//! - Kijun-sen: midpoint of the 26-bar range
//! - Senkou span A: (tenkan + kijun) / 2, displaced 26 bars forward
//! - Senkou span B: midpoint of the 52-bar range, displaced 26 bars forward
//! - Chikou: today's close against the close 26 bars back
//!
//! The spans are aligned to the bar they are plotted on, so the value at bar
//! t was computed from bars up to t - 26. Chikou is reported as the spread
//! `close[t] - close[t-26]`, which keeps every line free of look-ahead.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuLine {
    Tenkan,
    Kijun,
    SenkouA,
    SenkouB,
    ChikouSpread,
}

/// Where price sits relative to the Kumo (cloud).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloudPosition {
    Above,
    Inside,
    Below,
}

impl CloudPosition {
    pub fn classify(close: f64, span_a: f64, span_b: f64) -> Self {
        let top = span_a.max(span_b);
        let bottom = span_a.min(span_b);
        if close > top {
            CloudPosition::Above
        } else if close < bottom {
            CloudPosition::Below
        } else {
            CloudPosition::Inside
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan: usize,
    kijun: usize,
    senkou_b: usize,
    displacement: usize,
    line: IchimokuLine,
    name: String,
}

impl Ichimoku {
    pub fn new(
        tenkan: usize,
        kijun: usize,
        senkou_b: usize,
        displacement: usize,
        line: IchimokuLine,
    ) -> Self {
        assert!(tenkan >= 1 && kijun >= 1 && senkou_b >= 1, "Ichimoku periods must be >= 1");
        let label = match line {
            IchimokuLine::Tenkan => "tenkan",
            IchimokuLine::Kijun => "kijun",
            IchimokuLine::SenkouA => "senkou_a",
            IchimokuLine::SenkouB => "senkou_b",
            IchimokuLine::ChikouSpread => "chikou",
        };
        Self {
            tenkan,
            kijun,
            senkou_b,
            displacement,
            line,
            name: format!("ichimoku_{label}_{tenkan}_{kijun}_{senkou_b}"),
        }
    }

    /// 9 / 26 / 52 with 26-bar displacement.
    pub fn standard(line: IchimokuLine) -> Self {
        Self::new(9, 26, 52, 26, line)
    }
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            IchimokuLine::Tenkan => self.tenkan - 1,
            IchimokuLine::Kijun => self.kijun - 1,
            IchimokuLine::SenkouA => self.tenkan.max(self.kijun) - 1 + self.displacement,
            IchimokuLine::SenkouB => self.senkou_b - 1 + self.displacement,
            IchimokuLine::ChikouSpread => self.displacement,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        match self.line {
            IchimokuLine::Tenkan => midpoint(bars, self.tenkan),
            IchimokuLine::Kijun => midpoint(bars, self.kijun),
            IchimokuLine::SenkouA => {
                let t = midpoint(bars, self.tenkan);
                let k = midpoint(bars, self.kijun);
                let a: Vec<f64> = t.iter().zip(&k).map(|(t, k)| (t + k) / 2.0).collect();
                displace(&a, self.displacement)
            }
            IchimokuLine::SenkouB => displace(&midpoint(bars, self.senkou_b), self.displacement),
            IchimokuLine::ChikouSpread => {
                let mut out = vec![f64::NAN; bars.len()];
                for i in self.displacement..bars.len() {
                    out[i] = bars[i].close - bars[i - self.displacement].close;
                }
                out
            }
        }
    }
}

/// (highest high + lowest low) / 2 over a trailing window.
fn midpoint(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        if window.iter().any(Bar::is_void) {
            continue;
        }
        let hh = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let ll = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        out[i] = (hh + ll) / 2.0;
    }
    out
}

/// Shift a series forward: out[t] = series[t - k].
fn displace(series: &[f64], k: usize) -> Vec<f64> {
    let n = series.len();
    let mut out = vec![f64::NAN; n];
    for i in k..n {
        out[i] = series[i - k];
    }
    out
}
