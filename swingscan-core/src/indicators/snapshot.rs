//! Per-symbol indicator snapshot: the latest value of every series the
//! screening phases read.

use serde::{Deserialize, Serialize};

use super::adx::directional_lines;
use super::ichimoku::{CloudPosition, Ichimoku, IchimokuLine};
use super::relative_strength::{relative_strength, RELATIVE_STRENGTH_PERIOD};
use super::sma::sma_of_series;
use super::weekly::WeeklyTrend;
use super::{
    finite_back, last_finite, AdLine, Atr, Bollinger, BollingerBand, Cci, Ema, Indicator, Macd,
    MacdLine, Mfi, Obv, ParabolicSar, Roc, Rsi, Stochastic, StochasticLine, Supertrend, WilliamsR,
};
use crate::domain::Bar;

pub const EMA_SHORT_PERIOD: usize = 20;
pub const EMA_MID_PERIOD: usize = 50;
pub const EMA_LONG_PERIOD: usize = 200;
pub const OSCILLATOR_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;
pub const CCI_PERIOD: usize = 20;
pub const VOLUME_AVERAGE_PERIOD: usize = 20;
/// Bandwidth is "expanding" when it exceeds its value this many bars back.
pub const BANDWIDTH_LOOKBACK: usize = 5;
/// Window of the cumulative-flow trend (OBV, A/D) comparison.
pub const FLOW_TREND_PERIOD: usize = 20;
pub const YEAR_SESSIONS: usize = 252;

/// Direction of a cumulative flow line against its own moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    fn of_flow(series: &[f64]) -> Option<Self> {
        let last = last_finite(series)?;
        let avg = last_finite(&sma_of_series(series, FLOW_TREND_PERIOD))?;
        Some(if last > avg {
            TrendDirection::Up
        } else if last < avg {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        })
    }
}

/// Two-state trend flag for the trailing-stop indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendState {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSnapshot {
    pub line: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalSnapshot {
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerSnapshot {
    pub middle: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
    pub percent_b: Option<f64>,
    pub bandwidth: Option<f64>,
    /// Bandwidth `BANDWIDTH_LOOKBACK` bars earlier.
    pub bandwidth_prior: Option<f64>,
}

impl BollingerSnapshot {
    pub fn expanding(&self) -> Option<bool> {
        Some(self.bandwidth? > self.bandwidth_prior?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StochasticSnapshot {
    pub k: Option<f64>,
    pub d: Option<f64>,
}

/// Latest indicator values for one symbol. A field is `None` when the
/// history is too short for that indicator or its latest value is not finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub bar_count: usize,
    pub close: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: MacdSnapshot,
    pub directional: DirectionalSnapshot,
    pub atr: Option<f64>,
    pub atr_percent: Option<f64>,
    pub bollinger: BollingerSnapshot,
    pub obv_trend: Option<TrendDirection>,
    pub mfi: Option<f64>,
    pub stochastic: StochasticSnapshot,
    pub cci: Option<f64>,
    pub williams_r: Option<f64>,
    pub roc: Option<f64>,
    pub ad_trend: Option<TrendDirection>,
    pub supertrend: Option<TrendState>,
    pub parabolic_sar: Option<TrendState>,
    pub ichimoku: Option<CloudPosition>,
    pub weekly_trend: Option<WeeklyTrend>,
    pub relative_strength_3m: Option<f64>,
    pub last_volume: Option<f64>,
    /// Mean volume of the 20 sessions before the latest one.
    pub avg_volume_20: Option<f64>,
    pub volume_ratio: Option<f64>,
    /// Percent distance of the close below the 52-week high (<= 0).
    pub distance_from_high_52w: Option<f64>,
}

impl IndicatorSet {
    /// Compute every indicator over `bars` (oldest first). `benchmark` feeds
    /// the relative-strength field only.
    pub fn compute(bars: &[Bar], benchmark: Option<&[Bar]>) -> Self {
        let latest = |ind: &dyn Indicator| last_finite(&ind.compute(bars));

        let close = bars.last().map(|b| b.close).filter(|c| c.is_finite());
        let atr = latest(&Atr::new(OSCILLATOR_PERIOD));
        let dmi = directional_lines(bars, OSCILLATOR_PERIOD);
        let bandwidth_series =
            Bollinger::bandwidth(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER).compute(bars);

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        let last_volume = volumes.last().copied();
        let avg_volume_20 = prior_average(&volumes, VOLUME_AVERAGE_PERIOD);

        let supertrend = last_finite(&Supertrend::default_params().direction(bars))
            .map(|d| if d > 0.0 { TrendState::Bullish } else { TrendState::Bearish });
        let parabolic_sar = match (last_finite(&ParabolicSar::default_params().compute(bars)), close)
        {
            (Some(sar), Some(c)) => Some(if sar < c {
                TrendState::Bullish
            } else {
                TrendState::Bearish
            }),
            _ => None,
        };
        let ichimoku = match (
            latest(&Ichimoku::standard(IchimokuLine::SenkouA)),
            latest(&Ichimoku::standard(IchimokuLine::SenkouB)),
            close,
        ) {
            (Some(a), Some(b), Some(c)) => Some(CloudPosition::classify(c, a, b)),
            _ => None,
        };

        Self {
            bar_count: bars.len(),
            close,
            ema20: latest(&Ema::new(EMA_SHORT_PERIOD)),
            ema50: latest(&Ema::new(EMA_MID_PERIOD)),
            ema200: latest(&Ema::new(EMA_LONG_PERIOD)),
            rsi: latest(&Rsi::new(OSCILLATOR_PERIOD)),
            macd: MacdSnapshot {
                line: latest(&Macd::standard(MacdLine::Macd)),
                signal: latest(&Macd::standard(MacdLine::Signal)),
                histogram: latest(&Macd::standard(MacdLine::Histogram)),
            },
            directional: DirectionalSnapshot {
                adx: last_finite(&dmi.adx),
                plus_di: last_finite(&dmi.plus_di),
                minus_di: last_finite(&dmi.minus_di),
            },
            atr,
            atr_percent: match (atr, close) {
                (Some(a), Some(c)) if c > 0.0 => Some(a / c * 100.0),
                _ => None,
            },
            bollinger: BollingerSnapshot {
                middle: latest(&Bollinger::middle(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
                upper: latest(&Bollinger::upper(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
                lower: latest(&Bollinger::lower(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
                percent_b: latest(&Bollinger::new(
                    BOLLINGER_PERIOD,
                    BOLLINGER_MULTIPLIER,
                    BollingerBand::PercentB,
                )),
                bandwidth: last_finite(&bandwidth_series),
                bandwidth_prior: finite_back(&bandwidth_series, BANDWIDTH_LOOKBACK),
            },
            obv_trend: TrendDirection::of_flow(&Obv::new().compute(bars)),
            mfi: latest(&Mfi::new(OSCILLATOR_PERIOD)),
            stochastic: StochasticSnapshot {
                k: latest(&Stochastic::new(OSCILLATOR_PERIOD, 3, StochasticLine::K)),
                d: latest(&Stochastic::new(OSCILLATOR_PERIOD, 3, StochasticLine::D)),
            },
            cci: latest(&Cci::new(CCI_PERIOD)),
            williams_r: latest(&WilliamsR::new(OSCILLATOR_PERIOD)),
            roc: latest(&Roc::new(OSCILLATOR_PERIOD)),
            ad_trend: TrendDirection::of_flow(&AdLine::new().compute(bars)),
            supertrend,
            parabolic_sar,
            ichimoku,
            weekly_trend: WeeklyTrend::from_daily(bars),
            relative_strength_3m: relative_strength(bars, benchmark, RELATIVE_STRENGTH_PERIOD),
            last_volume,
            avg_volume_20,
            volume_ratio: match (last_volume, avg_volume_20) {
                (Some(v), Some(avg)) if avg > 0.0 => Some(v / avg),
                _ => None,
            },
            distance_from_high_52w: distance_from_high(bars, close),
        }
    }

    /// True when EMA20 > EMA50 > EMA200 with all three present.
    pub fn emas_stacked(&self) -> bool {
        matches!(
            (self.ema20, self.ema50, self.ema200),
            (Some(a), Some(b), Some(c)) if a > b && b > c
        )
    }
}

/// Mean of the `period` values before the last one.
fn prior_average(values: &[f64], period: usize) -> Option<f64> {
    let n = values.len();
    if period == 0 || n <= period {
        return None;
    }
    let window = &values[n - 1 - period..n - 1];
    let mean = window.iter().sum::<f64>() / period as f64;
    mean.is_finite().then_some(mean)
}

fn distance_from_high(bars: &[Bar], close: Option<f64>) -> Option<f64> {
    let close = close?;
    let start = bars.len().saturating_sub(YEAR_SESSIONS);
    let high = bars[start..]
        .iter()
        .map(|b| b.high)
        .filter(|h| h.is_finite())
        .fold(f64::NAN, f64::max);
    (high.is_finite() && high > 0.0).then(|| (close - high) / high * 100.0)
}
