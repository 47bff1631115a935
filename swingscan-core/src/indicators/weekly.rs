//! Weekly timeframe: daily bars resampled to ISO weeks, plus the weekly
//! trend classification used as a higher-timeframe guard.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::ema::ema_of_series;
use super::last_finite;
use crate::domain::Bar;

pub const WEEKLY_FAST_PERIOD: usize = 10;
pub const WEEKLY_SLOW_PERIOD: usize = 20;

/// Weekly trend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeeklyTrend {
    Bullish,
    Neutral,
    Bearish,
}

impl WeeklyTrend {
    /// Close > EMA10 > EMA20 is bullish, close < EMA10 < EMA20 bearish.
    /// `None` when fewer than 20 weeks are available.
    pub fn from_daily(bars: &[Bar]) -> Option<Self> {
        let weekly = weekly_bars(bars);
        let closes: Vec<f64> = weekly.iter().map(|b| b.close).collect();
        let close = last_finite(&closes)?;
        let fast = last_finite(&ema_of_series(&closes, WEEKLY_FAST_PERIOD))?;
        let slow = last_finite(&ema_of_series(&closes, WEEKLY_SLOW_PERIOD))?;
        Some(if close > fast && fast > slow {
            WeeklyTrend::Bullish
        } else if close < fast && fast < slow {
            WeeklyTrend::Bearish
        } else {
            WeeklyTrend::Neutral
        })
    }
}

/// Aggregate daily bars into one bar per ISO week. The weekly bar carries the
/// last session's date. Void daily bars are skipped.
pub fn weekly_bars(bars: &[Bar]) -> Vec<Bar> {
    let mut weeks: BTreeMap<(i32, u32), Bar> = BTreeMap::new();
    for bar in bars.iter().filter(|b| !b.is_void()) {
        let iso = bar.date.iso_week();
        weeks
            .entry((iso.year(), iso.week()))
            .and_modify(|w| {
                w.high = w.high.max(bar.high);
                w.low = w.low.min(bar.low);
                w.close = bar.close;
                w.volume += bar.volume;
                w.date = bar.date;
            })
            .or_insert_with(|| bar.clone());
    }
    weeks.into_values().collect()
}
