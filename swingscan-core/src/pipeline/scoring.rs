//! Composite 0-100 score.
//!
//! Phase flags carry 60 points. Strength terms reward how well an indicator
//! sits inside its ideal zone rather than whether it merely crossed a line.
//! The sector bonus is added last and the total clamped.

use super::signal::PhaseFlags;
use crate::indicators::{CloudPosition, IndicatorSet, TrendState};
use crate::thresholds::AdaptiveThresholds;

pub const PHASE_WEIGHTS: [f64; 5] = [10.0, 15.0, 15.0, 10.0, 10.0];
pub const RSI_WEIGHT: f64 = 10.0;
pub const ADX_WEIGHT: f64 = 10.0;
pub const VOLUME_WEIGHT: f64 = 10.0;
pub const RELATIVE_STRENGTH_WEIGHT: f64 = 5.0;
const SUPERTREND_POINTS: f64 = 2.0;
const PSAR_POINTS: f64 = 1.0;
const CLOUD_POINTS: f64 = 2.0;
/// ADX points above the minimum that earn the full ADX term.
const ADX_FULL_SPAN: f64 = 20.0;
/// RS3m (percentage points) that earns the full relative-strength term.
const RS_FULL_SPAN: f64 = 10.0;

/// Score breakdown, kept for tests and debugging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParts {
    pub phases: f64,
    pub rsi: f64,
    pub adx: f64,
    pub volume: f64,
    pub relative_strength: f64,
    pub confirmation: f64,
    pub sector_bonus: f64,
}

impl ScoreParts {
    pub fn total(&self) -> u8 {
        let raw = self.phases
            + self.rsi
            + self.adx
            + self.volume
            + self.relative_strength
            + self.confirmation
            + self.sector_bonus;
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, 100.0).round() as u8
    }
}

pub fn score_parts(
    flags: &PhaseFlags,
    ind: &IndicatorSet,
    t: &AdaptiveThresholds,
    sector_bonus: i32,
) -> ScoreParts {
    let passed = [flags.phase1, flags.phase2, flags.phase3, flags.phase4, flags.phase5];
    let phases = passed
        .iter()
        .zip(PHASE_WEIGHTS)
        .filter(|(p, _)| **p)
        .map(|(_, w)| w)
        .sum::<f64>();

    let rsi = ind.rsi.map_or(0.0, |r| {
        let center = (t.rsi_min + t.rsi_max) / 2.0;
        let half = (t.rsi_max - t.rsi_min) / 2.0;
        if half <= 0.0 {
            return if r == center { RSI_WEIGHT } else { 0.0 };
        }
        RSI_WEIGHT * unit(1.0 - (r - center).abs() / half)
    });

    let adx = ind
        .directional
        .adx
        .map_or(0.0, |a| ADX_WEIGHT * unit((a - t.min_adx) / ADX_FULL_SPAN));

    // 5 points at the multiple, 10 at 1.5x the multiple
    let volume = ind.volume_ratio.map_or(0.0, |r| {
        VOLUME_WEIGHT * unit(r / t.volume_multiplier - 0.5)
    });

    let relative_strength = ind
        .relative_strength_3m
        .map_or(0.0, |rs| RELATIVE_STRENGTH_WEIGHT * unit(rs / RS_FULL_SPAN));

    let mut confirmation = 0.0;
    if ind.supertrend == Some(TrendState::Bullish) {
        confirmation += SUPERTREND_POINTS;
    }
    if ind.parabolic_sar == Some(TrendState::Bullish) {
        confirmation += PSAR_POINTS;
    }
    if ind.ichimoku == Some(CloudPosition::Above) {
        confirmation += CLOUD_POINTS;
    }

    ScoreParts {
        phases,
        rsi,
        adx,
        volume,
        relative_strength,
        confirmation,
        sector_bonus: sector_bonus as f64,
    }
}

pub fn overall_score(
    flags: &PhaseFlags,
    ind: &IndicatorSet,
    t: &AdaptiveThresholds,
    sector_bonus: i32,
) -> u8 {
    score_parts(flags, ind, t, sector_bonus).total()
}

fn unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
