//! Phase 6: stop, target and position size.

use serde::{Deserialize, Serialize};

use crate::thresholds::AdaptiveThresholds;

/// Exchange price tick.
pub const PRICE_TICK: f64 = 0.05;
const TICK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward_ratio: f64,
    pub quantity: u64,
    pub capital_at_risk: f64,
    pub meets_minimum: bool,
}

impl RiskAssessment {
    /// Stop = target = entry; never meets the minimum.
    pub fn degenerate(entry_price: f64) -> Self {
        Self {
            entry_price,
            stop_loss: entry_price,
            target: entry_price,
            risk_reward_ratio: 0.0,
            quantity: 0,
            capital_at_risk: 0.0,
            meets_minimum: false,
        }
    }

    /// Stop `atr_stop_multiple × ATR` below entry (rounded down to the tick),
    /// target at the minimum risk:reward above entry (rounded up), size
    /// bounded by the capital-risk budget.
    pub fn assess(entry_price: f64, atr: Option<f64>, t: &AdaptiveThresholds) -> Self {
        let Some(atr) = atr.filter(|a| a.is_finite() && *a > 0.0) else {
            return Self::degenerate(entry_price);
        };
        if !entry_price.is_finite() || entry_price <= 0.0 {
            return Self::degenerate(entry_price);
        }

        let stop_loss = round_down(entry_price - t.atr_stop_multiple * atr);
        let per_share = entry_price - stop_loss;
        if stop_loss <= 0.0 || per_share <= 0.0 {
            return Self::degenerate(entry_price);
        }
        let target = round_up(entry_price + t.min_risk_reward * per_share);
        let ratio = (target - entry_price) / per_share;

        let budget = t.account_capital * t.max_capital_risk_pct / 100.0;
        let quantity = (budget / per_share).floor().max(0.0) as u64;

        Self {
            entry_price,
            stop_loss,
            target,
            risk_reward_ratio: round_cents(ratio),
            quantity,
            capital_at_risk: round_cents(quantity as f64 * per_share),
            meets_minimum: ratio + TICK_EPSILON >= t.min_risk_reward,
        }
    }
}

fn round_down(price: f64) -> f64 {
    round_cents((price / PRICE_TICK + TICK_EPSILON).floor() * PRICE_TICK)
}

fn round_up(price: f64) -> f64 {
    round_cents((price / PRICE_TICK - TICK_EPSILON).ceil() * PRICE_TICK)
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
