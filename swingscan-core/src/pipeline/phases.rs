//! Phases 1-5. Each phase returns a [`PhaseReport`]: the pass flag plus one
//! reason line per condition it checked. A missing indicator fails the
//! condition that needs it and says so.

use serde::{Deserialize, Serialize};

use super::signal::{MOMENTUM_VOTES_REQUIRED, VOLUME_VOTES_REQUIRED};
use crate::domain::StockSnapshot;
use crate::indicators::{IndicatorSet, TrendDirection, WeeklyTrend};
use crate::thresholds::AdaptiveThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub passed: bool,
    pub reasons: Vec<String>,
}

impl PhaseReport {
    fn new(passed: bool, reasons: Vec<String>) -> Self {
        Self { passed, reasons }
    }
}

struct Check {
    ok: bool,
    note: String,
}

impl Check {
    fn pass(ok: bool, note: String) -> Self {
        Self { ok, note }
    }

    fn missing(what: &str, bar_count: usize) -> Self {
        Self {
            ok: false,
            note: format!("{what} n/a (insufficient history, {bar_count} bars)"),
        }
    }
}

fn all_of(checks: Vec<Check>) -> PhaseReport {
    let passed = checks.iter().all(|c| c.ok);
    PhaseReport::new(passed, checks.into_iter().map(|c| c.note).collect())
}

fn votes(checks: Vec<Check>, required: usize) -> PhaseReport {
    let total = checks.len();
    let yes = checks.iter().filter(|c| c.ok).count();
    let mut reasons = vec![format!("{yes}/{total} votes (need {required})")];
    reasons.extend(checks.into_iter().map(|c| {
        let mark = if c.ok { "+" } else { "-" };
        format!("{mark}{}", c.note)
    }));
    PhaseReport::new(yes >= required, reasons)
}

/// Phase 1: turnover at or above the minimum, not under excluded surveillance.
pub fn universe_liquidity(stock: &StockSnapshot, t: &AdaptiveThresholds) -> PhaseReport {
    let turnover = stock.avg_turnover;
    let mut checks = vec![if turnover >= t.min_turnover {
        Check::pass(true, format!("turnover {turnover:.3e} >= {:.3e}", t.min_turnover))
    } else {
        Check::pass(false, format!("turnover {turnover:.3e} < {:.3e}", t.min_turnover))
    }];
    if let Some(flag) = stock.surveillance.filter(|_| t.exclude_surveillance) {
        checks.push(Check::pass(false, format!("under {flag} surveillance")));
    }
    all_of(checks)
}

/// Phase 2: stacked EMAs, ADX strength, positive relative strength and a
/// weekly trend that is not bearish.
pub fn trend_establishment(ind: &IndicatorSet, t: &AdaptiveThresholds) -> PhaseReport {
    let n = ind.bar_count;
    let ema = match (ind.ema20, ind.ema50, ind.ema200) {
        (Some(a), Some(b), Some(c)) => Check::pass(
            a > b && b > c,
            format!("EMA20 {a:.2} / EMA50 {b:.2} / EMA200 {c:.2}"),
        ),
        (_, _, None) => Check::missing("EMA200", n),
        _ => Check::missing("EMA20/50", n),
    };
    let adx = match ind.directional.adx {
        Some(adx) => Check::pass(adx >= t.min_adx, format!("ADX {adx:.1} vs {:.1}", t.min_adx)),
        None => Check::missing("ADX", n),
    };
    let rs = match ind.relative_strength_3m {
        Some(rs) => Check::pass(rs > 0.0, format!("RS3m {rs:+.2}%")),
        None => Check::missing("RS3m", n),
    };
    let weekly = match ind.weekly_trend {
        Some(w) => Check::pass(w != WeeklyTrend::Bearish, format!("weekly {w:?}")),
        None => Check::missing("weekly trend", n),
    };
    all_of(vec![ema, adx, rs, weekly])
}

/// Phase 3: pullback to EMA20, RSI in band, positive ROC, +DI over -DI,
/// %K over %D. Needs `MOMENTUM_VOTES_REQUIRED` of five.
pub fn momentum_signal(ind: &IndicatorSet, t: &AdaptiveThresholds) -> PhaseReport {
    let n = ind.bar_count;
    let pullback = match (ind.close, ind.ema20) {
        (Some(c), Some(e)) if e > 0.0 => {
            let dist = (c - e).abs() / e * 100.0;
            Check::pass(
                dist <= t.ema_proximity_pct,
                format!("EMA20 distance {dist:.2}%"),
            )
        }
        _ => Check::missing("EMA20", n),
    };
    let rsi = match ind.rsi {
        Some(r) => Check::pass(
            r >= t.rsi_min && r <= t.rsi_max,
            format!("RSI {r:.1} in {:.0}-{:.0}", t.rsi_min, t.rsi_max),
        ),
        None => Check::missing("RSI", n),
    };
    let roc = match ind.roc {
        Some(r) => Check::pass(r > 0.0, format!("ROC {r:+.2}")),
        None => Check::missing("ROC", n),
    };
    let di = match (ind.directional.plus_di, ind.directional.minus_di) {
        (Some(p), Some(m)) => Check::pass(p > m, format!("+DI {p:.1} / -DI {m:.1}")),
        _ => Check::missing("DI", n),
    };
    let stoch = match (ind.stochastic.k, ind.stochastic.d) {
        (Some(k), Some(d)) => Check::pass(k > d, format!("%K {k:.1} / %D {d:.1}")),
        _ => Check::missing("Stochastic", n),
    };
    votes(vec![pullback, rsi, roc, di, stoch], MOMENTUM_VOTES_REQUIRED)
}

/// Phase 4: volume surge, MFI in band, OBV rising. Needs
/// `VOLUME_VOTES_REQUIRED` of three.
pub fn volume_confirmation(ind: &IndicatorSet, t: &AdaptiveThresholds) -> PhaseReport {
    let n = ind.bar_count;
    let volume = match ind.volume_ratio {
        Some(r) => Check::pass(
            r > t.volume_multiplier,
            format!("volume {r:.2}x avg vs {:.2}x", t.volume_multiplier),
        ),
        None => Check::missing("avg volume", n),
    };
    let mfi = match ind.mfi {
        Some(m) => Check::pass(
            m >= t.mfi_min && m <= t.mfi_max,
            format!("MFI {m:.1} in {:.0}-{:.0}", t.mfi_min, t.mfi_max),
        ),
        None => Check::missing("MFI", n),
    };
    let obv = match ind.obv_trend {
        Some(dir) => Check::pass(dir == TrendDirection::Up, format!("OBV {dir:?}")),
        None => Check::missing("OBV", n),
    };
    votes(vec![volume, mfi, obv], VOLUME_VOTES_REQUIRED)
}

/// Phase 5: ATR% at or under the ceiling and Bollinger bandwidth expanding
/// while above the minimum width.
pub fn volatility_check(ind: &IndicatorSet, t: &AdaptiveThresholds) -> PhaseReport {
    let n = ind.bar_count;
    let atr = match ind.atr_percent {
        Some(p) => Check::pass(
            p <= t.max_atr_percent,
            format!("ATR {p:.2}% vs {:.2}%", t.max_atr_percent),
        ),
        None => Check::missing("ATR", n),
    };
    let bands = match (ind.bollinger.bandwidth, ind.bollinger.bandwidth_prior) {
        (Some(now), Some(prior)) => Check::pass(
            now > prior && now >= t.min_bb_bandwidth,
            format!(
                "BB width {now:.3} (prior {prior:.3}, min {:.3})",
                t.min_bb_bandwidth
            ),
        ),
        _ => Check::missing("Bollinger bandwidth", n),
    };
    all_of(vec![atr, bands])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Surveillance;

    fn stock(turnover: f64) -> StockSnapshot {
        StockSnapshot {
            symbol: "TEST".into(),
            exchange: "NSE".into(),
            name: "Test".into(),
            sector: "IT".into(),
            last_price: 100.0,
            change_percent: 0.0,
            market_cap: 1e10,
            avg_turnover: turnover,
            surveillance: None,
            bars: Vec::new(),
        }
    }

    #[test]
    fn turnover_boundary_is_inclusive() {
        let t = AdaptiveThresholds::reference();
        assert!(universe_liquidity(&stock(t.min_turnover), &t).passed);
        assert!(!universe_liquidity(&stock(t.min_turnover - 1.0), &t).passed);
    }

    #[test]
    fn surveillance_exclusion_is_switchable() {
        let mut t = AdaptiveThresholds::reference();
        let mut s = stock(1e9);
        s.surveillance = Some(Surveillance::Asm);
        let report = universe_liquidity(&s, &t);
        assert!(!report.passed);
        assert!(report.reasons.iter().any(|r| r.contains("ASM")));
        t.exclude_surveillance = false;
        assert!(universe_liquidity(&s, &t).passed);
    }

    #[test]
    fn missing_ema200_fails_trend_with_note() {
        let t = AdaptiveThresholds::reference();
        let ind = IndicatorSet {
            bar_count: 50,
            ema20: Some(110.0),
            ema50: Some(105.0),
            ..Default::default()
        };
        let report = trend_establishment(&ind, &t);
        assert!(!report.passed);
        assert!(report.reasons[0].contains("insufficient history"));
    }

    #[test]
    fn momentum_needs_three_votes() {
        let t = AdaptiveThresholds::reference();
        let mut ind = IndicatorSet {
            close: Some(100.0),
            ema20: Some(99.0),
            rsi: Some(55.0),
            roc: Some(-1.0),
            ..Default::default()
        };
        assert!(!momentum_signal(&ind, &t).passed);
        ind.roc = Some(1.0);
        let report = momentum_signal(&ind, &t);
        assert!(report.passed);
        assert_eq!(report.reasons[0], "3/5 votes (need 3)");
    }

    #[test]
    fn volume_needs_two_votes() {
        let t = AdaptiveThresholds::reference();
        let ind = IndicatorSet {
            volume_ratio: Some(2.0),
            mfi: Some(90.0),
            obv_trend: Some(TrendDirection::Up),
            ..Default::default()
        };
        assert!(volume_confirmation(&ind, &t).passed);
    }

    #[test]
    fn contracting_bands_fail_volatility() {
        let t = AdaptiveThresholds::reference();
        let mut ind = IndicatorSet {
            atr_percent: Some(2.0),
            ..Default::default()
        };
        ind.bollinger.bandwidth = Some(0.05);
        ind.bollinger.bandwidth_prior = Some(0.06);
        assert!(!volatility_check(&ind, &t).passed);
        ind.bollinger.bandwidth_prior = Some(0.045);
        assert!(volatility_check(&ind, &t).passed);
    }
}
