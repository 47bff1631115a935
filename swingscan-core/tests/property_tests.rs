//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Score bounds: every overall score is within 0..=100
//! 2. Phase 2 implies EMA20 > EMA50 > EMA200
//! 3. STRONG_BUY implies phases 1-5 passed
//! 4. Monotonic tightening: BEAR is never looser than BULL
//! 5. Sector bonus exclusivity: exactly three +5 and three -5, or none
//! 6. Idempotence: identical inputs give byte-identical output

use chrono::NaiveDate;
use proptest::prelude::*;
use swingscan_core::domain::{Bar, StockSnapshot};
use swingscan_core::indicators::{
    BollingerSnapshot, DirectionalSnapshot, IndicatorSet, StochasticSnapshot, TrendDirection,
    WeeklyTrend,
};
use swingscan_core::pipeline::{Screener, Signal};
use swingscan_core::regime::MarketRegime;
use swingscan_core::result::results_digest;
use swingscan_core::sector::SectorRanker;
use swingscan_core::thresholds::{resolve, AdaptiveThresholds, ScreenerConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_opt(range: std::ops::Range<f64>) -> impl Strategy<Value = Option<f64>> {
    prop::option::weighted(0.85, range)
}

fn arb_direction() -> impl Strategy<Value = Option<TrendDirection>> {
    prop::option::of(prop_oneof![
        Just(TrendDirection::Up),
        Just(TrendDirection::Down),
        Just(TrendDirection::Flat),
    ])
}

fn arb_weekly() -> impl Strategy<Value = Option<WeeklyTrend>> {
    prop::option::of(prop_oneof![
        Just(WeeklyTrend::Bullish),
        Just(WeeklyTrend::Neutral),
        Just(WeeklyTrend::Bearish),
    ])
}

fn arb_indicators() -> impl Strategy<Value = IndicatorSet> {
    (
        (arb_opt(50.0..150.0), arb_opt(50.0..150.0), arb_opt(50.0..150.0), arb_opt(50.0..150.0)),
        (arb_opt(0.0..100.0), arb_opt(0.0..80.0), arb_opt(0.0..60.0), arb_opt(0.0..60.0)),
        (arb_opt(0.0..10.0), arb_opt(0.0..0.3), arb_opt(0.0..0.3)),
        (arb_opt(0.0..100.0), arb_opt(0.0..100.0), arb_opt(0.0..100.0)),
        (arb_opt(-10.0..10.0), arb_opt(-30.0..30.0), arb_opt(0.0..5.0)),
        (arb_direction(), arb_weekly()),
    )
        .prop_map(
            |(
                (close, ema20, ema50, ema200),
                (rsi, adx, plus_di, minus_di),
                (atr_percent, bandwidth, bandwidth_prior),
                (mfi, k, d),
                (roc, rs, volume_ratio),
                (obv_trend, weekly_trend),
            )| IndicatorSet {
                bar_count: 260,
                close,
                ema20,
                ema50,
                ema200,
                rsi,
                directional: DirectionalSnapshot { adx, plus_di, minus_di },
                atr: atr_percent.zip(close).map(|(p, c)| p * c / 100.0),
                atr_percent,
                bollinger: BollingerSnapshot {
                    bandwidth,
                    bandwidth_prior,
                    ..Default::default()
                },
                mfi,
                stochastic: StochasticSnapshot { k, d },
                roc,
                relative_strength_3m: rs,
                volume_ratio,
                obv_trend,
                weekly_trend,
                ..Default::default()
            },
        )
}

fn arb_regime() -> impl Strategy<Value = MarketRegime> {
    prop_oneof![
        Just(MarketRegime::Bull),
        Just(MarketRegime::Bear),
        Just(MarketRegime::Sideways),
    ]
}

fn arb_config() -> impl Strategy<Value = ScreenerConfig> {
    (
        arb_opt(0.0..60.0),
        arb_opt(0.5..15.0),
        arb_opt(0.5..5.0),
        arb_opt(0.0..2e8),
        arb_band(),
        arb_band(),
    )
        .prop_map(
            |(min_adx, max_atr_percent, min_risk_reward, min_turnover, rsi, mfi)| ScreenerConfig {
                min_adx,
                max_atr_percent,
                min_risk_reward,
                min_turnover,
                rsi_min: rsi.0,
                rsi_max: rsi.1,
                mfi_min: mfi.0,
                mfi_max: mfi.1,
                ..Default::default()
            },
        )
}

/// Either end of an oscillator band, each independently present.
fn arb_band() -> impl Strategy<Value = (Option<f64>, Option<f64>)> {
    (
        prop::option::of(0.0..100.0_f64),
        prop::option::of(0.0..100.0_f64),
    )
}

fn plain_stock(symbol: &str, sector: &str, turnover: f64) -> StockSnapshot {
    StockSnapshot {
        symbol: symbol.into(),
        exchange: "NSE".into(),
        name: symbol.into(),
        sector: sector.into(),
        last_price: 100.0,
        change_percent: 0.0,
        market_cap: 1e10,
        avg_turnover: turnover,
        surveillance: None,
        bars: Vec::new(),
    }
}

fn walk_bars(seed: u64, n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut price = 100.0;
    let mut state = seed;
    (0..n)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = ((state >> 33) % 200) as f64 / 100.0 - 0.97;
            let open = price;
            price = (price + step).max(5.0);
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(price) + 0.8,
                low: (open.min(price) - 0.8).max(0.5),
                close: price,
                volume: 10_000 + (state >> 40) % 50_000,
            }
        })
        .collect()
}

/// Straight-line closes moving `change` percent from first to last bar.
fn line_bars(change: f64, n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let step = change / (n - 1) as f64;
    (0..n)
        .map(|i| {
            let close = 100.0 + step * i as f64;
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 20_000,
            }
        })
        .collect()
}

// ── Pipeline invariants ──────────────────────────────────────────────

proptest! {
    #[test]
    fn score_is_bounded_and_implications_hold(
        ind in arb_indicators(),
        regime in arb_regime(),
        turnover in 0.0..3e8_f64,
        bonus_sectors in 0usize..10,
    ) {
        let t = resolve(regime, None, &AdaptiveThresholds::reference());
        let universe: Vec<StockSnapshot> = (0..bonus_sectors)
            .map(|i| plain_stock(&format!("X{i}"), &format!("S{i}"), 1e9))
            .collect();
        let screener = Screener::new(t)
            .with_sector_rankings(SectorRanker::new().rank(&universe));
        let s = plain_stock("P", "S0", turnover);
        let r = screener.evaluate_with(&s, ind.clone());

        prop_assert!(r.overall_score <= 100);

        if r.phase2 {
            let (a, b, c) = (ind.ema20.unwrap(), ind.ema50.unwrap(), ind.ema200.unwrap());
            prop_assert!(a > b && b > c);
        }

        if r.signal == Signal::StrongBuy {
            prop_assert!(r.flags().all_pass());
        }
        if r.signal.is_buy() {
            prop_assert!(r.phase6.meets_minimum);
        }
        if !r.phase1 {
            prop_assert_eq!(r.signal, Signal::Avoid);
        }
    }

    #[test]
    fn bear_never_looser_than_bull(config in prop::option::of(arb_config())) {
        let reference = AdaptiveThresholds::reference();
        let bull = resolve(MarketRegime::Bull, config.as_ref(), &reference);
        let bear = resolve(MarketRegime::Bear, config.as_ref(), &reference);
        prop_assert!(bear.min_adx >= bull.min_adx);
        prop_assert!(bear.max_atr_percent <= bull.max_atr_percent);
        prop_assert!(bear.min_risk_reward >= bull.min_risk_reward);
        prop_assert!(bear.rsi_min >= bull.rsi_min && bear.rsi_max <= bull.rsi_max);
        prop_assert!(bear.mfi_min >= bull.mfi_min && bear.mfi_max <= bull.mfi_max);
        prop_assert!(bear.rsi_min <= bear.rsi_max && bear.mfi_min <= bear.mfi_max);
        if let Some(c) = config.as_ref().map(ScreenerConfig::sanitized) {
            for t in [&bull, &bear] {
                prop_assert!(c.rsi_min.map_or(true, |v| v == t.rsi_min));
                prop_assert!(c.rsi_max.map_or(true, |v| v == t.rsi_max));
                prop_assert!(c.mfi_min.map_or(true, |v| v == t.mfi_min));
                prop_assert!(c.mfi_max.map_or(true, |v| v == t.mfi_max));
            }
        }
        prop_assert!(bear.max_capital_risk_pct <= bull.max_capital_risk_pct);
    }

    #[test]
    fn sector_bonus_exclusivity(
        changes in prop::collection::vec(-20.0..20.0_f64, 1..40),
        sector_count in 1usize..12,
    ) {
        let stocks: Vec<StockSnapshot> = changes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut s = plain_stock(&format!("T{i}"), &format!("Sector{}", i % sector_count), 1e9);
                s.bars = line_bars(*c, 64);
                s
            })
            .collect();
        let rankings = SectorRanker::new().rank(&stocks);
        let bonuses: Vec<i32> = rankings.iter().map(|r| r.score_bonus).collect();
        let plus = bonuses.iter().filter(|b| **b == 5).count();
        let minus = bonuses.iter().filter(|b| **b == -5).count();

        if rankings.len() < 6 {
            prop_assert_eq!(plus + minus, 0);
        } else {
            prop_assert_eq!(plus, 3);
            prop_assert_eq!(minus, 3);
            prop_assert!(bonuses[..3].iter().all(|b| *b == 5));
            prop_assert!(bonuses[bonuses.len() - 3..].iter().all(|b| *b == -5));
        }
        let ranks: Vec<usize> = rankings.iter().map(|r| r.momentum_rank).collect();
        prop_assert_eq!(ranks, (1..=rankings.len()).collect::<Vec<_>>());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn screening_is_idempotent(seed in any::<u64>(), len in 30usize..260) {
        let stocks: Vec<StockSnapshot> = (0..4)
            .map(|i| {
                let mut s = plain_stock(&format!("W{i}"), "Auto", 2e8);
                s.bars = walk_bars(seed.wrapping_add(i), len);
                s
            })
            .collect();
        let screener = Screener::new(AdaptiveThresholds::reference());
        let first = screener.screen(&stocks);
        let second = screener.screen(&stocks);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        prop_assert_eq!(results_digest(&first), results_digest(&second));
    }
}
