//! Scenario tests for the screening pipeline, GIVEN/WHEN/THEN style.

use chrono::NaiveDate;
use swingscan_core::domain::{Bar, StockSnapshot};
use swingscan_core::indicators::{
    BollingerSnapshot, DirectionalSnapshot, IndicatorSet, TrendDirection, WeeklyTrend,
};
use swingscan_core::pipeline::{PhaseFlags, Screener, Signal};
use swingscan_core::regime::MarketRegime;
use swingscan_core::thresholds::{resolve, AdaptiveThresholds};

// ── Helpers ──────────────────────────────────────────────────────────

fn stock(bars: Vec<Bar>) -> StockSnapshot {
    StockSnapshot {
        symbol: "MOMO".into(),
        exchange: "NSE".into(),
        name: "Momentum Ltd".into(),
        sector: "Capital Goods".into(),
        last_price: bars.last().map_or(110.0, |b| b.close),
        change_percent: 1.2,
        market_cap: 5e10,
        avg_turnover: 2e8,
        surveillance: None,
        bars,
    }
}

/// Indicator readings of a textbook pullback in an established uptrend.
fn textbook_indicators(bar_count: usize) -> IndicatorSet {
    IndicatorSet {
        bar_count,
        close: Some(110.0),
        ema20: Some(110.0),
        ema50: Some(109.9),
        ema200: Some(100.0),
        rsi: Some(55.0),
        directional: DirectionalSnapshot {
            adx: Some(30.0),
            plus_di: Some(28.0),
            minus_di: Some(14.0),
        },
        atr: Some(3.3),
        atr_percent: Some(3.0),
        bollinger: BollingerSnapshot {
            bandwidth: Some(0.08),
            bandwidth_prior: Some(0.06),
            ..Default::default()
        },
        obv_trend: Some(TrendDirection::Up),
        mfi: Some(60.0),
        roc: Some(2.0),
        weekly_trend: Some(WeeklyTrend::Bullish),
        relative_strength_3m: Some(5.0),
        last_volume: Some(150_000.0),
        avg_volume_20: Some(100_000.0),
        volume_ratio: Some(1.5),
        ..Default::default()
    }
}

fn bull_screener() -> Screener {
    let t = resolve(MarketRegime::Bull, None, &AdaptiveThresholds::reference());
    Screener::new(t)
}

/// Steady uptrend with a shallow sine wobble and rising volume.
fn uptrend_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut prev = 100.0;
    (0..n)
        .map(|i| {
            let close = 100.0 * 1.003_f64.powi(i as i32) + 1.5 * (i as f64 * 0.3).sin();
            let open = prev;
            prev = close;
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 100_000 + (i as u64 % 10) * 5_000,
            }
        })
        .collect()
}

/// Sawtooth uptrend (three up sessions, two down), a tight ten-session base,
/// then a three-session breakout closing on heavy volume.
fn breakout_bars() -> Vec<Bar> {
    const CYCLE: [f64; 5] = [0.020, 0.015, 0.010, -0.012, -0.012];
    let trend = (0..240).map(|k| CYCLE[k % 5]);
    let base = (0..10).map(|k| if k % 2 == 0 { 0.003 } else { -0.003 });
    let breakout = [0.02, 0.015, 0.02];
    let moves: Vec<f64> = std::iter::once(0.0)
        .chain(trend)
        .chain(base)
        .chain(breakout)
        .collect();

    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut prev = 100.0;
    let mut bars: Vec<Bar> = moves
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let open = prev;
            let close = prev * (1.0 + m);
            prev = close;
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.005,
                low: open.min(close) * 0.995,
                close,
                volume: 100_000,
            }
        })
        .collect();
    if let Some(last) = bars.last_mut() {
        last.volume = 250_000;
    }
    bars
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn textbook_setup_is_a_buy_in_bull_regime() {
    // GIVEN a liquid symbol with a clean pullback in an uptrend
    let s = stock(Vec::new());
    let ind = textbook_indicators(260);

    // WHEN evaluated with bull-regime thresholds
    let result = bull_screener().evaluate_with(&s, ind);

    // THEN phases 1-5 pass and the signal is buy-class
    assert!(result.flags().all_pass(), "{}", result.rationale);
    assert!(matches!(result.signal, Signal::Buy | Signal::StrongBuy));
    assert!(result.overall_score >= 60);
    assert!(result.phase6.meets_minimum);
    assert!(result.phase6.stop_loss < 110.0 && result.phase6.target > 110.0);
}

#[test]
fn computed_breakout_is_a_buy_in_bull_regime() {
    // GIVEN a year of real bars ending in a volume breakout from a tight base
    let s = stock(breakout_bars());

    // WHEN every indicator is computed from the bars
    let result = bull_screener().evaluate(&s);

    // THEN the snapshot is a stacked uptrend with expanding bands
    let ind = &result.indicators;
    assert!(ind.emas_stacked());
    assert!(ind.directional.adx.unwrap() >= 18.0);
    assert!(ind.volume_ratio.unwrap() > 2.0);
    assert!(ind.bollinger.expanding().unwrap());
    assert_eq!(ind.obv_trend, Some(TrendDirection::Up));
    assert_eq!(ind.weekly_trend, Some(WeeklyTrend::Bullish));

    // AND phases 1-5 pass with a buy-class signal
    assert!(result.flags().all_pass(), "{}", result.rationale);
    assert!(result.phase6.meets_minimum);
    assert!(result.signal.is_buy(), "{:?}: {}", result.signal, result.rationale);
    assert!(result.overall_score >= 60);
}

#[test]
fn truncated_history_degrades_to_neutral() {
    // GIVEN the same readings but only 50 bars, so EMA200 and the weekly trend are unset
    let s = stock(Vec::new());
    let mut ind = textbook_indicators(50);
    ind.ema200 = None;
    ind.weekly_trend = None;

    // WHEN evaluated
    let result = bull_screener().evaluate_with(&s, ind);

    // THEN trend establishment fails and the rationale says why
    assert!(!result.phase2);
    assert!(matches!(result.signal, Signal::Neutral | Signal::Avoid));
    assert!(result.rationale.contains("insufficient history"));
}

#[test]
fn real_short_history_degrades_to_neutral_or_avoid() {
    // GIVEN 50 real bars
    let s = stock(uptrend_bars(50));

    // WHEN computed end to end
    let result = bull_screener().evaluate(&s);

    // THEN EMA200 is missing and phase 2 cannot pass
    assert!(result.indicators.ema200.is_none());
    assert!(!result.phase2);
    assert!(matches!(result.signal, Signal::Neutral | Signal::Avoid));
    assert!(result.rationale.contains("insufficient history"));
}

#[test]
fn illiquid_symbol_is_avoided() {
    // GIVEN a symbol trading below the turnover floor
    let mut s = stock(uptrend_bars(260));
    s.avg_turnover = 1e6;

    // WHEN evaluated
    let result = bull_screener().evaluate(&s);

    // THEN phase 1 fails and the symbol is AVOID
    assert!(!result.phase1);
    assert_eq!(result.signal, Signal::Avoid);
    assert!(result.rationale.starts_with("P1 FAIL"));
}

#[test]
fn watch_when_volume_and_volatility_fail() {
    // GIVEN trend and momentum intact but no volume and contracting bands
    let s = stock(Vec::new());
    let mut ind = textbook_indicators(260);
    ind.volume_ratio = Some(0.5);
    ind.mfi = Some(20.0);
    ind.obv_trend = Some(TrendDirection::Down);

    // WHEN evaluated
    let result = bull_screener().evaluate_with(&s, ind);

    // THEN it is parked on the watch list
    assert_eq!(
        result.flags(),
        PhaseFlags {
            phase1: true,
            phase2: true,
            phase3: true,
            phase4: false,
            phase5: true,
        }
    );
    assert_eq!(result.signal, Signal::Watch);
}

#[test]
fn missing_atr_blocks_buy_signals() {
    // GIVEN a perfect setup without an ATR reading
    let s = stock(Vec::new());
    let mut ind = textbook_indicators(260);
    ind.atr = None;

    // WHEN evaluated
    let result = bull_screener().evaluate_with(&s, ind);

    // THEN phase 6 is degenerate and the signal cannot be buy-class
    assert_eq!(result.phase6.risk_reward_ratio, 0.0);
    assert!(!result.signal.is_buy());
}

#[test]
fn results_preserve_input_order() {
    // GIVEN a universe of differently shaped symbols
    let stocks: Vec<StockSnapshot> = (0..12)
        .map(|i| {
            let mut s = stock(uptrend_bars(80 + i * 20));
            s.symbol = format!("SYM{i:02}");
            s
        })
        .collect();

    // WHEN screened in parallel and sequentially
    let parallel = bull_screener().screen(&stocks);
    let sequential = bull_screener().with_parallelism(false).screen(&stocks);

    // THEN both are 1:1 with the input, in order, and identical
    let symbols: Vec<&str> = parallel.iter().map(|r| r.stock.symbol.as_str()).collect();
    let expected: Vec<String> = (0..12).map(|i| format!("SYM{i:02}")).collect();
    assert_eq!(symbols, expected);
    assert_eq!(parallel, sequential);
}
