//! Look-ahead contamination tests for every series indicator.
//!
//! Invariant: no indicator value at bar t may depend on bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Bars 0..100 must be identical between both runs.

use chrono::NaiveDate;
use swingscan_core::domain::Bar;
use swingscan_core::indicators::*;

/// N bars of deterministic pseudo-random OHLCV.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05;
        price += change;
        price = price.max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: 1000 + (i as u64 * 100) % 7000,
        });
    }

    bars
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let truncated = &full_bars[..truncated_len];
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(truncated);

    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full_result.len(), full_bars.len(), "{}", indicator.name());

    for i in 0..truncated_len {
        let t = truncated_result[i];
        let f = full_result[i];
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            !t.is_nan() && !f.is_nan(),
            "{}: NaN mismatch at bar {i} (truncated={t}, full={f})",
            indicator.name()
        );
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at bar {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

#[test]
fn lookahead_moving_averages() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Sma::new(20), &bars, 100);
    assert_no_lookahead(&Ema::new(20), &bars, 100);
    assert_no_lookahead(&Ema::new(50), &bars, 100);
}

#[test]
fn lookahead_oscillators() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Rsi::new(14), &bars, 100);
    assert_no_lookahead(&Roc::new(14), &bars, 100);
    assert_no_lookahead(&Mfi::new(14), &bars, 100);
    assert_no_lookahead(&Cci::new(20), &bars, 100);
    assert_no_lookahead(&WilliamsR::new(14), &bars, 100);
    assert_no_lookahead(&Stochastic::new(14, 3, StochasticLine::K), &bars, 100);
    assert_no_lookahead(&Stochastic::new(14, 3, StochasticLine::D), &bars, 100);
}

#[test]
fn lookahead_macd() {
    let bars = make_test_bars(200);
    for line in [MacdLine::Macd, MacdLine::Signal, MacdLine::Histogram] {
        assert_no_lookahead(&Macd::standard(line), &bars, 100);
    }
}

#[test]
fn lookahead_directional() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Adx::new(14), &bars, 100);
    assert_no_lookahead(&Adx::plus_di(14), &bars, 100);
    assert_no_lookahead(&Adx::minus_di(14), &bars, 100);
    assert_no_lookahead(&Atr::new(14), &bars, 100);
}

#[test]
fn lookahead_bollinger() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Bollinger::upper(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::middle(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::lower(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::bandwidth(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::new(20, 2.0, BollingerBand::PercentB), &bars, 100);
}

#[test]
fn lookahead_flow_lines() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Obv::new(), &bars, 100);
    assert_no_lookahead(&AdLine::new(), &bars, 100);
}

#[test]
fn lookahead_trailing_stops() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Supertrend::default_params(), &bars, 100);
    assert_no_lookahead(&ParabolicSar::default_params(), &bars, 100);
}

#[test]
fn lookahead_ichimoku() {
    let bars = make_test_bars(200);
    for line in [
        IchimokuLine::Tenkan,
        IchimokuLine::Kijun,
        IchimokuLine::SenkouA,
        IchimokuLine::SenkouB,
        IchimokuLine::ChikouSpread,
    ] {
        assert_no_lookahead(&Ichimoku::standard(line), &bars, 100);
    }
}

#[test]
fn snapshot_matches_series_at_cutoff() {
    let bars = make_test_bars(260);
    let cutoff = 230;
    let snapshot = IndicatorSet::compute(&bars[..cutoff], None);
    let ema = Ema::new(20).compute(&bars);
    let rsi = Rsi::new(14).compute(&bars);
    assert!((snapshot.ema20.unwrap() - ema[cutoff - 1]).abs() < 1e-10);
    assert!((snapshot.rsi.unwrap() - rsi[cutoff - 1]).abs() < 1e-10);
}
