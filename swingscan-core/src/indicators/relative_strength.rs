//! Relative strength against a benchmark over a fixed window.

use super::roc::percent_change;
use crate::domain::Bar;

/// Three months of sessions.
pub const RELATIVE_STRENGTH_PERIOD: usize = 63;

/// Percent return over the last `period` bars, `None` on short or void history.
pub fn period_return(bars: &[Bar], period: usize) -> Option<f64> {
    let n = bars.len();
    if period == 0 || n <= period {
        return None;
    }
    let r = percent_change(bars[n - 1 - period].close, bars[n - 1].close);
    r.is_finite().then_some(r)
}

/// Stock return minus benchmark return over `period` bars, in percentage
/// points. A missing or too-short benchmark counts as a flat benchmark.
pub fn relative_strength(bars: &[Bar], benchmark: Option<&[Bar]>, period: usize) -> Option<f64> {
    let own = period_return(bars, period)?;
    let bench = benchmark
        .and_then(|b| period_return(b, period))
        .unwrap_or(0.0);
    Some(own - bench)
}
