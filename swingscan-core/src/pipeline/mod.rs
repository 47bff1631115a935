//! Six-phase screening pipeline.
//!
//! ```text
//! StockSnapshot ──► IndicatorSet ──► P1 liquidity ─┐
//!                                    P2 trend      │
//!                                    P3 momentum   ├─► score ─► signal
//!                                    P4 volume     │
//!                                    P5 volatility ┘
//!                                    P6 risk (always computed)
//! ```
//!
//! Evaluation is pure and per-symbol, so [`Screener::screen`] fans out over
//! rayon and collects in input order.

pub mod phases;
pub mod rationale;
pub mod risk;
pub mod scoring;
pub mod signal;

pub use phases::PhaseReport;
pub use risk::RiskAssessment;
pub use scoring::overall_score;
pub use signal::{
    classify, PhaseFlags, Signal, BUY_MIN_SCORE, MOMENTUM_VOTES_REQUIRED, STRONG_BUY_MIN_SCORE,
    VOLUME_VOTES_REQUIRED,
};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{Bar, Benchmark, StockSnapshot};
use crate::indicators::relative_strength::{period_return, RELATIVE_STRENGTH_PERIOD};
use crate::indicators::IndicatorSet;
use crate::regime::{detect_from_history, MarketRegimeInfo};
use crate::result::{ScreenOutcome, ScreenerResult, StockRef};
use crate::sector::{SectorRanker, SectorRankings};
use crate::thresholds::{resolve, AdaptiveThresholds, ScreenerConfig};

/// Evaluates symbols against one resolved set of thresholds.
#[derive(Debug, Clone)]
pub struct Screener {
    thresholds: AdaptiveThresholds,
    sectors: SectorRankings,
    benchmark: Option<Vec<Bar>>,
    parallel: bool,
}

impl Screener {
    pub fn new(thresholds: AdaptiveThresholds) -> Self {
        Self {
            thresholds,
            sectors: SectorRankings::default(),
            benchmark: None,
            parallel: true,
        }
    }

    pub fn with_sector_rankings(mut self, sectors: SectorRankings) -> Self {
        self.sectors = sectors;
        self
    }

    /// Benchmark history for relative strength.
    pub fn with_benchmark(mut self, bars: Vec<Bar>) -> Self {
        self.benchmark = Some(bars);
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn thresholds(&self) -> &AdaptiveThresholds {
        &self.thresholds
    }

    /// One result per input symbol, in input order.
    pub fn screen(&self, stocks: &[StockSnapshot]) -> Vec<ScreenerResult> {
        if self.parallel {
            stocks.par_iter().map(|s| self.evaluate(s)).collect()
        } else {
            stocks.iter().map(|s| self.evaluate(s)).collect()
        }
    }

    pub fn evaluate(&self, stock: &StockSnapshot) -> ScreenerResult {
        let indicators = IndicatorSet::compute(&stock.bars, self.benchmark.as_deref());
        self.evaluate_with(stock, indicators)
    }

    /// Evaluate against an already computed indicator snapshot.
    pub fn evaluate_with(&self, stock: &StockSnapshot, indicators: IndicatorSet) -> ScreenerResult {
        let t = &self.thresholds;
        let reports = [
            phases::universe_liquidity(stock, t),
            phases::trend_establishment(&indicators, t),
            phases::momentum_signal(&indicators, t),
            phases::volume_confirmation(&indicators, t),
            phases::volatility_check(&indicators, t),
        ];
        let flags = PhaseFlags {
            phase1: reports[0].passed,
            phase2: reports[1].passed,
            phase3: reports[2].passed,
            phase4: reports[3].passed,
            phase5: reports[4].passed,
        };

        let entry = indicators.close.unwrap_or_else(|| stock.latest_close());
        let risk = RiskAssessment::assess(entry, indicators.atr, t);
        let sector_bonus = self.sectors.bonus_for(stock.sector_key());
        let score = overall_score(&flags, &indicators, t, sector_bonus);
        let signal = classify(&flags, score, risk.meets_minimum);

        if indicators.ema200.is_none() {
            debug!(
                symbol = %stock.symbol,
                bars = indicators.bar_count,
                "insufficient history for EMA200"
            );
        }

        ScreenerResult {
            stock: StockRef::from(stock),
            rationale: rationale::build(&reports, &risk),
            indicators,
            phase1: flags.phase1,
            phase2: flags.phase2,
            phase3: flags.phase3,
            phase4: flags.phase4,
            phase5: flags.phase5,
            phase6: risk,
            overall_score: score,
            signal,
            sector_bonus,
        }
    }
}

/// Inputs of a full run. Precomputed thresholds or sector rankings are used
/// as given; otherwise they are derived from the benchmark and universe.
#[derive(Debug, Clone, Copy)]
pub struct ScreenRequest<'a> {
    pub stocks: &'a [StockSnapshot],
    pub benchmark: Option<&'a Benchmark>,
    pub config: Option<&'a ScreenerConfig>,
    pub thresholds: Option<&'a AdaptiveThresholds>,
    pub sector_rankings: Option<&'a SectorRankings>,
    pub parallel: bool,
}

impl<'a> ScreenRequest<'a> {
    pub fn new(stocks: &'a [StockSnapshot]) -> Self {
        Self {
            stocks,
            benchmark: None,
            config: None,
            thresholds: None,
            sector_rankings: None,
            parallel: true,
        }
    }
}

/// Regime, thresholds, sector ranking and per-symbol evaluation in one call.
pub fn screen_universe(request: ScreenRequest<'_>, reference: &AdaptiveThresholds) -> ScreenOutcome {
    let regime = request
        .benchmark
        .and_then(|b| detect_from_history(&b.bars, b.volatility_index))
        .unwrap_or_else(MarketRegimeInfo::neutral);

    let thresholds = match request.thresholds {
        Some(t) => t.clone(),
        None => resolve(regime.regime, request.config, reference),
    };

    let sectors = match request.sector_rankings {
        Some(s) => s.clone(),
        None => {
            let benchmark_return = request
                .benchmark
                .and_then(|b| period_return(&b.bars, RELATIVE_STRENGTH_PERIOD));
            SectorRanker::new()
                .with_benchmark_return(benchmark_return)
                .rank(request.stocks)
        }
    };

    let mut screener = Screener::new(thresholds.clone())
        .with_sector_rankings(sectors.clone())
        .with_parallelism(request.parallel);
    if let Some(b) = request.benchmark {
        screener = screener.with_benchmark(b.bars.clone());
    }

    let results = screener.screen(request.stocks);
    let outcome = ScreenOutcome::new(regime, thresholds, sectors, results);
    info!(
        symbols = outcome.funnel.total,
        regime = %outcome.regime.regime,
        strong_buy = outcome.signal_counts.strong_buy,
        buy = outcome.signal_counts.buy,
        watch = outcome.signal_counts.watch,
        "screen complete"
    );
    outcome
}
