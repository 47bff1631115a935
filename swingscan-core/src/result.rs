//! Result aggregation: per-symbol results, funnel counters, signal counts,
//! and the capped summary handed to snapshot stores.

use serde::{Deserialize, Serialize};

use crate::domain::StockSnapshot;
use crate::indicators::IndicatorSet;
use crate::pipeline::{PhaseFlags, RiskAssessment, Signal};
use crate::regime::{MarketRegime, MarketRegimeInfo};
use crate::sector::SectorRankings;
use crate::thresholds::AdaptiveThresholds;

/// Descriptive fields of the evaluated symbol, without its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRef {
    pub symbol: String,
    pub exchange: String,
    pub name: String,
    pub sector: String,
    pub last_price: f64,
    pub change_percent: f64,
    pub market_cap: f64,
    pub avg_turnover: f64,
}

impl From<&StockSnapshot> for StockRef {
    fn from(s: &StockSnapshot) -> Self {
        Self {
            symbol: s.symbol.clone(),
            exchange: s.exchange.clone(),
            name: s.name.clone(),
            sector: s.sector_key().to_string(),
            last_price: s.last_price,
            change_percent: s.change_percent,
            market_cap: s.market_cap,
            avg_turnover: s.avg_turnover,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerResult {
    pub stock: StockRef,
    pub indicators: IndicatorSet,
    pub phase1: bool,
    pub phase2: bool,
    pub phase3: bool,
    pub phase4: bool,
    pub phase5: bool,
    pub phase6: RiskAssessment,
    /// 0..=100.
    pub overall_score: u8,
    pub signal: Signal,
    pub sector_bonus: i32,
    pub rationale: String,
}

impl ScreenerResult {
    pub fn flags(&self) -> PhaseFlags {
        PhaseFlags {
            phase1: self.phase1,
            phase2: self.phase2,
            phase3: self.phase3,
            phase4: self.phase4,
            phase5: self.phase5,
        }
    }
}

/// How many symbols passed each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFunnel {
    pub total: usize,
    pub phase1: usize,
    pub phase2: usize,
    pub phase3: usize,
    pub phase4: usize,
    pub phase5: usize,
}

impl PhaseFunnel {
    pub fn from_results(results: &[ScreenerResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Default::default()
            },
            |mut f, r| {
                f.phase1 += usize::from(r.phase1);
                f.phase2 += usize::from(r.phase2);
                f.phase3 += usize::from(r.phase3);
                f.phase4 += usize::from(r.phase4);
                f.phase5 += usize::from(r.phase5);
                f
            },
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub strong_buy: usize,
    pub buy: usize,
    pub watch: usize,
    pub neutral: usize,
    pub avoid: usize,
}

impl SignalCounts {
    pub fn from_results(results: &[ScreenerResult]) -> Self {
        let mut counts = Self::default();
        for r in results {
            *counts.slot(r.signal) += 1;
        }
        counts
    }

    pub fn get(&self, signal: Signal) -> usize {
        match signal {
            Signal::StrongBuy => self.strong_buy,
            Signal::Buy => self.buy,
            Signal::Watch => self.watch,
            Signal::Neutral => self.neutral,
            Signal::Avoid => self.avoid,
        }
    }

    fn slot(&mut self, signal: Signal) -> &mut usize {
        match signal {
            Signal::StrongBuy => &mut self.strong_buy,
            Signal::Buy => &mut self.buy,
            Signal::Watch => &mut self.watch,
            Signal::Neutral => &mut self.neutral,
            Signal::Avoid => &mut self.avoid,
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenOutcome {
    pub regime: MarketRegimeInfo,
    pub thresholds: AdaptiveThresholds,
    pub sector_rankings: SectorRankings,
    pub results: Vec<ScreenerResult>,
    pub funnel: PhaseFunnel,
    pub signal_counts: SignalCounts,
}

impl ScreenOutcome {
    pub fn new(
        regime: MarketRegimeInfo,
        thresholds: AdaptiveThresholds,
        sector_rankings: SectorRankings,
        results: Vec<ScreenerResult>,
    ) -> Self {
        let funnel = PhaseFunnel::from_results(&results);
        let signal_counts = SignalCounts::from_results(&results);
        Self {
            regime,
            thresholds,
            sector_rankings,
            results,
            funnel,
            signal_counts,
        }
    }

    /// BLAKE3 hex digest of the serialized result list.
    pub fn digest(&self) -> String {
        results_digest(&self.results)
    }
}

pub fn results_digest(results: &[ScreenerResult]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in results {
        // serializing plain data into memory cannot fail
        let bytes = serde_json::to_vec(r).unwrap_or_default();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    hasher.finalize().to_hex().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub symbol: String,
    pub sector: String,
    pub signal: Signal,
    pub overall_score: u8,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward_ratio: f64,
}

/// Capped top-N view of a run for snapshot stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub digest: String,
    pub regime: MarketRegime,
    pub funnel: PhaseFunnel,
    pub signal_counts: SignalCounts,
    pub top: Vec<SummaryEntry>,
}

impl SnapshotSummary {
    /// Top `top_n` results by score; equal scores keep input order.
    pub fn from_outcome(outcome: &ScreenOutcome, top_n: usize) -> Self {
        let mut ranked: Vec<&ScreenerResult> = outcome.results.iter().collect();
        ranked.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        let top = ranked
            .into_iter()
            .take(top_n)
            .map(|r| SummaryEntry {
                symbol: r.stock.symbol.clone(),
                sector: r.stock.sector.clone(),
                signal: r.signal,
                overall_score: r.overall_score,
                entry_price: r.phase6.entry_price,
                stop_loss: r.phase6.stop_loss,
                target: r.phase6.target,
                risk_reward_ratio: r.phase6.risk_reward_ratio,
            })
            .collect();
        Self {
            digest: outcome.digest(),
            regime: outcome.regime.regime,
            funnel: outcome.funnel,
            signal_counts: outcome.signal_counts,
            top,
        }
    }
}
