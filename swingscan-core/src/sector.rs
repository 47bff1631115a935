//! Sector rotation ranking.
//!
//! Each sector gets an average relative strength (member 63-bar move minus
//! the benchmark move), a breadth (share of members above EMA50) and a momentum
//! composite of the two. The strongest three sectors earn a score bonus, the
//! weakest three a penalty, provided at least six sectors are present.
//!
//! Members with too little history for a 63-bar return still count toward
//! breadth and member count but are left out of the relative-strength mean;
//! a one-day snapshot move is not on the same scale.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::StockSnapshot;
use crate::indicators::relative_strength::{period_return, RELATIVE_STRENGTH_PERIOD};
use crate::indicators::{last_finite, Ema, Indicator};

pub const SECTOR_BONUS: i32 = 5;
pub const SECTOR_PENALTY: i32 = -5;
/// Sectors at each end that receive a bonus or penalty.
pub const SECTOR_TIER_SIZE: usize = 3;
/// Below this many distinct sectors nobody gets a bonus or penalty.
pub const MIN_SECTORS_FOR_BONUS: usize = 6;
const BREADTH_EMA_PERIOD: usize = 50;
const RS_WEIGHT: f64 = 0.6;
const BREADTH_WEIGHT: f64 = 0.4;
/// Maps breadth (0..1, centred on 0.5) onto a ±10 percentage-point scale.
const BREADTH_SCALE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRank {
    pub sector: String,
    pub relative_strength: f64,
    pub breadth: f64,
    pub momentum_composite: f64,
    /// 1-based position after ordering.
    pub momentum_rank: usize,
    pub member_count: usize,
    pub score_bonus: i32,
}

/// Ranked sectors, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorRankings {
    ranks: Vec<SectorRank>,
}

impl SectorRankings {
    pub fn get(&self, sector: &str) -> Option<&SectorRank> {
        self.ranks.iter().find(|r| r.sector == sector)
    }

    /// Score adjustment for a sector; 0 when the sector is unknown.
    pub fn bonus_for(&self, sector: &str) -> i32 {
        self.get(sector).map_or(0, |r| r.score_bonus)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectorRank> {
        self.ranks.iter()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

struct MemberStats {
    sector: String,
    /// 63-bar percent return; `None` when history is too short.
    change: Option<f64>,
    above_ema50: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SectorRanker {
    benchmark_return: Option<f64>,
}

impl SectorRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percent move of the benchmark over the ranking window. Without it the
    /// equal-weighted mean over members with a full-window return is used.
    pub fn with_benchmark_return(mut self, benchmark_return: Option<f64>) -> Self {
        self.benchmark_return = benchmark_return.filter(|r| r.is_finite());
        self
    }

    pub fn rank(&self, stocks: &[StockSnapshot]) -> SectorRankings {
        let members: Vec<MemberStats> = stocks.par_iter().map(member_stats).collect();
        if members.is_empty() {
            return SectorRankings::default();
        }

        let benchmark = self
            .benchmark_return
            .or_else(|| mean(members.iter().filter_map(|m| m.change)))
            .unwrap_or(0.0);

        let mut groups: BTreeMap<&str, Vec<&MemberStats>> = BTreeMap::new();
        for m in &members {
            groups.entry(m.sector.as_str()).or_default().push(m);
        }

        let mut ranks: Vec<SectorRank> = groups
            .into_iter()
            .map(|(sector, group)| {
                let count = group.len() as f64;
                let relative_strength =
                    mean(group.iter().filter_map(|m| m.change).map(|c| c - benchmark))
                        .unwrap_or(0.0);
                let breadth = group.iter().filter(|m| m.above_ema50).count() as f64 / count;
                SectorRank {
                    sector: sector.to_string(),
                    relative_strength,
                    breadth,
                    momentum_composite: RS_WEIGHT * relative_strength
                        + BREADTH_WEIGHT * (breadth - 0.5) * BREADTH_SCALE,
                    momentum_rank: 0,
                    member_count: group.len(),
                    score_bonus: 0,
                }
            })
            .collect();

        ranks.sort_by(|a, b| {
            b.momentum_composite
                .total_cmp(&a.momentum_composite)
                .then_with(|| b.member_count.cmp(&a.member_count))
                .then_with(|| a.sector.cmp(&b.sector))
        });

        let n = ranks.len();
        for (i, rank) in ranks.iter_mut().enumerate() {
            rank.momentum_rank = i + 1;
            if n >= MIN_SECTORS_FOR_BONUS {
                rank.score_bonus = match i {
                    i if i < SECTOR_TIER_SIZE => SECTOR_BONUS,
                    i if i >= n - SECTOR_TIER_SIZE => SECTOR_PENALTY,
                    _ => 0,
                };
            }
        }

        SectorRankings { ranks }
    }
}

fn member_stats(stock: &StockSnapshot) -> MemberStats {
    let change = period_return(&stock.bars, RELATIVE_STRENGTH_PERIOD);
    let ema50 = last_finite(&Ema::new(BREADTH_EMA_PERIOD).compute(&stock.bars));
    let above_ema50 = ema50.is_some_and(|ema| stock.latest_close() > ema);
    MemberStats {
        sector: stock.sector_key().to_string(),
        change,
        above_ema50,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
