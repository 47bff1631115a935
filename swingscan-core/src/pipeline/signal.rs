//! Final signal labels and the classification rule.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const STRONG_BUY_MIN_SCORE: u8 = 80;
pub const BUY_MIN_SCORE: u8 = 60;
/// Momentum sub-conditions (of five) needed to pass phase 3.
pub const MOMENTUM_VOTES_REQUIRED: usize = 3;
/// Volume sub-conditions (of three) needed to pass phase 4.
pub const VOLUME_VOTES_REQUIRED: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Watch,
    Neutral,
    Avoid,
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::StrongBuy,
        Signal::Buy,
        Signal::Watch,
        Signal::Neutral,
        Signal::Avoid,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Watch => "WATCH",
            Signal::Neutral => "NEUTRAL",
            Signal::Avoid => "AVOID",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::Buy)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pass flags of phases 1-5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFlags {
    pub phase1: bool,
    pub phase2: bool,
    pub phase3: bool,
    pub phase4: bool,
    pub phase5: bool,
}

impl PhaseFlags {
    pub fn all_pass(&self) -> bool {
        self.phase1 && self.phase2 && self.phase3 && self.phase4 && self.phase5
    }
}

/// Map phase outcomes to a signal.
///
/// A failed risk:reward check keeps an otherwise clean symbol at WATCH.
pub fn classify(flags: &PhaseFlags, score: u8, meets_risk_reward: bool) -> Signal {
    if !flags.phase1 {
        return Signal::Avoid;
    }
    if !(flags.phase2 && flags.phase3) {
        return Signal::Neutral;
    }
    if !(flags.phase4 && flags.phase5) || !meets_risk_reward {
        return Signal::Watch;
    }
    if score >= STRONG_BUY_MIN_SCORE {
        Signal::StrongBuy
    } else if score >= BUY_MIN_SCORE {
        Signal::Buy
    } else {
        Signal::Watch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PASS: PhaseFlags = PhaseFlags {
        phase1: true,
        phase2: true,
        phase3: true,
        phase4: true,
        phase5: true,
    };

    #[test]
    fn score_cut_points() {
        assert_eq!(classify(&ALL_PASS, 80, true), Signal::StrongBuy);
        assert_eq!(classify(&ALL_PASS, 79, true), Signal::Buy);
        assert_eq!(classify(&ALL_PASS, 60, true), Signal::Buy);
        assert_eq!(classify(&ALL_PASS, 59, true), Signal::Watch);
    }

    #[test]
    fn risk_reward_gate() {
        assert_eq!(classify(&ALL_PASS, 95, false), Signal::Watch);
    }

    #[test]
    fn phase_cascade() {
        let mut flags = ALL_PASS;
        flags.phase5 = false;
        assert_eq!(classify(&flags, 95, true), Signal::Watch);
        flags.phase3 = false;
        assert_eq!(classify(&flags, 95, true), Signal::Neutral);
        flags.phase1 = false;
        assert_eq!(classify(&flags, 95, true), Signal::Avoid);
    }

    #[test]
    fn serializes_screaming_snake() {
        assert_eq!(serde_json::to_string(&Signal::StrongBuy).unwrap(), "\"STRONG_BUY\"");
    }
}
