//! Deterministic rationale string: one segment per phase.

use super::phases::PhaseReport;
use super::risk::RiskAssessment;

pub fn build(reports: &[PhaseReport; 5], risk: &RiskAssessment) -> String {
    let mut parts: Vec<String> = reports
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let verdict = if r.passed { "PASS" } else { "FAIL" };
            format!("P{} {verdict}: {}", i + 1, r.reasons.join(", "))
        })
        .collect();

    let verdict = if risk.meets_minimum { "PASS" } else { "FAIL" };
    parts.push(format!(
        "P6 {verdict}: entry {:.2} stop {:.2} target {:.2} R:R {:.2} qty {}",
        risk.entry_price, risk.stop_loss, risk.target, risk.risk_reward_ratio, risk.quantity
    ));
    parts.join(" | ")
}
