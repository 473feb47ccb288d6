//! Score fusion: rule hits + anomaly score -> one verdict per record.

use crate::{
    config::DetectionConfig,
    record::SubsidyRecord,
    rules::{ReasonCode, RULE_COUNT},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub fraud_score: f64,
    pub is_fraud: bool,
    /// Fired rules, in rule evaluation order.
    pub reasons: Vec<ReasonCode>,
    pub anomaly_score: f64,
}

impl Verdict {
    /// Human-readable lines for an investigator.
    pub fn describe(&self, record: &SubsidyRecord, config: &DetectionConfig) -> Vec<String> {
        let mut lines: Vec<String> = self
            .reasons
            .iter()
            .map(|code| match code {
                ReasonCode::DuplicateIdentity => "Duplicate Aadhaar number detected".to_string(),
                ReasonCode::DuplicateBeneficiary => "Duplicate beneficiary ID detected".to_string(),
                ReasonCode::HighIncome => format!(
                    "High income ({}) for subsidy recipient",
                    rupees(record.valid_income().unwrap_or_default())
                ),
                ReasonCode::ExcessDistributorVolume => {
                    "Multiple claims on same date from same distributor".to_string()
                }
                ReasonCode::ExcessClaimAmount => format!(
                    "Claim amount ({}) exceeds {}x average for state/subsidy type",
                    rupees(record.valid_amount().unwrap_or_default()),
                    config.excess_amount_multiplier
                ),
            })
            .collect();
        if self.anomaly_score > config.high_anomaly_note_threshold {
            lines.push(format!("High ML anomaly score ({:.2})", self.anomaly_score));
        }
        lines
    }
}

pub fn fuse(reasons: Vec<ReasonCode>, anomaly_score: f64, config: &DetectionConfig) -> Verdict {
    let fraud_score = (config.rule_weight * rule_strength(reasons.len())
        + config.anomaly_weight * anomaly_score)
        .clamp(0.0, 1.0);
    let is_fraud = fraud_score > config.decision_threshold
        || reasons.iter().any(ReasonCode::is_high_severity)
        || reasons.len() >= config.min_rules_for_flag;
    Verdict {
        fraud_score,
        is_fraud,
        reasons,
        anomaly_score,
    }
}

/// Fired rules over total rules, capped at 1.0.
pub fn rule_strength(fired: usize) -> f64 {
    (fired as f64 / RULE_COUNT as f64).min(1.0)
}

/// "₹1,23,456" style grouping (last three digits, then pairs).
fn rupees(value: f64) -> String {
    let whole = value.round().max(0.0) as u64;
    let digits = whole.to_string();
    if digits.len() <= 3 {
        return format!("₹{digits}");
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("₹{},{}", groups.join(","), tail)
}
