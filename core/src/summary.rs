//! Reduce per-record verdicts into dataset-level statistics.

use crate::{fusion::Verdict, record::SubsidyRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRisk {
    pub state: String,
    pub flagged_count: usize,
    pub flagged_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_records: usize,
    pub flagged_count: usize,
    /// flagged_count / total_records * 100; 0 for an empty dataset.
    pub leakage_percent: f64,
    pub total_amount: f64,
    pub flagged_amount: f64,
    /// flagged_amount / total_amount * 100; 0 when no amount was claimed.
    pub amount_leakage_percent: f64,
    pub anomaly_outliers: usize,
    pub high_risk_states: Vec<StateRisk>,
}

/// `records` and `verdicts` must be aligned 1:1.
pub fn summarize(
    records: &[SubsidyRecord],
    verdicts: &[Verdict],
    anomaly_outliers: usize,
    top_states: usize,
) -> AnalysisSummary {
    debug_assert_eq!(records.len(), verdicts.len());

    let total_records = records.len();
    let mut flagged_count = 0usize;
    let mut total_amount = 0.0;
    let mut flagged_amount = 0.0;
    let mut by_state: HashMap<&str, (usize, f64)> = HashMap::new();

    for (record, verdict) in records.iter().zip(verdicts) {
        let amount = record.valid_amount().unwrap_or(0.0);
        total_amount += amount;
        if !verdict.is_fraud {
            continue;
        }
        flagged_count += 1;
        flagged_amount += amount;
        if !record.location_state.is_empty() {
            let entry = by_state.entry(record.location_state.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += amount;
        }
    }

    AnalysisSummary {
        total_records,
        flagged_count,
        leakage_percent: percent(flagged_count as f64, total_records as f64),
        total_amount,
        flagged_amount,
        amount_leakage_percent: percent(flagged_amount, total_amount),
        anomaly_outliers,
        high_risk_states: rank_states(by_state, top_states),
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Flagged count desc, then flagged amount desc, then state name asc.
fn rank_states(by_state: HashMap<&str, (usize, f64)>, top: usize) -> Vec<StateRisk> {
    let mut states: Vec<StateRisk> = by_state
        .into_iter()
        .map(|(state, (flagged_count, flagged_amount))| StateRisk {
            state: state.to_string(),
            flagged_count,
            flagged_amount,
        })
        .collect();
    states.sort_by(|a, b| {
        b.flagged_count
            .cmp(&a.flagged_count)
            .then_with(|| b.flagged_amount.total_cmp(&a.flagged_amount))
            .then_with(|| a.state.cmp(&b.state))
    });
    states.truncate(top);
    states
}
