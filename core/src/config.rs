//! Detection thresholds and model parameters.
//!
//! Every constant the rules, the forest, and fusion depend on lives
//! here so dashboards and tests can introspect it.

use serde::{Deserialize, Serialize};

// ── Rule thresholds ──────────────────────────────────────────────────────────

/// Annual income above which a subsidy recipient is suspicious (₹).
pub const HIGH_INCOME_THRESHOLD: f64 = 250_000.0;
/// Claims per (distributor, date) tolerated before flagging.
pub const DISTRIBUTOR_DAILY_LIMIT: usize = 2;
/// Multiple of the (state, subsidy type) mean that counts as excessive.
pub const EXCESS_AMOUNT_MULTIPLIER: f64 = 3.0;
/// Other records needed in a (state, subsidy type) pair for its mean to count.
pub const MIN_PEER_RECORDS: usize = 2;

// ── Anomaly model ────────────────────────────────────────────────────────────

/// Expected fraction of anomalous records in any dataset.
pub const CONTAMINATION: f64 = 0.08;
pub const N_ESTIMATORS: usize = 100;
pub const MAX_SAMPLES: usize = 256;
pub const RANDOM_SEED: u64 = 42;

// ── Fusion ───────────────────────────────────────────────────────────────────

pub const RULE_WEIGHT: f64 = 0.6;
pub const ANOMALY_WEIGHT: f64 = 0.4;
/// fraud_score strictly above this flags the record.
pub const DECISION_THRESHOLD: f64 = 0.5;
/// Fired rule count that flags a record regardless of score.
pub const MIN_RULES_FOR_FLAG: usize = 2;
/// Anomaly score above which descriptions mention the model.
pub const HIGH_ANOMALY_NOTE_THRESHOLD: f64 = 0.7;
pub const HIGH_RISK_STATE_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub high_income_threshold: f64,
    pub distributor_daily_limit: usize,
    pub excess_amount_multiplier: f64,
    pub min_peer_records: usize,
    pub contamination: f64,
    pub n_estimators: usize,
    pub max_samples: usize,
    pub random_seed: u64,
    pub rule_weight: f64,
    pub anomaly_weight: f64,
    pub decision_threshold: f64,
    pub min_rules_for_flag: usize,
    pub high_anomaly_note_threshold: f64,
    pub high_risk_state_count: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            high_income_threshold: HIGH_INCOME_THRESHOLD,
            distributor_daily_limit: DISTRIBUTOR_DAILY_LIMIT,
            excess_amount_multiplier: EXCESS_AMOUNT_MULTIPLIER,
            min_peer_records: MIN_PEER_RECORDS,
            contamination: CONTAMINATION,
            n_estimators: N_ESTIMATORS,
            max_samples: MAX_SAMPLES,
            random_seed: RANDOM_SEED,
            rule_weight: RULE_WEIGHT,
            anomaly_weight: ANOMALY_WEIGHT,
            decision_threshold: DECISION_THRESHOLD,
            min_rules_for_flag: MIN_RULES_FOR_FLAG,
            high_anomaly_note_threshold: HIGH_ANOMALY_NOTE_THRESHOLD,
            high_risk_state_count: HIGH_RISK_STATE_COUNT,
        }
    }
}

impl DetectionConfig {
    /// Load from a JSON file. Missing keys fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DetectionConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            anyhow::bail!("contamination must be in (0, 0.5], got {}", self.contamination);
        }
        if self.rule_weight < 0.0 || self.anomaly_weight < 0.0 {
            anyhow::bail!("fusion weights must be non-negative");
        }
        if self.n_estimators == 0 {
            anyhow::bail!("n_estimators must be at least 1");
        }
        if self.max_samples < 2 {
            anyhow::bail!("max_samples must be at least 2, got {}", self.max_samples);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: DetectionConfig =
            serde_json::from_str(r#"{ "high_income_threshold": 300000.0 }"#).unwrap();
        assert_eq!(cfg.high_income_threshold, 300_000.0);
        assert_eq!(cfg.contamination, CONTAMINATION);
        assert_eq!(cfg.random_seed, RANDOM_SEED);
    }

    #[test]
    fn default_is_valid() {
        DetectionConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_contamination() {
        let cfg = DetectionConfig {
            contamination: 0.9,
            ..DetectionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
