//! Dataset-wide aggregates shared read-only by rules and features.
//!
//! Built once at the start of an analysis run, dropped at the end.
//! Keys borrow from the dataset, so the context lives no longer than it.
//! Records without a valid amount do not contribute to pair means;
//! blank identifiers never count as duplicates.

use crate::record::{Dataset, SubsidyRecord};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairStats {
    pub amount_sum: f64,
    /// Records in the pair with a usable amount.
    pub count: usize,
}

impl PairStats {
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.amount_sum / self.count as f64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AggregateContext<'a> {
    pair_stats: HashMap<(&'a str, &'a str), PairStats>,
    distributor_day_counts: HashMap<(&'a str, NaiveDate), usize>,
    duplicate_identities: HashSet<&'a str>,
    duplicate_beneficiaries: HashSet<&'a str>,
}

impl<'a> AggregateContext<'a> {
    pub fn build(dataset: &'a Dataset) -> Self {
        let mut pair_stats: HashMap<(&str, &str), PairStats> = HashMap::new();
        let mut distributor_day_counts: HashMap<(&str, NaiveDate), usize> = HashMap::new();
        let mut identity_counts: HashMap<&str, usize> = HashMap::new();
        let mut beneficiary_counts: HashMap<&str, usize> = HashMap::new();

        for record in dataset {
            if let (Some(key), Some(amount)) = (record.pair_key(), record.valid_amount()) {
                let stats = pair_stats.entry(key).or_default();
                stats.amount_sum += amount;
                stats.count += 1;
            }
            if let Some(key) = record.distributor_day() {
                *distributor_day_counts.entry(key).or_insert(0) += 1;
            }
            if !record.aadhaar.is_empty() {
                *identity_counts.entry(record.aadhaar.as_str()).or_insert(0) += 1;
            }
            if !record.beneficiary_id.is_empty() {
                *beneficiary_counts
                    .entry(record.beneficiary_id.as_str())
                    .or_insert(0) += 1;
            }
        }

        Self {
            pair_stats,
            distributor_day_counts,
            duplicate_identities: repeated(identity_counts),
            duplicate_beneficiaries: repeated(beneficiary_counts),
        }
    }

    pub fn pair_stats(&self, record: &SubsidyRecord) -> Option<PairStats> {
        let key = record.pair_key()?;
        self.pair_stats.get(&key).copied()
    }

    /// Mean claim amount for the record's (state, subsidy type) pair.
    pub fn pair_mean(&self, record: &SubsidyRecord) -> Option<f64> {
        self.pair_stats(record).and_then(|s| s.mean())
    }

    /// Records other than `record` that contribute to its pair mean.
    pub fn pair_peers(&self, record: &SubsidyRecord) -> usize {
        let count = self.pair_stats(record).map_or(0, |s| s.count);
        let own = usize::from(record.valid_amount().is_some());
        count.saturating_sub(own)
    }

    /// Claims sharing this record's (distributor, date), itself included.
    /// Zero when the record has no distributor or date.
    pub fn distributor_volume(&self, record: &SubsidyRecord) -> usize {
        record
            .distributor_day()
            .and_then(|key| self.distributor_day_counts.get(&key))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_duplicate_identity(&self, record: &SubsidyRecord) -> bool {
        self.duplicate_identities.contains(record.aadhaar.as_str())
    }

    pub fn is_duplicate_beneficiary(&self, record: &SubsidyRecord) -> bool {
        self.duplicate_beneficiaries
            .contains(record.beneficiary_id.as_str())
    }

    pub fn duplicate_identity_count(&self) -> usize {
        self.duplicate_identities.len()
    }

    pub fn duplicate_beneficiary_count(&self) -> usize {
        self.duplicate_beneficiaries.len()
    }
}

fn repeated(counts: HashMap<&str, usize>) -> HashSet<&str> {
    counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(id, _)| id)
        .collect()
}
