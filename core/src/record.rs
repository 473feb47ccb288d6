//! The canonical claim record and the dataset that carries it.
//!
//! Field names are the stable contract with ingestion and the API layer.
//! Numeric fields are optional. A missing, negative or non-finite
//! income/amount is excluded from numeric aggregates, never zeroed:
//! read them through `valid_income`/`valid_amount`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One subsidy claim row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyRecord {
    pub beneficiary_id: String,
    #[serde(default)]
    pub name: String,
    /// National identity number. Expected to be 12 digits; not enforced.
    pub aadhaar: String,
    pub income: Option<f64>,
    pub location_state: String,
    pub subsidy_type: String,
    pub amount: Option<f64>,
    pub claim_date: Option<NaiveDate>,
    pub distributor_id: String,
}

impl SubsidyRecord {
    /// `(state, subsidy_type)` key, or None when either category is blank.
    pub fn pair_key(&self) -> Option<(&str, &str)> {
        if self.location_state.is_empty() || self.subsidy_type.is_empty() {
            None
        } else {
            Some((self.location_state.as_str(), self.subsidy_type.as_str()))
        }
    }

    /// `(distributor, date)` key, or None when either part is missing.
    pub fn distributor_day(&self) -> Option<(&str, NaiveDate)> {
        match self.claim_date {
            Some(date) if !self.distributor_id.is_empty() => {
                Some((self.distributor_id.as_str(), date))
            }
            _ => None,
        }
    }

    /// Income if present, finite and non-negative.
    pub fn valid_income(&self) -> Option<f64> {
        self.income.filter(|&v| usable(v))
    }

    /// Amount if present, finite and non-negative.
    pub fn valid_amount(&self) -> Option<f64> {
        self.amount.filter(|&v| usable(v))
    }

    /// True when both numeric fields are usable by the anomaly model.
    pub fn has_numeric_features(&self) -> bool {
        self.valid_income().is_some() && self.valid_amount().is_some()
    }
}

fn usable(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// An ordered batch of records sharing one schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<SubsidyRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SubsidyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SubsidyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubsidyRecord> {
        self.records.iter()
    }

}

impl From<Vec<SubsidyRecord>> for Dataset {
    fn from(records: Vec<SubsidyRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a SubsidyRecord;
    type IntoIter = std::slice::Iter<'a, SubsidyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
