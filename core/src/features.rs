//! Numeric feature matrix for the anomaly model.
//!
//! Row-major, fixed width. Column positions are resolved once via
//! `Feature::column`, never by name lookup at scoring time.

use crate::{
    context::AggregateContext,
    record::{Dataset, SubsidyRecord},
    types::{FeatureRow, FEATURE_COUNT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Income,
    Amount,
    DistributorVolume,
    AmountToPairMean,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Income,
        Feature::Amount,
        Feature::DistributorVolume,
        Feature::AmountToPairMean,
    ];

    pub fn column(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Amount => "amount",
            Self::DistributorVolume => "distributor_volume",
            Self::AmountToPairMean => "amount_to_pair_mean",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    rows: Vec<FeatureRow>,
    /// For each dataset record, its row in `rows` (None = excluded).
    row_of_record: Vec<Option<usize>>,
}

impl FeatureMatrix {
    /// Build one row per record with finite, non-negative income and amount.
    pub fn build(dataset: &Dataset, ctx: &AggregateContext<'_>) -> Self {
        let mut rows = Vec::with_capacity(dataset.len());
        let row_of_record: Vec<Option<usize>> = dataset
            .iter()
            .map(|record| {
                feature_row(record, ctx).map(|row| {
                    rows.push(row);
                    rows.len() - 1
                })
            })
            .collect();
        Self {
            rows,
            row_of_record,
        }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn usable_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn record_count(&self) -> usize {
        self.row_of_record.len()
    }

    pub fn row_for_record(&self, record_index: usize) -> Option<usize> {
        self.row_of_record.get(record_index).copied().flatten()
    }
}

fn feature_row(record: &SubsidyRecord, ctx: &AggregateContext<'_>) -> Option<FeatureRow> {
    let (Some(income), Some(amount)) = (record.valid_income(), record.valid_amount()) else {
        return None;
    };
    let volume = ctx.distributor_volume(record).max(1) as f64;
    let ratio = match ctx.pair_mean(record) {
        Some(mean) if mean > 0.0 => amount / mean,
        _ => 1.0,
    };
    let mut row = [0.0; FEATURE_COUNT];
    row[Feature::Income.column()] = income;
    row[Feature::Amount.column()] = amount;
    row[Feature::DistributorVolume.column()] = volume;
    row[Feature::AmountToPairMean.column()] = ratio;
    Some(row)
}
