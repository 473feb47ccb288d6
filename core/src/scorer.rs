//! Anomaly scorer: dataset in, one normalized score per record out.
//!
//! Pure function of (dataset, context, params). The forest is refit on
//! every call; the seed is part of `ForestParams`, never a global.

use crate::{
    context::AggregateContext,
    features::{Feature, FeatureMatrix},
    isolation::{ForestParams, IsolationForest},
    record::Dataset,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyScores {
    /// Per record, in [0, 1]; 1.0 = most anomalous in this dataset.
    pub scores: Vec<f64>,
    /// Per record, true when the forest puts it past the contamination offset.
    pub outliers: Vec<bool>,
}

impl AnomalyScores {
    fn zeros(n: usize) -> Self {
        Self {
            scores: vec![0.0; n],
            outliers: vec![false; n],
        }
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers.iter().filter(|&&o| o).count()
    }
}

pub fn score_dataset(
    dataset: &Dataset,
    ctx: &AggregateContext<'_>,
    params: &ForestParams,
) -> AnomalyScores {
    let matrix = FeatureMatrix::build(dataset, ctx);
    let excluded = matrix.record_count() - matrix.usable_rows();
    if excluded > 0 {
        log::debug!("{excluded} records lack income or amount; scored 0.0");
    }

    log::debug!(
        "feature matrix: {} rows x {:?}",
        matrix.usable_rows(),
        Feature::ALL.map(|f| f.name())
    );

    let Some(forest) = IsolationForest::fit(matrix.rows(), params) else {
        log::debug!(
            "only {} usable feature rows; anomaly scores default to 0.0",
            matrix.usable_rows()
        );
        return AnomalyScores::zeros(dataset.len());
    };

    let raw = forest.score_samples(matrix.rows());
    let outlier_rows = forest.predict_outliers(matrix.rows());
    let normalized = normalize(&raw);

    let mut out = AnomalyScores::zeros(dataset.len());
    for i in 0..dataset.len() {
        if let Some(row) = matrix.row_for_record(i) {
            out.scores[i] = normalized[row];
            out.outliers[i] = outlier_rows[row];
        }
    }
    out
}

/// Min-max rescale so the lowest raw score maps to 1.0.
/// A zero range maps everything to 0.0.
fn normalize(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON {
        return vec![0.0; raw.len()];
    }
    raw.iter()
        .map(|&s| ((max - s) / range).clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_inverts_and_rescales() {
        let n = normalize(&[-0.8, -0.5, -0.4]);
        assert_eq!(n[0], 1.0);
        assert_eq!(n[2], 0.0);
        assert!((n[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_range_is_all_zero() {
        assert_eq!(normalize(&[-0.5, -0.5, -0.5]), vec![0.0; 3]);
        assert_eq!(normalize(&[-0.5]), vec![0.0]);
    }
}
