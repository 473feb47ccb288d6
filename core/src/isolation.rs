//! Isolation forest over a fixed-width feature matrix.
//!
//! Anomalies are few and different, so random axis-aligned splits
//! isolate them in fewer steps. Raw scores follow the usual convention:
//! -2^(-E[h(x)] / c(psi)), lower = more anomalous.
//!
//! The forest is fitted per analysis run and never persisted. Each tree
//! draws from its own ModelRng stream (seed, tree index).

use crate::{
    config::DetectionConfig,
    rng::ModelRng,
    types::{FeatureRow, FEATURE_COUNT},
};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl From<&DetectionConfig> for ForestParams {
    fn from(cfg: &DetectionConfig) -> Self {
        Self {
            n_estimators: cfg.n_estimators,
            max_samples: cfg.max_samples,
            contamination: cfg.contamination,
            seed: cfg.random_seed,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit on `rows`. Returns None with fewer than two rows: nothing
    /// can be isolated from nothing.
    pub fn fit(rows: &[FeatureRow], params: &ForestParams) -> Option<Self> {
        if rows.len() < 2 || params.n_estimators == 0 {
            return None;
        }
        let sample_size = params.max_samples.clamp(2, rows.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        let trees: Vec<Node> = (0..params.n_estimators)
            .map(|i| {
                let mut rng = ModelRng::new(params.seed, i as u64);
                let sample = rng.sample_indices(rows.len(), sample_size);
                grow(rows, sample, 0, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
        };
        let training_scores = forest.score_samples(rows);
        forest.offset = percentile(&training_scores, params.contamination * 100.0);
        log::debug!(
            "isolation forest: {} trees, psi={}, height limit {}, offset {:.4}",
            forest.trees.len(),
            sample_size,
            height_limit,
            forest.offset
        );
        Some(forest)
    }

    /// Raw anomaly score per row. Lower = more anomalous, range [-1, 0).
    pub fn score_samples(&self, rows: &[FeatureRow]) -> Vec<f64> {
        let norm = average_path_length(self.sample_size);
        rows.iter()
            .map(|row| {
                let total: f64 = self.trees.iter().map(|t| path_length(t, row)).sum();
                let mean = total / self.trees.len() as f64;
                -(2f64.powf(-mean / norm))
            })
            .collect()
    }

    /// Positive = inlier, negative = outlier.
    pub fn decision_function(&self, rows: &[FeatureRow]) -> Vec<f64> {
        self.score_samples(rows)
            .into_iter()
            .map(|s| s - self.offset)
            .collect()
    }

    pub fn predict_outliers(&self, rows: &[FeatureRow]) -> Vec<bool> {
        self.decision_function(rows)
            .into_iter()
            .map(|d| d < 0.0)
            .collect()
    }
}

fn grow(
    rows: &[FeatureRow],
    indices: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut ModelRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let splittable: Vec<(usize, f64, f64)> = (0..FEATURE_COUNT)
        .filter_map(|f| {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(rows[i][f]), hi.max(rows[i][f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();
    if splittable.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, lo, hi) = splittable[rng.below(splittable.len())];
    let threshold = split_threshold(lo, hi, rng.next_f64());
    let (left, right): (Vec<usize>, Vec<usize>) =
        indices.into_iter().partition(|&i| rows[i][feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(rows, left, depth + 1, height_limit, rng)),
        right: Box::new(grow(rows, right, depth + 1, height_limit, rng)),
    }
}

/// Threshold in [lo, hi) for a draw in [0, 1), so both sides of the
/// split are non-empty. `lo + draw * (hi - lo)` can round up to `hi`;
/// that case falls back to `lo`.
fn split_threshold(lo: f64, hi: f64, draw: f64) -> f64 {
    let t = lo + draw * (hi - lo);
    if t < hi {
        t
    } else {
        lo
    }
}

fn path_length(tree: &Node, row: &FeatureRow) -> f64 {
    let mut node = tree;
    let mut depth = 0.0;
    loop {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                node = if row[*feature] <= *threshold {
                    &**left
                } else {
                    &**right
                };
                depth += 1.0;
            }
            Node::Leaf { size } => return depth + average_path_length(*size),
        }
    }
}

/// c(n): average path length of an unsuccessful BST search over n points.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile, `pct` in [0, 100].
fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
