//! Shared primitive types used across the detection core.

/// Identifier assigned to an uploaded dataset by the engine.
pub type FileId = String;

/// A `(location_state, subsidy_type)` grouping key.
pub type PairKey = (String, String);

/// Number of feature columns fed to the anomaly model.
pub const FEATURE_COUNT: usize = 4;

/// One row of the anomaly model's feature matrix.
pub type FeatureRow = [f64; FEATURE_COUNT];
