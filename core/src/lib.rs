//! Subsidy-claim fraud detection: deterministic rules fused with an
//! isolation-forest anomaly score.

pub mod config;
pub mod context;
pub mod detector;
pub mod engine;
pub mod error;
pub mod features;
pub mod fusion;
pub mod ingest;
pub mod isolation;
pub mod record;
pub mod result;
pub mod rng;
pub mod rules;
pub mod scorer;
pub mod store;
pub mod summary;
pub mod types;

pub use detector::{analyze, analyze_rows, Analysis};
pub use error::{GuardError, GuardResult};
