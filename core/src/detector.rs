//! The detection pipeline.
//!
//! PIPELINE (single pass, no retries, no partial results):
//!   1. Build the AggregateContext from the dataset.
//!   2. Rule engine -> reason codes per record.
//!   3. Anomaly scorer -> normalized score per record.
//!   4. Fusion -> one Verdict per record.
//!   5. Summary over all verdicts.
//!
//! Steps 2 and 3 read the same dataset and context independently.
//! Nothing here touches state outside the run, so independent runs may
//! execute on separate threads without locking.

use crate::{
    config::DetectionConfig,
    context::AggregateContext,
    error::GuardResult,
    fusion::{fuse, Verdict},
    ingest::{dataset_from_rows, RawRow},
    isolation::ForestParams,
    record::Dataset,
    rules,
    scorer::score_dataset,
    summary::{summarize, AnalysisSummary},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Aligned 1:1 with the input records.
    pub verdicts: Vec<Verdict>,
    pub summary: AnalysisSummary,
}

/// Analyze an already-validated dataset. Never fails: data-quality
/// gaps degrade individual features instead.
pub fn analyze(dataset: &Dataset, config: &DetectionConfig) -> Analysis {
    if dataset.is_empty() {
        return Analysis::default();
    }

    let ctx = AggregateContext::build(dataset);
    log::debug!(
        "context: {} duplicate identities, {} duplicate beneficiaries",
        ctx.duplicate_identity_count(),
        ctx.duplicate_beneficiary_count()
    );

    let reasons: Vec<_> = dataset
        .iter()
        .map(|record| rules::evaluate(record, &ctx, config))
        .collect();
    let anomaly = score_dataset(dataset, &ctx, &ForestParams::from(config));

    let verdicts: Vec<Verdict> = reasons
        .into_iter()
        .zip(&anomaly.scores)
        .map(|(r, &score)| fuse(r, score, config))
        .collect();

    let summary = summarize(
        dataset.records(),
        &verdicts,
        anomaly.outlier_count(),
        config.high_risk_state_count,
    );
    log::info!(
        "analyzed {} records: {} flagged ({:.2}%)",
        summary.total_records,
        summary.flagged_count,
        summary.leakage_percent
    );

    Analysis { verdicts, summary }
}

/// Validate and coerce raw rows, then analyze. Fails only with a
/// schema error; nothing is computed in that case.
pub fn analyze_rows(rows: &[RawRow], config: &DetectionConfig) -> GuardResult<Analysis> {
    let dataset = dataset_from_rows(rows)?;
    Ok(analyze(&dataset, config))
}
