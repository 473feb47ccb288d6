//! The stored and served shape of one analysis.

use crate::{
    detector::Analysis,
    fusion::Verdict,
    record::{Dataset, SubsidyRecord},
    summary::AnalysisSummary,
    types::FileId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedRecord {
    #[serde(flatten)]
    pub record: SubsidyRecord,
    #[serde(flatten)]
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_id: FileId,
    pub summary: AnalysisSummary,
    pub flagged_records: Vec<FlaggedRecord>,
    pub total_records: usize,
    pub flagged_count: usize,
    pub leakage_percent: f64,
}

impl AnalysisResult {
    pub fn new(file_id: FileId, dataset: &Dataset, analysis: Analysis) -> Self {
        let flagged_records = dataset
            .iter()
            .zip(analysis.verdicts)
            .filter(|(_, v)| v.is_fraud)
            .map(|(record, verdict)| FlaggedRecord {
                record: record.clone(),
                verdict,
            })
            .collect();
        let summary = analysis.summary;
        Self {
            file_id,
            total_records: summary.total_records,
            flagged_count: summary.flagged_count,
            leakage_percent: summary.leakage_percent,
            flagged_records,
            summary,
        }
    }
}
