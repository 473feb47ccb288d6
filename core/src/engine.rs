//! GuardEngine: the facade collaborators call.
//!
//! FLOW (one file id):
//!   1. upload()  validates rows, assigns a UUID, stores the dataset.
//!   2. analyze() loads the dataset, runs detection, stores the result.
//!   3. results() returns the stored result.
//!
//! The engine holds no per-run state. Detection allocates everything it
//! needs per call; the store serializes writers.

use crate::{
    config::DetectionConfig,
    detector,
    error::{GuardError, GuardResult},
    ingest::{dataset_from_rows, RawRow},
    record::SubsidyRecord,
    result::AnalysisResult,
    store::AnalysisStore,
    types::FileId,
};
use serde::{Deserialize, Serialize};

/// Rows returned as a preview after upload.
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub file_id: FileId,
    pub preview: Vec<SubsidyRecord>,
    pub total_rows: usize,
}

pub struct GuardEngine {
    pub store: AnalysisStore,
    pub config: DetectionConfig,
}

impl GuardEngine {
    pub fn new(store: AnalysisStore, config: DetectionConfig) -> Self {
        Self { store, config }
    }

    /// Migrated in-memory store with default config. Used in tests.
    pub fn build_test() -> GuardResult<Self> {
        let store = AnalysisStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store, DetectionConfig::default()))
    }

    pub fn upload(&self, rows: &[RawRow]) -> GuardResult<UploadReceipt> {
        let dataset = dataset_from_rows(rows)?;
        let file_id = uuid::Uuid::new_v4().to_string();
        self.store.save_upload(&file_id, &dataset)?;
        log::info!("stored upload {file_id} ({} rows)", dataset.len());
        Ok(UploadReceipt {
            preview: dataset.iter().take(PREVIEW_ROWS).cloned().collect(),
            total_rows: dataset.len(),
            file_id,
        })
    }

    pub fn analyze(&self, file_id: &str) -> GuardResult<AnalysisResult> {
        let dataset = self
            .store
            .get_data(file_id)?
            .ok_or_else(|| GuardError::FileNotFound {
                file_id: file_id.to_string(),
            })?;
        let analysis = detector::analyze(&dataset, &self.config);
        let result = AnalysisResult::new(file_id.to_string(), &dataset, analysis);
        self.store.save_results(&result)?;
        Ok(result)
    }

    pub fn results(&self, file_id: &str) -> GuardResult<AnalysisResult> {
        self.store
            .get_results(file_id)?
            .ok_or_else(|| GuardError::ResultsNotFound {
                file_id: file_id.to_string(),
            })
    }

    pub fn delete(&self, file_id: &str) -> GuardResult<bool> {
        self.store.delete_data(file_id)
    }

    pub fn file_ids(&self) -> GuardResult<Vec<FileId>> {
        self.store.all_file_ids()
    }
}
