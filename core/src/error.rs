use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Schema error: required field '{field}' missing in {missing} of {total} records")]
    Schema {
        field: &'static str,
        missing: usize,
        total: usize,
    },

    #[error("File ID '{file_id}' not found")]
    FileNotFound { file_id: String },

    #[error("Results for file ID '{file_id}' not found. Analyze the data first.")]
    ResultsNotFound { file_id: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GuardResult<T> = Result<T, GuardError>;
