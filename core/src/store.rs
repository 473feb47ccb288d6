//! SQLite persistence for uploads and results.
//!
//! RULE: Only store.rs talks to the database.
//! The connection sits behind a Mutex: one writer at a time, so a
//! single store can be shared by concurrent callers.

use crate::{
    error::{GuardError, GuardResult},
    record::Dataset,
    result::AnalysisResult,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

pub struct AnalysisStore {
    conn: Mutex<Connection>,
}

impl AnalysisStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> GuardResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GuardResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GuardResult<()> {
        self.lock()?
            .execute_batch(include_str!("../../migrations/001_subsidy.sql"))?;
        Ok(())
    }

    fn lock(&self) -> GuardResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| GuardError::LockPoisoned)
    }

    // ── Uploads ────────────────────────────────────────────────

    pub fn save_upload(&self, file_id: &str, dataset: &Dataset) -> GuardResult<()> {
        let payload = serde_json::to_string(dataset)?;
        self.lock()?.execute(
            "INSERT INTO upload (file_id, total_rows, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(file_id) DO UPDATE SET
                total_rows = excluded.total_rows,
                payload    = excluded.payload",
            params![file_id, dataset.len() as i64, payload],
        )?;
        Ok(())
    }

    pub fn get_data(&self, file_id: &str) -> GuardResult<Option<Dataset>> {
        let payload: Option<String> = self
            .lock()?
            .query_row(
                "SELECT payload FROM upload WHERE file_id = ?1",
                params![file_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(GuardError::from))
            .transpose()
    }

    // ── Results ────────────────────────────────────────────────

    pub fn save_results(&self, result: &AnalysisResult) -> GuardResult<()> {
        let payload = serde_json::to_string(result)?;
        self.lock()?.execute(
            "INSERT INTO analysis_result (file_id, flagged_count, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(file_id) DO UPDATE SET
                flagged_count = excluded.flagged_count,
                payload       = excluded.payload",
            params![result.file_id, result.flagged_count as i64, payload],
        )?;
        Ok(())
    }

    pub fn get_results(&self, file_id: &str) -> GuardResult<Option<AnalysisResult>> {
        let payload: Option<String> = self
            .lock()?
            .query_row(
                "SELECT payload FROM analysis_result WHERE file_id = ?1",
                params![file_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(GuardError::from))
            .transpose()
    }

    // ── Housekeeping ───────────────────────────────────────────

    /// Remove the upload and any results. True if anything existed.
    pub fn delete_data(&self, file_id: &str) -> GuardResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let uploads = tx.execute("DELETE FROM upload WHERE file_id = ?1", params![file_id])?;
        let results = tx.execute(
            "DELETE FROM analysis_result WHERE file_id = ?1",
            params![file_id],
        )?;
        tx.commit()?;
        Ok(uploads + results > 0)
    }

    /// All uploaded file ids, oldest first.
    pub fn all_file_ids(&self) -> GuardResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT file_id FROM upload ORDER BY seq ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
