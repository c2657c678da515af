//! Catalog trait and error types

use crate::artifact::ArtifactDescriptor;
use crate::catalog::{CatalogStats, RunRecord, StoredBook};
use crate::extract::CandidateRecord;
use thiserror::Error;

/// Errors that can occur during catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Persistence backend for harvested records
///
/// The dedup check reads titles and the later save writes them without a
/// lock in between; one coordinator instance per catalog is assumed.
pub trait Catalog: Send {
    // ===== Records =====

    /// Every persisted title, as stored
    fn find_all_titles(&self) -> CatalogResult<Vec<String>>;

    /// Persists a record and its artifact placement in one transaction
    ///
    /// Categories are created on demand. A record without categories is
    /// filed under [`crate::catalog::DEFAULT_CATEGORY`]. A detached
    /// descriptor stores no attachment row.
    ///
    /// # Returns
    ///
    /// The new record's id
    fn save(&mut self, record: &CandidateRecord, artifact: &ArtifactDescriptor) -> CatalogResult<i64>;

    /// Loads a persisted record with its categories and attachment
    fn get_book(&self, id: i64) -> CatalogResult<StoredBook>;

    // ===== Categories =====

    fn find_category_by_name(&self, name: &str) -> CatalogResult<Option<i64>>;

    fn create_category(&mut self, name: &str) -> CatalogResult<i64>;

    // ===== Run History =====

    /// Records a finished crawl invocation
    fn record_run(&mut self, run: &RunRecord) -> CatalogResult<i64>;

    /// Most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> CatalogResult<Vec<RunRecord>>;

    // ===== Statistics =====

    fn stats(&self) -> CatalogResult<CatalogStats>;
}
