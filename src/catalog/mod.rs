//! Catalog module for persisting harvested records
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Record, category and attachment persistence
//! - Title-based duplicate detection
//! - Crawl run history and summary statistics

mod dedup;
mod schema;
mod sqlite;
mod traits;

pub use dedup::{is_duplicate, is_known_title, title_key};
pub use sqlite::SqliteCatalog;
pub use traits::{Catalog, CatalogError, CatalogResult};

use crate::artifact::{ArtifactDescriptor, StorageTier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Category for records that carry none of their own
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Opens (or creates) the catalog database at `path`
pub fn open_catalog(path: &Path) -> CatalogResult<SqliteCatalog> {
    SqliteCatalog::new(path)
}

/// A record as persisted in the catalog
#[derive(Debug, Clone, Serialize)]
pub struct StoredBook {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: String,
    pub download_url: Option<String>,
    pub categories: BTreeSet<String>,
    /// Detached when the record has no attachment
    pub artifact: ArtifactDescriptor,
    pub created_at: String,
}

/// A finished crawl invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    /// Assigned by the catalog; ignored on insert
    pub id: Option<i64>,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub success_count: u32,
    pub failed_count: u32,
    pub skipped_count: u32,
    pub error_count: u32,
    pub config_hash: String,
}

/// Summary counts across the whole catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub books: u64,
    pub categories: u64,
    /// Records with an attachment, per tier
    pub attachments: BTreeMap<String, u64>,
    pub runs: u64,
}

impl CatalogStats {
    pub fn attachments_in(&self, tier: StorageTier) -> u64 {
        self.attachments.get(tier.as_str()).copied().unwrap_or(0)
    }

    pub fn without_attachment(&self) -> u64 {
        self.books
            .saturating_sub(self.attachments.values().sum::<u64>())
    }
}
