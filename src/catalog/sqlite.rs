//! SQLite catalog implementation

use crate::artifact::{ArtifactDescriptor, StorageTier};
use crate::catalog::schema::initialize_schema;
use crate::catalog::traits::{Catalog, CatalogError, CatalogResult};
use crate::catalog::{CatalogStats, RunRecord, StoredBook, DEFAULT_CATEGORY};
use crate::extract::CandidateRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// SQLite catalog backend
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens or creates the catalog database at `path`
    pub fn new(path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CatalogError::Database(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory catalog
    pub fn new_in_memory() -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn find_category(conn: &Connection, name: &str) -> CatalogResult<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?)
}

fn insert_category(conn: &Connection, name: &str) -> CatalogResult<i64> {
    conn.execute(
        "INSERT INTO categories (name, created_at) VALUES (?1, ?2)",
        params![name, Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn find_or_create_category(conn: &Connection, name: &str) -> CatalogResult<i64> {
    match find_category(conn, name)? {
        Some(id) => Ok(id),
        None => {
            tracing::info!("Creating category '{}'", name);
            insert_category(conn, name)
        }
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

impl Catalog for SqliteCatalog {
    // ===== Records =====

    fn find_all_titles(&self) -> CatalogResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT title FROM books")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    fn save(&mut self, record: &CandidateRecord, artifact: &ArtifactDescriptor) -> CatalogResult<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO books (title, author, description, image_url, detail_url, download_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.title.trim(),
                record.author,
                record.description,
                record.image_url,
                record.detail_url,
                record.download_url,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let book_id = tx.last_insert_rowid();

        let default = [DEFAULT_CATEGORY.to_string()];
        let names: Vec<&String> = if record.categories.is_empty() {
            default.iter().collect()
        } else {
            record.categories.iter().collect()
        };

        for name in names {
            let category_id = find_or_create_category(&tx, name)?;
            tx.execute(
                "INSERT OR IGNORE INTO book_categories (book_id, category_id) VALUES (?1, ?2)",
                params![book_id, category_id],
            )?;
        }

        if artifact.is_attached() {
            tx.execute(
                "INSERT INTO book_files (book_id, display_name, storage_key, mime_type, size_bytes, tier)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    book_id,
                    artifact.display_name,
                    artifact.storage_key,
                    artifact.mime_type,
                    artifact.size_bytes as i64,
                    artifact.tier.as_str(),
                ],
            )?;
        }

        tx.commit()?;
        tracing::debug!("Saved '{}' as book {}", record.title, book_id);
        Ok(book_id)
    }

    fn get_book(&self, id: i64) -> CatalogResult<StoredBook> {
        let mut book = self
            .conn
            .query_row(
                "SELECT id, title, author, description, image_url, detail_url, download_url, created_at
                 FROM books WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredBook {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        author: row.get(2)?,
                        description: row.get(3)?,
                        image_url: row.get(4)?,
                        detail_url: row.get(5)?,
                        download_url: row.get(6)?,
                        created_at: row.get(7)?,
                        categories: BTreeSet::new(),
                        artifact: ArtifactDescriptor::detached(),
                    })
                },
            )
            .optional()?
            .ok_or_else(|| CatalogError::NotFound(format!("Book ID {}", id)))?;

        let mut stmt = self.conn.prepare(
            "SELECT c.name FROM categories c
             JOIN book_categories bc ON bc.category_id = c.id
             WHERE bc.book_id = ?1",
        )?;
        book.categories = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<BTreeSet<String>, _>>()?;

        let artifact = self
            .conn
            .query_row(
                "SELECT display_name, storage_key, mime_type, size_bytes, tier
                 FROM book_files WHERE book_id = ?1",
                params![id],
                |row| {
                    let tier: String = row.get(4)?;
                    Ok(ArtifactDescriptor {
                        display_name: row.get(0)?,
                        storage_key: row.get(1)?,
                        mime_type: row.get(2)?,
                        size_bytes: row.get::<_, i64>(3)? as u64,
                        tier: StorageTier::from_db_str(&tier).unwrap_or(StorageTier::None),
                    })
                },
            )
            .optional()?;

        if let Some(artifact) = artifact {
            book.artifact = artifact;
        }

        Ok(book)
    }

    // ===== Categories =====

    fn find_category_by_name(&self, name: &str) -> CatalogResult<Option<i64>> {
        find_category(&self.conn, name)
    }

    fn create_category(&mut self, name: &str) -> CatalogResult<i64> {
        insert_category(&self.conn, name)
    }

    // ===== Run History =====

    fn record_run(&mut self, run: &RunRecord) -> CatalogResult<i64> {
        self.conn.execute(
            "INSERT INTO crawl_runs (url, started_at, finished_at, duration_ms, success_count,
             failed_count, skipped_count, error_count, config_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                run.url,
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
                run.duration_ms,
                run.success_count,
                run.failed_count,
                run.skipped_count,
                run.error_count,
                run.config_hash,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn recent_runs(&self, limit: usize) -> CatalogResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, started_at, finished_at, duration_ms, success_count, failed_count,
             skipped_count, error_count, config_hash
             FROM crawl_runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    started_at: parse_timestamp(&row.get::<_, String>(2)?),
                    finished_at: parse_timestamp(&row.get::<_, String>(3)?),
                    duration_ms: row.get(4)?,
                    success_count: row.get(5)?,
                    failed_count: row.get(6)?,
                    skipped_count: row.get(7)?,
                    error_count: row.get(8)?,
                    config_hash: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    // ===== Statistics =====

    fn stats(&self) -> CatalogResult<CatalogStats> {
        let count = |sql: &str| -> CatalogResult<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };

        let mut stmt = self
            .conn
            .prepare("SELECT tier, COUNT(*) FROM book_files GROUP BY tier")?;
        let attachments = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(CatalogStats {
            books: count("SELECT COUNT(*) FROM books")?,
            categories: count("SELECT COUNT(*) FROM categories")?,
            attachments,
            runs: count("SELECT COUNT(*) FROM crawl_runs")?,
        })
    }
}
