use crate::catalog::RunRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome accounting for one crawl invocation
///
/// Only the coordinator mutates it; once returned it is read-only.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub url: String,
    pub success_count: u32,
    pub failed_count: u32,
    pub skipped_count: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
    /// Human-readable messages in the order they happened
    pub errors: Vec<String>,
}

impl CrawlResult {
    pub(crate) fn start(url: &str) -> Self {
        let now = Utc::now();
        Self {
            url: url.to_string(),
            success_count: 0,
            failed_count: 0,
            skipped_count: 0,
            start_time: now,
            end_time: now,
            duration_ms: 0,
            errors: Vec::new(),
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    pub(crate) fn record_failure(&mut self, message: String) {
        tracing::error!("{}", message);
        self.failed_count += 1;
        self.errors.push(message);
    }

    /// Appends a message without touching any counter
    pub(crate) fn add_error(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.errors.push(message);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds();
        self
    }

    pub fn processed(&self) -> u32 {
        self.success_count + self.failed_count + self.skipped_count
    }

    /// Run history entry for this result
    pub fn to_run_record(&self, config_hash: &str) -> RunRecord {
        RunRecord {
            id: None,
            url: self.url.clone(),
            started_at: self.start_time,
            finished_at: self.end_time,
            duration_ms: self.duration_ms,
            success_count: self.success_count,
            failed_count: self.failed_count,
            skipped_count: self.skipped_count,
            error_count: self.errors.len() as u32,
            config_hash: config_hash.to_string(),
        }
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} skipped in {:.1}s",
            self.success_count,
            self.failed_count,
            self.skipped_count,
            self.duration_ms as f64 / 1000.0
        )
    }
}
