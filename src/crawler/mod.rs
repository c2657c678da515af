//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded redirects and typed errors
//! - Detail link discovery on listing pages
//! - Per-run outcome accounting
//! - Overall crawl coordination

mod coordinator;
mod discover;
mod fetcher;
mod result;

pub use coordinator::{remote_from_config, Coordinator};
pub use discover::discover_detail_links;
pub use fetcher::{build_http_client, FetchError, FetchedPage, PageFetcher, MAX_REDIRECTS};
pub use result::CrawlResult;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl invocation against the configured catalog
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Open the catalog database
/// 2. Select the remote store from configuration
/// 3. Build the HTTP clients
/// 4. Crawl `url` and record the run
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl ran; per-item failures are inside the result
/// * `Err(HarvestError)` - The catalog or HTTP clients could not be set up
pub async fn crawl(
    config: Config,
    config_hash: &str,
    url: &str,
    max_books: u32,
    download_files: bool,
) -> Result<CrawlResult, HarvestError> {
    let mut coordinator = Coordinator::from_config(config, config_hash)?;
    Ok(coordinator.crawl(url, max_books, download_files).await)
}
