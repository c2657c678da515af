//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a single bounded crawl invocation:
//! - Classifying the starting URL as a detail or listing page
//! - Discovering detail links on listing pages, with a fixed inter-item delay
//! - Extracting, deduplicating and persisting each candidate record
//! - Acquiring and placing each record's artifact
//! - Accounting every outcome in a [`CrawlResult`]
//!
//! Nothing here returns an error to the caller. Every failure becomes a
//! counter increment and a message, and the run moves on.

use crate::artifact::{
    preferred_name, ArtifactAcquirer, ArtifactDescriptor, ArtifactStorageRouter, DisabledRemote,
    DriveClient, LocalStore, RemoteStore, StorageProbe,
};
use crate::catalog::{is_known_title, open_catalog, Catalog};
use crate::config::Config;
use crate::crawler::discover::discover_detail_links;
use crate::crawler::fetcher::{build_http_client, PageFetcher, MAX_REDIRECTS};
use crate::crawler::result::CrawlResult;
use crate::extract::{extract_detail, CandidateRecord};
use crate::url::{classify, parse_target, PageKind};
use crate::HarvestError;
use reqwest::redirect::Policy;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    site: Url,
    catalog: Box<dyn Catalog>,
    fetcher: PageFetcher,
    acquirer: ArtifactAcquirer,
    router: ArtifactStorageRouter,
    config_hash: String,
    /// Remote availability for the run in progress
    probe: Option<StorageProbe>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `catalog` - Where records are persisted and deduplicated
    /// * `remote` - The remote document store
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The site URL is invalid or a client could not be built
    pub fn new(
        config: Config,
        catalog: Box<dyn Catalog>,
        remote: Arc<dyn RemoteStore>,
    ) -> Result<Self, HarvestError> {
        let site = Url::parse(&config.site.base_url)?;

        let fetcher = PageFetcher::new(build_http_client(
            &config.crawler,
            &config.user_agent,
            Policy::limited(MAX_REDIRECTS),
        )?);

        let local = LocalStore::new(&config.storage.upload_dir);
        let acquirer = ArtifactAcquirer::new(
            build_http_client(&config.crawler, &config.user_agent, Policy::none())?,
            local.clone(),
        );
        let router = ArtifactStorageRouter::new(remote, local);

        Ok(Self {
            config: Arc::new(config),
            site,
            catalog,
            fetcher,
            acquirer,
            router,
            config_hash: String::new(),
            probe: None,
        })
    }

    /// Builds a coordinator over the configured SQLite catalog and remote store
    pub fn from_config(config: Config, config_hash: &str) -> Result<Self, HarvestError> {
        let catalog = open_catalog(Path::new(&config.storage.database_path))?;
        let remote = remote_from_config(&config)?;

        Ok(Self::new(config, Box::new(catalog), remote)?.with_config_hash(config_hash))
    }

    /// Sets the configuration hash recorded with each run
    pub fn with_config_hash(mut self, config_hash: &str) -> Self {
        self.config_hash = config_hash.to_string();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Checks remote availability right now, bypassing the per-run cache
    pub async fn probe_remote(&self) -> StorageProbe {
        self.router.probe().await
    }

    /// Runs one crawl invocation
    ///
    /// # Arguments
    ///
    /// * `url` - A detail page or a listing page on the configured site
    /// * `max_books` - Upper bound on detail pages processed from a listing
    ///   (values below 1 are treated as 1)
    /// * `download_files` - Keep local copies of artifacts; when the remote
    ///   tier is unavailable and this is false, records are saved without
    ///   an attachment
    pub async fn crawl(&mut self, url: &str, max_books: u32, download_files: bool) -> CrawlResult {
        let mut result = CrawlResult::start(url);
        let max_books = max_books.max(1);
        self.probe = None;

        tracing::info!(
            "Starting crawl of {} (max books: {}, keep local files: {})",
            url,
            max_books,
            download_files
        );

        match parse_target(url) {
            Err(e) => result.add_error(format!("Invalid URL '{}': {}", url, e)),
            Ok(target) => match classify(target.as_str(), &self.site) {
                PageKind::Detail => {
                    tracing::info!("{} is a detail page", target);
                    self.process_detail(target.as_str(), download_files, &mut result)
                        .await;
                }
                PageKind::Listing => {
                    tracing::info!("{} is a listing page", target);
                    self.process_listing(target.as_str(), max_books, download_files, &mut result)
                        .await;
                }
            },
        }

        let result = result.finish();

        if let Err(e) = self
            .catalog
            .record_run(&result.to_run_record(&self.config_hash))
        {
            tracing::warn!("Failed to record crawl run: {}", e);
        }

        tracing::info!("Crawl of {} finished: {}", url, result.summary());
        result
    }

    async fn process_listing(
        &mut self,
        url: &str,
        max_books: u32,
        download_files: bool,
        result: &mut CrawlResult,
    ) {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                result.add_error(format!("Failed to fetch listing page {}: {}", url, e));
                return;
            }
        };

        let links = discover_detail_links(&page.body, &self.site);
        if links.is_empty() {
            result.add_error(format!("No detail page links found on {}", url));
            return;
        }

        tracing::info!(
            "Found {} detail links on {}, processing up to {}",
            links.len(),
            url,
            max_books
        );

        let delay = Duration::from_millis(self.config.crawler.delay_ms);

        for (index, link) in links.iter().take(max_books as usize).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::info!("[{}/{}] {}", index + 1, max_books.min(links.len() as u32), link);
            self.process_detail(link, download_files, result).await;
        }
    }

    async fn process_detail(&mut self, url: &str, download_files: bool, result: &mut CrawlResult) {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                result.record_failure(format!("Failed to fetch {}: {}", url, e));
                return;
            }
        };

        let record = match extract_detail(&page.body, url, &self.site) {
            Ok(record) => record,
            Err(e) => {
                result.record_failure(e.to_string());
                return;
            }
        };

        match is_known_title(self.catalog.as_ref(), &record.title) {
            Ok(true) => {
                tracing::info!("'{}' is already in the catalog, skipping", record.title);
                result.record_skipped();
                return;
            }
            Ok(false) => {}
            Err(e) => {
                result.record_failure(format!("Duplicate check failed for '{}': {}", record.title, e));
                return;
            }
        }

        let artifact = self.attach_artifact(&record, download_files, result).await;

        match self.catalog.save(&record, &artifact) {
            Ok(id) => {
                tracing::info!(
                    "Saved '{}' as book {} (attachment: {})",
                    record.title,
                    id,
                    artifact.tier
                );
                result.record_success();
            }
            Err(e) => {
                self.router.discard(&artifact).await;
                result.record_failure(format!("Failed to save '{}': {}", record.title, e));
            }
        }
    }

    /// Downloads and places the record's artifact
    ///
    /// Failures are noted on `result` and yield a detached descriptor; the
    /// record itself is still saved.
    async fn attach_artifact(
        &mut self,
        record: &CandidateRecord,
        download_files: bool,
        result: &mut CrawlResult,
    ) -> ArtifactDescriptor {
        let Some(link) = record.download_url.as_deref() else {
            tracing::info!("No download link for '{}'", record.title);
            return ArtifactDescriptor::detached();
        };

        let preferred = preferred_name(link);
        let acquired = match self.acquirer.acquire(link, preferred.as_deref()).await {
            Ok(acquired) => acquired,
            Err(e) => {
                result.add_error(format!("'{}': artifact not attached: {}", record.title, e));
                return ArtifactDescriptor::detached();
            }
        };

        let probe = self.storage_probe().await;

        match self.router.store(acquired, &probe, download_files).await {
            Ok(placement) => {
                if let Some(reason) = placement.fallback {
                    result.add_error(format!(
                        "'{}': stored locally after remote failure: {}",
                        record.title, reason
                    ));
                }
                placement.descriptor
            }
            Err(e) => {
                result.add_error(format!("'{}': artifact not attached: {}", record.title, e));
                ArtifactDescriptor::detached()
            }
        }
    }

    /// Remote availability, probed at most once per run
    async fn storage_probe(&mut self) -> StorageProbe {
        if let Some(probe) = &self.probe {
            return probe.clone();
        }

        let probe = self.router.probe().await;
        if probe.available {
            tracing::info!("Remote storage available: {}", probe.message);
        } else {
            tracing::warn!("Remote storage unavailable: {}", probe.message);
        }

        self.probe = Some(probe.clone());
        probe
    }
}

/// Remote store selected by `[remote] enabled`
pub fn remote_from_config(config: &Config) -> Result<Arc<dyn RemoteStore>, HarvestError> {
    if !config.remote.enabled {
        return Ok(Arc::new(DisabledRemote));
    }

    let client = build_http_client(
        &config.crawler,
        &config.user_agent,
        Policy::limited(MAX_REDIRECTS),
    )?;
    Ok(Arc::new(DriveClient::from_config(&config.remote, client)))
}
