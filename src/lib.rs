//! Folio-Harvest: a catalog ingestion crawler
//!
//! This crate fetches bibliographic detail and listing pages from a single
//! configured site, extracts catalog records through ordered fallback
//! strategies, deduplicates them against an existing catalog and attaches
//! the associated document through a remote/local storage policy.

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod url;

use thiserror::Error;

/// Main error type for Folio-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Artifact error: {0}")]
    Acquire(#[from] artifact::AcquireError),

    #[error("Storage error: {0}")]
    Storage(#[from] artifact::StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Blank,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Folio-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Smallest artifact, in bytes, that may be attached to a catalog record
pub const MIN_ARTIFACT_BYTES: u64 = 10 * 1024;

// Re-export commonly used types
pub use artifact::{ArtifactDescriptor, StorageTier};
pub use config::Config;
pub use crawler::{Coordinator, CrawlResult};
pub use extract::CandidateRecord;
pub use url::{classify, PageKind};
