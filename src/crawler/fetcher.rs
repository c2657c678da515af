//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for detail and listing pages
//! - Redirect following with a hop bound
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for any single request
pub const MAX_REDIRECTS: usize = 5;

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("More than {} redirects fetching {url}", MAX_REDIRECTS)]
    RedirectLoop { url: String },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if error.is_redirect() {
            FetchError::RedirectLoop { url }
        } else if let Some(status) = error.status() {
            FetchError::HttpStatus {
                url,
                status: status.as_u16(),
            }
        } else {
            FetchError::Network {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// A fetched page body together with the URL it was finally served from
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: Url,
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler` - Connect and read timeouts
/// * `user_agent` - The user agent sent with every request
/// * `redirect` - Redirect policy; artifact downloads pass [`Policy::none`]
///   and follow redirects themselves
///
/// reqwest 0.11 has no separate read timeout, so the read timeout bounds the
/// whole request.
///
/// # Example
///
/// ```no_run
/// use folio_harvest::config::{CrawlerConfig, UserAgentConfig};
/// use folio_harvest::crawler::{build_http_client, MAX_REDIRECTS};
/// use reqwest::redirect::Policy;
///
/// let client = build_http_client(
///     &CrawlerConfig::default(),
///     &UserAgentConfig::default(),
///     Policy::limited(MAX_REDIRECTS),
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
    redirect: Policy,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.clone())
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .timeout(Duration::from_secs(crawler.read_timeout_secs))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches detail and listing pages
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Wraps an existing client; it should follow at most [`MAX_REDIRECTS`]
    /// redirects
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(crawler, user_agent, Policy::limited(MAX_REDIRECTS))?;
        Ok(Self::new(client))
    }

    /// Fetches `url` and returns its body
    ///
    /// No retries happen here. Non-2xx responses are
    /// [`FetchError::HttpStatus`].
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        if final_url.as_str() != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(FetchedPage { final_url, body })
    }
}
