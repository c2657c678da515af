//! Artifact download
//!
//! # Request Flow
//!
//! 1. Rewrite recognized share links into their direct-fetch form
//! 2. GET the link, following redirects manually (max 5 hops) so every hop's
//!    headers can be inspected
//! 3. Reject disallowed content types (alternate e-book and audio formats)
//! 4. If the type is HTML, peek at the first KiB and reject real markup;
//!    hosts serve warning and interstitial pages this way
//! 5. Resolve the display name: preferred argument, `Content-Disposition`,
//!    final URL path segment, fixed default
//! 6. Stream to the upload directory and reject anything under 10 KiB

use super::filename::{
    default_name, filename_from_content_disposition, filename_from_url, mime_for,
    sanitize_filename,
};
use super::local::LocalStore;
use super::share_link::normalize_share_link;
use super::AcquireError;
use crate::MIN_ARTIFACT_BYTES;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Maximum redirect hops followed for a single artifact
const MAX_REDIRECTS: usize = 5;

/// Bytes inspected when checking for an interstitial page
const PEEK_BYTES: usize = 1024;

/// Content-type fragments of formats that are never collected
const DISALLOWED_CONTENT_TYPES: &[&str] = &["epub", "mobi", "azw", "kindle", "audio", "mp3"];

/// A downloaded artifact sitting in the local upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredArtifact {
    pub path: PathBuf,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// The link actually fetched, after share-link normalization
    pub source_url: String,
}

/// Downloads artifacts into a [`LocalStore`]
pub struct ArtifactAcquirer {
    client: Client,
    store: LocalStore,
}

impl ArtifactAcquirer {
    /// Creates an acquirer
    ///
    /// `client` must not follow redirects on its own; see
    /// [`crate::crawler::build_http_client`].
    pub fn new(client: Client, store: LocalStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Downloads the artifact behind `download_url`
    ///
    /// # Arguments
    ///
    /// * `download_url` - Absolute link found on the detail page
    /// * `preferred_name` - Display name to use instead of the server's
    ///
    /// # Returns
    ///
    /// * `Ok(AcquiredArtifact)` - The file is on disk and at least 10 KiB
    /// * `Err(AcquireError)` - Nothing is left on disk
    pub async fn acquire(
        &self,
        download_url: &str,
        preferred_name: Option<&str>,
    ) -> Result<AcquiredArtifact, AcquireError> {
        let source_url = normalize_share_link(download_url);
        if source_url != download_url {
            tracing::debug!("Normalized share link {} -> {}", download_url, source_url);
        }

        let mut response = self.follow_redirects(&source_url).await?;
        let final_url = response.url().clone();

        let content_type = header_value(&response, CONTENT_TYPE.as_str());
        let lowered_type = content_type.as_deref().unwrap_or("").to_lowercase();

        if DISALLOWED_CONTENT_TYPES.iter().any(|t| lowered_type.contains(t)) {
            return Err(AcquireError::DisallowedFormat {
                url: source_url,
                content_type: content_type.unwrap_or_default(),
            });
        }

        let head = read_head(&mut response, &source_url).await?;

        if lowered_type.contains("text/html") && looks_like_markup(&head) {
            tracing::warn!("Download from {} returned an HTML page", source_url);
            return Err(AcquireError::InterstitialPage { url: source_url });
        }

        let display_name = preferred_name
            .and_then(sanitize_filename)
            .or_else(|| {
                header_value(&response, CONTENT_DISPOSITION.as_str())
                    .and_then(|h| filename_from_content_disposition(&h))
            })
            .or_else(|| filename_from_url(&final_url))
            .unwrap_or_else(|| default_name(&final_url).to_string());

        let path = self.store.allocate(&display_name).await?;
        let size_bytes = match write_body(&path, &head, &mut response, &source_url).await {
            Ok(size) => size,
            Err(e) => {
                self.store.delete(&path).await;
                return Err(e);
            }
        };

        if size_bytes < MIN_ARTIFACT_BYTES {
            tracing::warn!(
                "Artifact from {} is only {} bytes, discarding",
                source_url,
                size_bytes
            );
            self.store.delete(&path).await;
            return Err(AcquireError::ArtifactTooSmall { size: size_bytes });
        }

        let mime_type = mime_for(content_type.as_deref(), &display_name);
        tracing::info!(
            "Downloaded '{}' ({} bytes, {}) to {}",
            display_name,
            size_bytes,
            mime_type,
            path.display()
        );

        Ok(AcquiredArtifact {
            path,
            display_name,
            mime_type,
            size_bytes,
            source_url,
        })
    }

    async fn follow_redirects(&self, start: &str) -> Result<Response, AcquireError> {
        let network = |message: String| AcquireError::Network {
            url: start.to_string(),
            message,
        };

        let mut current = Url::parse(start).map_err(|e| network(format!("invalid URL: {}", e)))?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(current.clone())
                .header(ACCEPT, "*/*")
                .send()
                .await
                .map_err(|e| network(e.to_string()))?;

            let status = response.status();

            if status.is_redirection() {
                let location = header_value(&response, LOCATION.as_str())
                    .ok_or_else(|| network(format!("HTTP {} without Location", status.as_u16())))?;
                current = current
                    .join(&location)
                    .map_err(|e| network(format!("bad redirect target '{}': {}", location, e)))?;
                tracing::debug!("Artifact redirect -> {}", current);
                continue;
            }

            if !status.is_success() {
                return Err(network(format!("HTTP {}", status.as_u16())));
            }

            return Ok(response);
        }

        Err(network(format!("more than {} redirects", MAX_REDIRECTS)))
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Buffers at least [`PEEK_BYTES`] of the body, or all of it if shorter
async fn read_head(response: &mut Response, url: &str) -> Result<Vec<u8>, AcquireError> {
    let mut head = Vec::with_capacity(PEEK_BYTES);

    while head.len() < PEEK_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => head.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                return Err(AcquireError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    Ok(head)
}

fn looks_like_markup(head: &[u8]) -> bool {
    let prefix = &head[..head.len().min(PEEK_BYTES)];
    let text = String::from_utf8_lossy(prefix).to_lowercase();
    text.contains("<html") || text.contains("<!doctype")
}

/// Writes the buffered head and the rest of the body to `path`
async fn write_body(
    path: &std::path::Path,
    head: &[u8],
    response: &mut Response,
    url: &str,
) -> Result<u64, AcquireError> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(head).await?;
    let mut written = head.len() as u64;

    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            Ok(None) => break,
            Err(e) => {
                return Err(AcquireError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    file.flush().await?;
    Ok(written)
}
