//! URL handling module for Folio-Harvest
//!
//! This module provides page classification, site-relative link resolution,
//! fragment stripping and same-site checks.

mod domain;
mod resolve;

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub use domain::{extract_domain, is_same_site};
pub use resolve::{parse_target, resolve_site_url, strip_fragment};

/// Kind of page a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A page describing exactly one catalog record
    Detail,
    /// Any other page; treated as a collection of links
    Listing,
}

/// Per-record path convention: `/{slug}_{numeric id}.html`
fn detail_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^/[^/]+_[0-9]+\.html?$").expect("detail path pattern is valid")
    })
}

/// Classifies a URL as a detail or listing page from its shape alone
///
/// A URL is a detail page when, after stripping any fragment, it belongs to
/// the configured site and its path follows the per-record convention
/// (slug, underscore, numeric id, `.html`). Anything else, including
/// unparsable input, is a listing.
///
/// # Examples
///
/// ```
/// use folio_harvest::url::{classify, PageKind};
/// use url::Url;
///
/// let site = Url::parse("https://dtv-ebook.com.vn").unwrap();
/// assert_eq!(
///     classify("https://dtv-ebook.com.vn/nha-gia-kim_1234.html#top", &site),
///     PageKind::Detail
/// );
/// assert_eq!(classify("https://dtv-ebook.com.vn/the-loai/tieu-thuyet", &site), PageKind::Listing);
/// ```
pub fn classify(url: &str, site: &Url) -> PageKind {
    let cleaned = strip_fragment(url.trim());
    let parsed = match Url::parse(cleaned) {
        Ok(parsed) => parsed,
        Err(_) => return PageKind::Listing,
    };

    if is_same_site(&parsed, site) && detail_path_pattern().is_match(parsed.path()) {
        PageKind::Detail
    } else {
        PageKind::Listing
    }
}
