use crate::url::domain::extract_domain;
use crate::{UrlError, UrlResult};
use url::Url;

/// Removes everything after the first `#`
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    }
}

/// Validates a caller-supplied crawl target
///
/// Blank input, unparsable input, non-HTTP(S) schemes and host-less URLs are
/// rejected. The returned URL has its fragment removed.
pub fn parse_target(url: &str) -> UrlResult<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Blank);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    parsed.set_fragment(None);
    Ok(parsed)
}

/// Resolves a link found on the site into an absolute URL
///
/// # Resolution Rules
///
/// | href shape | result |
/// |------------|--------|
/// | `//host/path` | `https://host/path` |
/// | `/path` | base origin + `/path` |
/// | `http(s)://...` | unchanged |
/// | `site-domain/path` | `https://site-domain/path` |
/// | `path` | base origin + `/` + `path` |
///
/// Returns `None` for empty hrefs, fragment-only anchors, `javascript:`,
/// `mailto:`, `tel:` and `data:` links, absolute links with a non-HTTP(S)
/// scheme, and anything that does not parse after resolution.
///
/// # Examples
///
/// ```
/// use folio_harvest::url::resolve_site_url;
/// use url::Url;
///
/// let base = Url::parse("https://dtv-ebook.com.vn").unwrap();
/// assert_eq!(
///     resolve_site_url("/images/cover.jpg", &base).as_deref(),
///     Some("https://dtv-ebook.com.vn/images/cover.jpg")
/// );
/// assert_eq!(
///     resolve_site_url("//cdn.example.com/a.jpg", &base).as_deref(),
///     Some("https://cdn.example.com/a.jpg")
/// );
/// ```
pub fn resolve_site_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    if lowered.contains("://") && !lowered.starts_with("http://") && !lowered.starts_with("https://")
    {
        return None;
    }

    let origin = base.origin().ascii_serialization();

    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else if lowered.starts_with("http://") || lowered.starts_with("https://") {
        href.to_string()
    } else if extract_domain(base).is_some_and(|domain| lowered.starts_with(&domain)
        || lowered.starts_with(&format!("www.{}", domain)))
    {
        format!("https://{}", href)
    } else {
        format!("{}/{}", origin, href)
    };

    Url::parse(&absolute).ok().map(|url| url.to_string())
}
