use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL, converts it to lowercase
/// and drops a leading `www.`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use folio_harvest::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_lowercase();
        match host.strip_prefix("www.") {
            Some(bare) => bare.to_string(),
            None => host,
        }
    })
}

/// Returns true when both URLs point at the same site (domain and port)
pub fn is_same_site(url: &Url, site: &Url) -> bool {
    match (extract_domain(url), extract_domain(site)) {
        (Some(a), Some(b)) => a == b && url.port_or_known_default() == site.port_or_known_default(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_strips_www() {
        let url = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_site_ignores_scheme_default_port() {
        let a = Url::parse("https://example.com:443/a").unwrap();
        let b = Url::parse("https://www.example.com").unwrap();
        assert!(is_same_site(&a, &b));
    }

    #[test]
    fn test_different_port_is_other_site() {
        let a = Url::parse("http://127.0.0.1:8080/a").unwrap();
        let b = Url::parse("http://127.0.0.1:9090").unwrap();
        assert!(!is_same_site(&a, &b));
    }
}
