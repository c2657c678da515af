use url::Url;

/// Hosts whose links point at hosted documents rather than site pages
const DOCUMENT_HOSTS: &[&str] = &["docs.google.com", "drive.google.com"];

/// Returns true when `url` is served by a recognized document host
pub fn is_document_host(url: &Url) -> bool {
    url.host_str()
        .map(|host| host.to_lowercase())
        .is_some_and(|host| DOCUMENT_HOSTS.contains(&host.as_str()))
}

/// Extracts the hosted file id from a share link
///
/// Recognized shapes:
///
/// * `.../uc?id={id}`
/// * `.../file/d/{id}/...`
/// * `.../open?id={id}`
pub fn extract_file_id(url: &Url) -> Option<String> {
    if !is_document_host(url) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    if let Some(pos) = segments.windows(2).position(|pair| pair == ["file", "d"]) {
        return segments.get(pos + 2).map(|id| id.to_string());
    }

    if matches!(segments.last(), Some(&"uc") | Some(&"open")) {
        return url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty());
    }

    None
}

/// Canonical direct-fetch URL for a hosted file id
pub fn direct_download_url(id: &str) -> String {
    format!("https://docs.google.com/uc?id={}&export=download", id)
}

/// Rewrites a recognized share link into its direct-fetch form
///
/// Anything that is not a recognized share link is returned unchanged.
///
/// # Examples
///
/// ```
/// use folio_harvest::artifact::normalize_share_link;
///
/// assert_eq!(
///     normalize_share_link("https://drive.google.com/file/d/abc123/view?usp=sharing"),
///     "https://docs.google.com/uc?id=abc123&export=download"
/// );
/// assert_eq!(
///     normalize_share_link("https://example.com/book.pdf"),
///     "https://example.com/book.pdf"
/// );
/// ```
pub fn normalize_share_link(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| extract_file_id(&url))
        .map(|id| direct_download_url(&id))
        .unwrap_or_else(|| link.to_string())
}
