use super::{element_text, DetailPage, Strategy};
use crate::artifact::is_document_host;
use crate::url::resolve_site_url;
use scraper::{ElementRef, Selector};
use url::Url;

/// Path or query fragments naming a format we never collect
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".epub", ".mobi", ".azw3", ".azw", ".prc", ".mp3", ".m4a", ".doc", ".docx",
];

/// Anchor-text words naming a format we never collect
const EXCLUDED_WORDS: &[&str] = &["epub", "mobi", "azw", "prc", "mp3", "audio", "docx"];

/// Resolved links this short are never real artifacts
const MIN_LINK_CHARS: usize = 10;

pub const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("download region", download_region),
    ("download box", download_box),
    ("whole document", whole_document),
];

/// True when the link names an e-book, audio or office format other than the
/// target one
///
/// Only the path and query are inspected for extensions, so a host name like
/// `docs.google.com` is not mistaken for a `.doc` link.
pub fn names_excluded_format(url: &Url, anchor_text: &str) -> bool {
    let location = format!("{}?{}", url.path(), url.query().unwrap_or("")).to_lowercase();
    let text = anchor_text.to_lowercase();

    EXCLUDED_EXTENSIONS.iter().any(|ext| location.contains(ext))
        || EXCLUDED_WORDS.iter().any(|word| text.contains(word))
}

/// True when the link points at the target format or a document host
pub fn indicates_target_format(url: &Url, anchor_text: &str) -> bool {
    url.path().to_lowercase().contains(".pdf")
        || url.query().is_some_and(|q| q.to_lowercase().contains(".pdf"))
        || anchor_text.to_lowercase().contains("pdf")
        || is_document_host(url)
}

/// Resolves and vets one anchor, returning its absolute URL when acceptable
fn accept(page: &DetailPage, anchor: &ElementRef<'_>) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let absolute = resolve_site_url(href, &page.base)?;
    if absolute.len() <= MIN_LINK_CHARS {
        return None;
    }

    let url = Url::parse(&absolute).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let text = element_text(anchor);
    if names_excluded_format(&url, &text) {
        tracing::debug!("Skipping non-target format link {}", absolute);
        return None;
    }

    indicates_target_format(&url, &text).then_some(absolute)
}

fn first_accepted_within(page: &DetailPage, container_css: &str) -> Option<String> {
    let container = page.select_first(container_css)?;
    let anchors = Selector::parse("a[href]").ok()?;
    container.select(&anchors).find_map(|a| accept(page, &a))
}

fn download_region(page: &DetailPage) -> Option<String> {
    first_accepted_within(page, "#download.content")
        .or_else(|| first_accepted_within(page, "#download"))
}

fn download_box(page: &DetailPage) -> Option<String> {
    first_accepted_within(page, ".download-box")
}

fn whole_document(page: &DetailPage) -> Option<String> {
    page.select_all("a[href]")
        .into_iter()
        .find_map(|a| accept(page, &a))
}
