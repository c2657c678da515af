use super::{DetailPage, Strategy};
use crate::url::resolve_site_url;
use scraper::ElementRef;

/// Image sources containing these are decoration, not covers
const DECORATIVE_MARKERS: &[&str] = &["banner", "logo"];

pub const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("cover marker src", marker_src),
    ("cover marker data-src", marker_lazy_src),
    ("generic cover candidates", generic_candidates),
];

/// The marked cover element, or the first image inside it
fn cover_marker(page: &DetailPage) -> Option<ElementRef<'_>> {
    let marker = page.select_first("img.hinhdaidien, .hinhdaidien")?;
    if marker.value().name() == "img" {
        return Some(marker);
    }

    let img = scraper::Selector::parse("img").ok()?;
    marker.select(&img).next().or(Some(marker))
}

fn resolved_attr(page: &DetailPage, element: &ElementRef<'_>, attr: &str) -> Option<String> {
    let value = element.value().attr(attr)?;
    resolve_site_url(value, &page.base)
}

fn marker_src(page: &DetailPage) -> Option<String> {
    resolved_attr(page, &cover_marker(page)?, "src")
}

fn marker_lazy_src(page: &DetailPage) -> Option<String> {
    resolved_attr(page, &cover_marker(page)?, "data-src")
}

fn is_decorative(src: &str) -> bool {
    let lowered = src.to_lowercase();
    DECORATIVE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn generic_candidates(page: &DetailPage) -> Option<String> {
    ["img[src*='images/files'], .book-cover img", "img"]
        .iter()
        .flat_map(|css| page.select_all(css))
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.trim().is_empty() && !is_decorative(src))
        .find_map(|src| resolve_site_url(src, &page.base))
}
