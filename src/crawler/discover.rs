use crate::url::{classify, resolve_site_url, strip_fragment, PageKind};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Collects the unique detail-page links of a listing page
///
/// Every anchor is resolved against the site origin, stripped of its
/// fragment and kept only when it classifies as a detail page. The set is
/// ordered so a bounded run always picks the same links.
pub fn discover_detail_links(html: &str, site: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return BTreeSet::new();
    };

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_site_url(href, site))
        .map(|url| strip_fragment(&url).to_string())
        .filter(|url| classify(url, site) == PageKind::Detail)
        .collect()
}
