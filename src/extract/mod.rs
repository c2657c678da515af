//! Detail page extraction
//!
//! Every field of a [`CandidateRecord`] is produced by an ordered list of
//! strategies. Site-specific markers come first, generic HTML semantics
//! second, whole-document heuristics last; the first strategy returning a
//! plausible value wins and the rest are skipped for that field.
//!
//! Only the title is required. A page without one yields
//! [`ExtractError::MissingTitle`].

mod author;
mod categories;
mod chain;
mod description;
mod download;
mod image;
mod title;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

pub use chain::{first_match, Plausible, Strategy};
pub use download::{indicates_target_format, names_excluded_format};

/// Errors produced while extracting a record from a detail page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not extract a title from {url}")]
    MissingTitle { url: String },
}

/// A record extracted from a detail page, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: String,
    pub download_url: Option<String>,
    pub categories: BTreeSet<String>,
}

/// A parsed detail page together with the site it belongs to
pub struct DetailPage {
    pub document: Html,
    pub base: Url,
}

impl DetailPage {
    pub fn parse(html: &str, base: &Url) -> Self {
        Self {
            document: Html::parse_document(html),
            base: base.clone(),
        }
    }

    /// First element in document order matching `css`
    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.document.select(&selector).next()
    }

    /// All elements matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Value cell of the first details-table row whose label cell contains
    /// one of `labels` (compared lowercase)
    pub fn labelled_cell(&self, labels: &[&str]) -> Option<ElementRef<'_>> {
        let td = Selector::parse("td").ok()?;

        self.select_all("table.tblChiTietDiDong tr, .tblChiTietDiDong tr")
            .into_iter()
            .find_map(|row| {
                let mut cells = row.select(&td);
                let label = element_text(&cells.next()?).to_lowercase();
                let value = cells.next()?;
                labels
                    .iter()
                    .any(|wanted| label.contains(wanted))
                    .then_some(value)
            })
    }
}

/// Extracts a candidate record from a fetched detail page
///
/// # Arguments
///
/// * `html` - The page body
/// * `detail_url` - Source identity of the record (fragment already stripped)
/// * `base` - The site's base origin, used to resolve relative links
///
/// # Returns
///
/// * `Ok(CandidateRecord)` - At least a title was found
/// * `Err(ExtractError::MissingTitle)` - No title strategy produced a value
pub fn extract_detail(
    html: &str,
    detail_url: &str,
    base: &Url,
) -> Result<CandidateRecord, ExtractError> {
    let page = DetailPage::parse(html, base);

    let title = first_match("title", &page, title::STRATEGIES).ok_or_else(|| {
        ExtractError::MissingTitle {
            url: detail_url.to_string(),
        }
    })?;

    let record = CandidateRecord {
        title,
        author: first_match("author", &page, author::STRATEGIES),
        description: first_match("description", &page, description::STRATEGIES),
        image_url: first_match("image", &page, image::STRATEGIES),
        detail_url: detail_url.to_string(),
        download_url: first_match("download link", &page, download::STRATEGIES),
        categories: first_match("categories", &page, categories::STRATEGIES).unwrap_or_default(),
    };

    tracing::info!(
        "Extracted '{}' (author: {}, description: {} chars, image: {}, download: {}, categories: {})",
        record.title,
        record.author.as_deref().unwrap_or("-"),
        record.description.as_ref().map_or(0, |d| d.chars().count()),
        if record.image_url.is_some() { "yes" } else { "no" },
        if record.download_url.is_some() { "yes" } else { "no" },
        record.categories.len()
    );

    Ok(record)
}

/// Whitespace-normalized text content of an element
pub fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Whitespace-normalized text of `root`, leaving out text under any
/// descendant matching `skip`
pub fn visible_text(root: &ElementRef<'_>, skip: &Selector) -> String {
    let mut text = String::new();

    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| skip.matches(&ancestor));

        if !hidden {
            text.push_str(fragment);
        }
    }

    normalize_whitespace(&text)
}

/// True when `element` or one of its ancestors below `root` matches `skip`
pub fn is_inside(element: &ElementRef<'_>, root: &ElementRef<'_>, skip: &Selector) -> bool {
    if skip.matches(element) {
        return true;
    }

    element
        .ancestors()
        .take_while(|ancestor| ancestor.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| skip.matches(&ancestor))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
