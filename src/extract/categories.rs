use super::{element_text, DetailPage, Strategy};
use scraper::Selector;
use std::collections::BTreeSet;

const GENRE_LABELS: &[&str] = &["thể loại", "genre", "category"];
const TAG_LABELS: &[&str] = &["từ khóa", "tags", "keywords"];

/// Whole tags too generic to be a category (compared case-insensitively)
const GENERIC_TAGS: &[&str] = &["ebook", "pdf", "full"];

const MAX_CATEGORY_CHARS: usize = 100;

pub const STRATEGIES: &[(&str, Strategy<BTreeSet<String>>)] = &[
    ("genre row labels", genre_row),
    ("tag row labels", tag_row),
];

fn row_labels(page: &DetailPage, labels: &[&str]) -> Option<Vec<String>> {
    let cell = page.labelled_cell(labels)?;
    let label = Selector::parse("a.label").ok()?;

    Some(
        cell.select(&label)
            .map(|a| element_text(&a))
            .filter(|text| !text.is_empty())
            .collect(),
    )
}

fn genre_row(page: &DetailPage) -> Option<BTreeSet<String>> {
    let labels = row_labels(page, GENRE_LABELS)?;
    Some(
        labels
            .into_iter()
            .filter(|name| name.chars().count() < MAX_CATEGORY_CHARS)
            .collect(),
    )
}

fn tag_row(page: &DetailPage) -> Option<BTreeSet<String>> {
    let labels = row_labels(page, TAG_LABELS)?;
    Some(
        labels
            .into_iter()
            .filter(|name| {
                let chars = name.chars().count();
                chars > 2
                    && chars < MAX_CATEGORY_CHARS
                    && !GENERIC_TAGS.iter().any(|generic| name.eq_ignore_ascii_case(generic))
            })
            .collect(),
    )
}
