use super::{element_text, DetailPage, Strategy};
use scraper::Selector;

const AUTHOR_LABELS: &[&str] = &["tác giả", "author"];

pub const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("details row link", row_link),
    ("details row text", row_text),
    ("author meta tag", meta_tag),
];

fn row_link(page: &DetailPage) -> Option<String> {
    let cell = page.labelled_cell(AUTHOR_LABELS)?;
    let link = Selector::parse("a").ok()?;
    cell.select(&link).next().map(|a| element_text(&a))
}

fn row_text(page: &DetailPage) -> Option<String> {
    page.labelled_cell(AUTHOR_LABELS).map(|cell| element_text(&cell))
}

fn meta_tag(page: &DetailPage) -> Option<String> {
    page.select_all("meta[property='book:author'], meta[name='author']")
        .into_iter()
        .filter_map(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}
