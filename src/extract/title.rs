use super::{element_text, DetailPage, Strategy};
use crate::url::extract_domain;

/// Headings that are site chrome rather than a record title
const BOILERPLATE_HEADINGS: &[&str] = &["Tải Ebook", "DTV eBook"];

pub const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("site title marker", site_marker),
    ("generic heading", generic_heading),
    ("document title", document_title),
];

fn site_marker(page: &DetailPage) -> Option<String> {
    ["h2.ten_san_pham", ".ten_san_pham"]
        .iter()
        .filter_map(|css| page.select_first(css))
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn generic_heading(page: &DetailPage) -> Option<String> {
    let heading = page.select_first("h2").or_else(|| page.select_first("h1"))?;
    let text = element_text(&heading);

    if BOILERPLATE_HEADINGS.iter().any(|phrase| text.contains(phrase)) {
        return None;
    }

    Some(text)
}

/// `<title>` with the " | site" or " - site" suffix removed
fn document_title(page: &DetailPage) -> Option<String> {
    let mut text = element_text(&page.select_first("title")?);
    let domain = extract_domain(&page.base).unwrap_or_default();

    if !domain.is_empty() {
        for separator in [" | ", " - "] {
            let suffix = format!("{}{}", separator, domain);
            if let Some(stripped) = text.strip_suffix(suffix.as_str()) {
                text = stripped.trim().to_string();
            }
        }
    }

    if text.is_empty() || text.eq_ignore_ascii_case(&domain) || text.contains("Tải Ebook") {
        return None;
    }

    Some(text)
}
