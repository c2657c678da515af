use super::{element_text, is_inside, visible_text, DetailPage, Strategy};
use regex::Regex;
use scraper::Selector;
use std::sync::OnceLock;

/// Paragraphs shorter than this are navigation or captions
const MIN_PARAGRAPH_CHARS: usize = 30;

/// Whole-region fallbacks must be longer than this to count
const MIN_REGION_CHARS: usize = 50;

/// Subtrees inside the content region that never belong to a description
const EXCLUDED_REGIONS: &str =
    "script, style, .ads, .advertisement, .download-box, .download-link, .faq, iframe, .fb-like";

/// Openings of navigation prompts
const BOILERPLATE_PREFIXES: &[&str] = &["xem thêm", "tải về", "download"];

/// Phrases that mark site chrome anywhere in a paragraph
const BOILERPLATE_PHRASES: &[&str] = &[
    "click here",
    "đăng ký",
    "đăng nhập",
    "faq",
    "câu hỏi thường",
];

/// Section heading that is a whole paragraph on its own
const AUTHOR_INFO_HEADING: &str = "thông tin tác giả";

pub const STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("content region paragraphs", region_paragraphs),
    ("content region text", region_text),
    ("alternate content containers", alternate_containers),
];

fn trailing_chrome() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(xem thêm|tải về|download|click here|faq|câu hỏi).*")
            .expect("trailing chrome pattern is valid")
    })
}

fn content_region(page: &DetailPage) -> Option<scraper::ElementRef<'_>> {
    page.select_first("#chitiet.content")
        .or_else(|| page.select_first("#chitiet"))
}

fn is_boilerplate(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BOILERPLATE_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix))
        || BOILERPLATE_PHRASES.iter().any(|phrase| lowered.contains(phrase))
        || lowered == AUTHOR_INFO_HEADING
}

fn region_paragraphs(page: &DetailPage) -> Option<String> {
    let region = content_region(page)?;
    let paragraph = Selector::parse("p").ok()?;
    let excluded = Selector::parse(EXCLUDED_REGIONS).ok()?;

    let kept: Vec<String> = region
        .select(&paragraph)
        .filter(|p| !is_inside(p, &region, &excluded))
        .map(|p| element_text(&p))
        .filter(|text| text.chars().count() >= MIN_PARAGRAPH_CHARS && !is_boilerplate(text))
        .collect();

    Some(kept.join("\n\n"))
}

fn region_text(page: &DetailPage) -> Option<String> {
    let region = content_region(page)?;
    let excluded = Selector::parse(EXCLUDED_REGIONS).ok()?;

    let text = visible_text(&region, &excluded);
    let text = trailing_chrome().replace(&text, "").trim().to_string();

    (text.chars().count() > MIN_REGION_CHARS).then_some(text)
}

fn alternate_containers(page: &DetailPage) -> Option<String> {
    let container = page.select_first(".chitiet, .entry-content, article")?;
    let excluded = Selector::parse("script, style, .download-box, .faq").ok()?;

    let text = visible_text(&container, &excluded);
    (text.chars().count() > MIN_REGION_CHARS).then_some(text)
}
