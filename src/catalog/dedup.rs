use crate::catalog::{Catalog, CatalogResult};

/// Comparison key for titles: trimmed and case-folded
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Returns true when `title` matches any of `existing` after trim and
/// case-folding
pub fn is_duplicate<S: AsRef<str>>(title: &str, existing: &[S]) -> bool {
    let key = title_key(title);
    existing.iter().any(|other| title_key(other.as_ref()) == key)
}

/// Checks `title` against the catalog's current titles
///
/// Titles are read fresh on every call; the catalog may change between and
/// within runs.
pub fn is_known_title(catalog: &dyn Catalog, title: &str) -> CatalogResult<bool> {
    let titles = catalog.find_all_titles()?;
    Ok(is_duplicate(title, &titles))
}
