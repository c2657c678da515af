use super::DetailPage;
use std::collections::BTreeSet;

/// A single way of producing a field value from a page
pub type Strategy<T> = fn(&DetailPage) -> Option<T>;

/// Values that can be judged plausible without knowing which strategy made them
pub trait Plausible {
    fn is_plausible(&self) -> bool;
}

impl Plausible for String {
    fn is_plausible(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Plausible for BTreeSet<String> {
    fn is_plausible(&self) -> bool {
        !self.is_empty()
    }
}

/// Runs `strategies` in order and returns the first plausible value
///
/// Strategies are pure; they see the same page and nothing else. The name
/// of the winning strategy is logged at debug level.
pub fn first_match<T: Plausible>(
    field: &str,
    page: &DetailPage,
    strategies: &[(&str, Strategy<T>)],
) -> Option<T> {
    for (name, strategy) in strategies {
        if let Some(value) = strategy(page).filter(Plausible::is_plausible) {
            tracing::debug!("{} resolved by strategy '{}'", field, name);
            return Some(value);
        }
    }

    tracing::debug!("{} not found by any of {} strategies", field, strategies.len());
    None
}
