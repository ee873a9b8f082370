//! Lowercase char filter.
//!
//! Lowercasing has to happen before non-letter characters are stripped,
//! otherwise upper-case letters would be removed along with punctuation.
//! That makes it a char filter here rather than a token filter.

use super::CharFilter;

/// A char filter that lowercases the whole input.
#[derive(Clone, Debug, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    /// Create a new lowercase char filter.
    pub fn new() -> Self {
        LowercaseCharFilter
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            input.to_ascii_lowercase()
        } else {
            input.to_lowercase()
        }
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
