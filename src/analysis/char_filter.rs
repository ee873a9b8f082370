//! Char filter implementations for text normalization.
//!
//! Char filters rewrite the raw string before it is passed to the tokenizer.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseCharFilter`] - Unicode lowercasing
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//!
//! # Examples
//!
//! ```
//! use candor::analysis::char_filter::CharFilter;
//! use candor::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"[^a-z\s]", "").unwrap();
//! assert_eq!(filter.filter("wow!! 10/10"), "wow ");
//! ```

pub mod lowercase;
pub mod pattern_replace;

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}
