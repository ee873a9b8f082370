//! Review text normalization.
//!
//! Cleaning lowercases the text, strips every character that is not a
//! lowercase ASCII letter or whitespace, splits on whitespace, drops English
//! stop words and joins the survivors with single spaces. The trainer and the
//! scorer both go through [`ReviewCleaner`], so the two can never disagree on
//! what a review looks like.
//!
//! # Examples
//!
//! ```
//! use candor::analysis::analyzer::ReviewCleaner;
//!
//! let cleaner = ReviewCleaner::new().unwrap();
//! let cleaned = cleaner.clean("This product is amazing! Best purchase ever!").unwrap();
//! assert_eq!(cleaned, "product amazing best purchase ever");
//! ```

use std::sync::Arc;

use rayon::prelude::*;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::lowercase::LowercaseCharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::Result;

/// Characters outside this class are removed after lowercasing.
pub const NON_LETTER_PATTERN: &str = r"[^a-z\s]";

/// Analyzer producing the cleaned tokens of a review.
#[derive(Clone, Debug)]
pub struct ReviewAnalyzer {
    inner: PipelineAnalyzer,
}

impl ReviewAnalyzer {
    /// Create the review analyzer with the English stop word list.
    pub fn new() -> Result<Self> {
        Self::with_stop_filter(StopFilter::new())
    }

    /// Create the review analyzer with a custom stop filter.
    pub fn with_stop_filter(stop_filter: StopFilter) -> Result<Self> {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                NON_LETTER_PATTERN,
                "",
            )?))
            .add_filter(Arc::new(stop_filter))
            .with_name("review");

        Ok(ReviewAnalyzer { inner: analyzer })
    }

    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Analyzer for ReviewAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "review"
    }
}

/// Turns raw review text into its cleaned form.
#[derive(Clone, Debug)]
pub struct ReviewCleaner {
    analyzer: ReviewAnalyzer,
}

impl ReviewCleaner {
    /// Create a cleaner backed by the default [`ReviewAnalyzer`].
    pub fn new() -> Result<Self> {
        Ok(ReviewCleaner {
            analyzer: ReviewAnalyzer::new()?,
        })
    }

    /// Create a cleaner backed by a specific analyzer.
    pub fn with_analyzer(analyzer: ReviewAnalyzer) -> Self {
        ReviewCleaner { analyzer }
    }

    /// Clean one document.
    pub fn clean(&self, text: &str) -> Result<String> {
        let words: Vec<String> = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        Ok(words.join(" "))
    }

    /// Clean many documents in parallel, preserving order.
    pub fn clean_all<S>(&self, texts: &[S]) -> Result<Vec<String>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.clean(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_example_review() {
        let cleaner = ReviewCleaner::new().unwrap();
        assert_eq!(
            cleaner
                .clean("This product is amazing and works perfectly!")
                .unwrap(),
            "product amazing works perfectly"
        );
    }

    #[test]
    fn test_clean_strips_digits_and_punctuation() {
        let cleaner = ReviewCleaner::new().unwrap();
        assert_eq!(
            cleaner.clean("5/5 STARS!!! Would buy again :)").unwrap(),
            "stars would buy"
        );
    }

    #[test]
    fn test_apostrophes_are_removed_inside_words() {
        let cleaner = ReviewCleaner::new().unwrap();
        // "didn't" becomes "didnt", which is not on the stop list.
        assert_eq!(
            cleaner.clean("It didn't work").unwrap(),
            "didnt work"
        );
    }

    #[test]
    fn test_clean_empty_and_stopword_only() {
        let cleaner = ReviewCleaner::new().unwrap();
        assert_eq!(cleaner.clean("").unwrap(), "");
        assert_eq!(cleaner.clean("   ").unwrap(), "");
        assert_eq!(cleaner.clean("it is what it is").unwrap(), "");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = ReviewCleaner::new().unwrap();
        let once = cleaner
            .clean("Terrible!!  Broke after 2 days; the seller NEVER replied.")
            .unwrap();
        let twice = cleaner.clean(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, "terrible broke days seller never replied");
    }

    #[test]
    fn test_clean_all_preserves_order() {
        let cleaner = ReviewCleaner::new().unwrap();
        let cleaned = cleaner
            .clean_all(&["Good product", "Bad PRODUCT!", "the"])
            .unwrap();
        assert_eq!(cleaned, vec!["good product", "bad product", ""]);
    }

    #[test]
    fn test_non_ascii_letters_are_stripped() {
        let cleaner = ReviewCleaner::new().unwrap();
        assert_eq!(cleaner.clean("Café très bon").unwrap(), "caf trs bon");
    }
}
