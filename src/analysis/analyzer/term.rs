//! Feature-term analyzer used by the TF-IDF vectorizer.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::shingle::ShingleFilter;
use crate::analysis::tokenizer::regex::{RegexTokenizer, WORD_PATTERN};
use crate::error::Result;

/// Splits cleaned text into words of two or more characters and emits the
/// word n-grams in the configured range.
#[derive(Clone, Debug)]
pub struct TermAnalyzer {
    inner: PipelineAnalyzer,
    ngram_range: (usize, usize),
}

impl TermAnalyzer {
    /// Create a term analyzer for the inclusive n-gram range.
    pub fn new(ngram_range: (usize, usize)) -> Result<Self> {
        let (min_n, max_n) = ngram_range;
        let analyzer = PipelineAnalyzer::new(Arc::new(RegexTokenizer::with_pattern(
            WORD_PATTERN,
        )?))
        .add_filter(Arc::new(ShingleFilter::new(min_n, max_n)?))
        .with_name("term");

        Ok(TermAnalyzer {
            inner: analyzer,
            ngram_range,
        })
    }

    /// The inclusive n-gram range this analyzer emits.
    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Collect the terms of one document.
    pub fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|t| t.text).collect())
    }
}

impl Analyzer for TermAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "term"
    }
}
