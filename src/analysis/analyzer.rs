//! Analyzers combine char filters, a tokenizer and token filters.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Token Stream
//! ```
//!
//! Two analyzers matter to the classifier:
//!
//! - [`review::ReviewAnalyzer`] normalizes raw review text (lowercase, strip
//!   everything but letters and whitespace, drop stop words). Its output,
//!   joined with single spaces, is the cleaned review.
//! - [`term::TermAnalyzer`] splits cleaned text into the unigram and bigram
//!   terms counted by the TF-IDF vectorizer.

pub mod pipeline;
pub mod review;
pub mod term;

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub use pipeline::PipelineAnalyzer;
pub use review::{ReviewAnalyzer, ReviewCleaner};
pub use term::TermAnalyzer;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so a single analyzer can be shared by
/// every scoring thread.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
