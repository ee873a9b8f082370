//! Text analysis module for candor.
//!
//! Raw review text flows through char filters, a tokenizer and token filters
//! before it reaches the vectorizer. The same building blocks produce the
//! cleaned review text and the unigram/bigram terms of the feature space.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
