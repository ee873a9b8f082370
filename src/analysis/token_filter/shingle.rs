//! Shingle (word n-gram) filter.
//!
//! Turns a token stream into the n-grams the vectorizer counts. With the
//! default range `(1, 2)` the stream `great battery life` becomes
//! `great`, `battery`, `life`, `great battery`, `battery life`.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{CandorError, Result};

/// Separator placed between the words of a shingle.
pub const SHINGLE_SEPARATOR: &str = " ";

/// A filter that emits every n-gram of adjacent tokens with
/// `min_size <= n <= max_size`.
///
/// Unigrams come first in input order, then bigrams, and so on. Stopped
/// tokens are dropped before shingles are formed.
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
}

impl ShingleFilter {
    /// Create a shingle filter for the inclusive size range.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 || min_size > max_size {
            return Err(CandorError::invalid_argument(format!(
                "Invalid n-gram range ({min_size}, {max_size})"
            )));
        }
        Ok(ShingleFilter { min_size, max_size })
    }

    /// The inclusive n-gram size range.
    pub fn range(&self) -> (usize, usize) {
        (self.min_size, self.max_size)
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.filter(|t| !t.is_stopped()).collect();
        let mut shingles = Vec::new();

        for n in self.min_size..=self.max_size {
            if n == 1 {
                shingles.extend(words.iter().cloned());
                continue;
            }
            for window in words.windows(n) {
                let text = window
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(SHINGLE_SEPARATOR);
                let first = &window[0];
                let last = &window[n - 1];
                shingles.push(
                    Token::with_offsets(text, first.position, first.start_offset, last.end_offset)
                        .with_position_length(n),
                );
            }
        }

        Ok(Box::new(shingles.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(filter: &ShingleFilter, words: &[&str]) -> Vec<String> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_unigrams_and_bigrams() {
        let filter = ShingleFilter::new(1, 2).unwrap();
        assert_eq!(
            texts(&filter, &["great", "battery", "life"]),
            vec!["great", "battery", "life", "great battery", "battery life"]
        );
    }

    #[test]
    fn test_bigrams_only() {
        let filter = ShingleFilter::new(2, 2).unwrap();
        assert_eq!(texts(&filter, &["works", "well"]), vec!["works well"]);
        assert!(texts(&filter, &["single"]).is_empty());
    }

    #[test]
    fn test_shingle_spans_positions() {
        let filter = ShingleFilter::new(2, 2).unwrap();
        let tokens = vec![
            Token::with_offsets("fast", 0, 0, 4),
            Token::with_offsets("shipping", 1, 5, 13),
        ];
        let out: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_offset, 0);
        assert_eq!(out[0].end_offset, 13);
        assert_eq!(out[0].position_length, 2);
    }

    #[test]
    fn test_invalid_range() {
        assert!(ShingleFilter::new(0, 2).is_err());
        assert!(ShingleFilter::new(3, 2).is_err());
    }
}
