//! TF-IDF vectorizer for review feature extraction.
//!
//! Fitting builds a vocabulary of the most frequent unigrams and bigrams of
//! the training corpus and freezes it together with one smoothed IDF weight
//! per term. Transforming projects a cleaned document into that frozen space:
//! raw term counts times IDF, scaled to unit Euclidean norm. Terms outside
//! the vocabulary are dropped without error.
//!
//! # Examples
//!
//! ```
//! use candor::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
//!
//! let corpus = vec!["good product".to_string(), "bad product".to_string()];
//! let vectorizer = TfIdfVectorizer::fit(&corpus, VectorizerConfig::default()).unwrap();
//!
//! let features = vectorizer.transform("great product").unwrap();
//! let product = vectorizer.feature_index("product").unwrap();
//! assert!(vectorizer.feature_index("great").is_none());
//! assert!(features.get(product) > 0.0);
//! ```

use std::collections::HashMap;
use std::fmt;

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::TermAnalyzer;
use crate::error::{CandorError, Result};
use crate::ml::sparse::SparseVector;

/// Configuration for the TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Keep only this many terms, ranked by corpus frequency. `None` keeps all.
    pub max_features: Option<usize>,
    /// Inclusive word n-gram range.
    pub ngram_range: (usize, usize),
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(40_000),
            ngram_range: (1, 2),
        }
    }
}

impl VectorizerConfig {
    /// Check the configuration for values that can never fit.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == Some(0) {
            return Err(CandorError::invalid_argument(
                "max_features must be positive",
            ));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(CandorError::invalid_argument(format!(
                "Invalid n-gram range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

/// The serializable frozen state of a fitted vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub config: VectorizerConfig,
    /// Vocabulary terms in index order (alphabetical).
    pub terms: Vec<String>,
    /// IDF weight per term, aligned with `terms`.
    pub idf: Vec<f64>,
    /// Number of documents the vectorizer was fitted on.
    pub n_documents: usize,
}

/// A fitted, frozen TF-IDF vectorizer.
///
/// There is no way to re-fit an existing vectorizer; [`TfIdfVectorizer::fit`]
/// is the only constructor besides restoring a saved state.
#[derive(Clone)]
pub struct TfIdfVectorizer {
    state: VectorizerState,
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    analyzer: TermAnalyzer,
}

impl fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.state.n_documents)
            .field("ngram_range", &self.state.config.ngram_range)
            .finish()
    }
}

/// Per-term statistics gathered while fitting.
#[derive(Default)]
struct TermStats {
    term_frequency: AHashMap<String, u64>,
    document_frequency: AHashMap<String, usize>,
}

impl TermStats {
    fn merge(mut self, other: TermStats) -> TermStats {
        for (term, tf) in other.term_frequency {
            *self.term_frequency.entry(term).or_insert(0) += tf;
        }
        for (term, df) in other.document_frequency {
            *self.document_frequency.entry(term).or_insert(0) += df;
        }
        self
    }
}

impl TfIdfVectorizer {
    /// Fit a vectorizer on a corpus of cleaned documents.
    ///
    /// Fails with [`CandorError::EmptyCorpus`] when `documents` is empty and
    /// with [`CandorError::EmptyVocabulary`] when no document yields a term.
    pub fn fit<S>(documents: &[S], config: VectorizerConfig) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        config.validate()?;
        if documents.is_empty() {
            return Err(CandorError::EmptyCorpus);
        }

        let analyzer = TermAnalyzer::new(config.ngram_range)?;

        let stats = documents
            .par_iter()
            .map(|doc| -> Result<TermStats> {
                let mut stats = TermStats::default();
                for term in analyzer.terms(doc.as_ref())? {
                    *stats.term_frequency.entry(term).or_insert(0) += 1;
                }
                for term in stats.term_frequency.keys() {
                    stats.document_frequency.insert(term.clone(), 1);
                }
                Ok(stats)
            })
            .try_reduce(TermStats::default, |a, b| Ok(a.merge(b)))?;

        if stats.term_frequency.is_empty() {
            return Err(CandorError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, u64)> = stats.term_frequency.into_iter().collect();
        if let Some(limit) = config.max_features
            && ranked.len() > limit
        {
            // Most frequent first, ties broken alphabetically.
            ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(limit);
        }

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let n_documents = documents.len();
        let idf = terms
            .iter()
            .map(|term| {
                let df = stats.document_frequency.get(term).copied().unwrap_or(0);
                smoothed_idf(n_documents, df)
            })
            .collect();

        log::debug!(
            "Fitted TF-IDF vocabulary of {} terms on {} documents",
            terms.len(),
            n_documents
        );

        Self::from_state(VectorizerState {
            config,
            terms,
            idf,
            n_documents,
        })
    }

    /// Restore a vectorizer from its frozen state.
    pub fn from_state(state: VectorizerState) -> Result<Self> {
        state.config.validate()?;
        if state.terms.len() != state.idf.len() {
            return Err(CandorError::invalid_argument(format!(
                "Vectorizer state has {} terms but {} IDF weights",
                state.terms.len(),
                state.idf.len()
            )));
        }

        let vocabulary: HashMap<String, usize> = state
            .terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        if vocabulary.len() != state.terms.len() {
            return Err(CandorError::invalid_argument(
                "Vectorizer state contains duplicate terms",
            ));
        }

        let analyzer = TermAnalyzer::new(state.config.ngram_range)?;
        Ok(Self {
            state,
            vocabulary,
            analyzer,
        })
    }

    /// The frozen state, for persistence.
    pub fn state(&self) -> &VectorizerState {
        &self.state
    }

    /// Transform one cleaned document into a unit-norm TF-IDF vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for term in self.analyzer.terms(document)? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.state.idf[idx]))
            .collect();
        let mut vector = SparseVector::from_entries(self.vocabulary_size(), entries);
        vector.normalize();
        Ok(vector)
    }

    /// Transform many documents in parallel, preserving order.
    pub fn transform_all<S>(&self, documents: &[S]) -> Result<Vec<SparseVector>>
    where
        S: AsRef<str> + Sync,
    {
        documents
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Index of a term in the frozen vocabulary.
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Vocabulary terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.state.terms
    }

    /// IDF weights in index order.
    pub fn idf(&self) -> &[f64] {
        &self.state.idf
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.state.terms.len()
    }

    /// Number of documents seen while fitting.
    pub fn n_documents(&self) -> usize {
        self.state.n_documents
    }
}

/// `ln((1 + n) / (1 + df)) + 1`, which stays positive even for terms present
/// in every document.
fn smoothed_idf(n_documents: usize, document_frequency: usize) -> f64 {
    ((1.0 + n_documents as f64) / (1.0 + document_frequency as f64)).ln() + 1.0
}
