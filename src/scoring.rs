//! Scoring reviews with a trained artifact pair.
//!
//! [`Scorer`] is the immutable inference context: the cleaner, the frozen
//! vectorizer and the classifier. It is built once, either from artifacts on
//! disk with [`Scorer::load`] or from in-memory parts, and is then shared
//! freely between threads.
//!
//! [`ScoringService`] wraps a scorer with the contract a request handler
//! relays to its caller: blank input is a client error, anything that goes
//! wrong while scoring is an opaque server error, and a successful verdict
//! carries a rounded confidence.
//!
//! # Examples
//!
//! ```no_run
//! use candor::scoring::{Scorer, ScoringService};
//!
//! # fn main() -> candor::error::Result<()> {
//! let service = ScoringService::new(Scorer::load("artifacts")?);
//! match service.check_review("This product is amazing and works perfectly!") {
//!     Ok(verdict) => println!("{} ({:?}%)", verdict.prediction, verdict.confidence_percent),
//!     Err(e) => eprintln!("{} {}", e.status_code(), e.response().to_json()),
//! }
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::analyzer::ReviewCleaner;
use crate::artifact;
use crate::error::{CandorError, Result};
use crate::ml::classifier::{Classifier, Prediction};
use crate::ml::label::Label;
use crate::ml::tfidf::TfIdfVectorizer;

/// The inference context.
pub struct Scorer {
    cleaner: ReviewCleaner,
    vectorizer: TfIdfVectorizer,
    classifier: Box<dyn Classifier>,
    fingerprint: Option<Uuid>,
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("vectorizer", &self.vectorizer)
            .field("classifier", &self.classifier.name())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl Scorer {
    /// Assemble a scorer from in-memory parts.
    pub fn new(
        cleaner: ReviewCleaner,
        vectorizer: TfIdfVectorizer,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Scorer {
            cleaner,
            vectorizer,
            classifier,
            fingerprint: None,
        }
    }

    /// Load the artifact pair in `dir`.
    ///
    /// Fails when either file is missing or corrupt, or when the two files
    /// come from different training runs.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let loaded = artifact::read_pair(dir.as_ref())?;
        let fingerprint = loaded.fingerprint();
        let vectorizer = TfIdfVectorizer::from_state(loaded.vectorizer)?;
        log::info!(
            "loaded artifacts from {} (fingerprint {fingerprint}, {} terms)",
            dir.as_ref().display(),
            vectorizer.vocabulary_size()
        );

        Ok(Scorer {
            cleaner: ReviewCleaner::new()?,
            vectorizer,
            classifier: Box::new(loaded.model.classifier),
            fingerprint: Some(fingerprint),
        })
    }

    /// Fingerprint of the loaded artifacts, if loaded from disk.
    pub fn fingerprint(&self) -> Option<Uuid> {
        self.fingerprint
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Classify one raw review.
    ///
    /// Empty or whitespace-only text is rejected with
    /// [`CandorError::EmptyReview`].
    pub fn score(&self, text: &str) -> Result<Prediction> {
        if text.trim().is_empty() {
            return Err(CandorError::EmptyReview);
        }
        let cleaned = self.cleaner.clean(text)?;
        let features = self.vectorizer.transform(&cleaned)?;
        let prediction = self.classifier.predict_with_confidence(&features)?;
        log::debug!(
            "scored review ({} known terms): {} {:?}",
            features.nnz(),
            prediction.label,
            prediction.confidence
        );
        Ok(prediction)
    }

    /// Classify many reviews in parallel, preserving order.
    pub fn score_all<S>(&self, texts: &[S]) -> Vec<Result<Prediction>>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|t| self.score(t.as_ref())).collect()
    }
}

/// Round a probability to whole percent.
///
/// Returns `(fraction, percent)` where `fraction == percent / 100`, so the
/// two forms can never disagree.
pub fn round_confidence(probability: f64) -> (f64, u32) {
    let percent = (probability.clamp(0.0, 1.0) * 100.0).round() as u32;
    (f64::from(percent) / 100.0, percent)
}

/// Successful classification of one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    /// The review as scored, with surrounding whitespace removed.
    pub review: String,
    /// Human-readable label, e.g. `"Fake Review"`.
    pub prediction: String,
    pub label: Label,
    /// Probability of the predicted label, two decimal places.
    pub confidence: Option<f64>,
    pub confidence_percent: Option<u32>,
}

impl ReviewVerdict {
    pub fn new(review: impl Into<String>, prediction: Prediction) -> Self {
        let rounded = prediction.confidence.map(round_confidence);
        ReviewVerdict {
            review: review.into(),
            prediction: prediction.label.display_name().to_string(),
            label: prediction.label,
            confidence: rounded.map(|(fraction, _)| fraction),
            confidence_percent: rounded.map(|(_, percent)| percent),
        }
    }
}

/// Failure reported to the caller of [`ScoringService::check_review`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// The caller sent no review text.
    #[error("No review text provided")]
    EmptyReview,

    /// Scoring failed; details are logged, not returned.
    #[error("Failed to analyze review")]
    Internal,
}

impl ServiceError {
    /// HTTP status class of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::EmptyReview => 400,
            ServiceError::Internal => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::EmptyReview)
    }

    /// The JSON error body.
    pub fn response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl From<ServiceError> for CandorError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmptyReview => CandorError::EmptyReview,
            ServiceError::Internal => CandorError::internal(err.to_string()),
        }
    }
}

/// Error body, `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.error }).to_string()
    }
}

/// Review-checking front end over a [`Scorer`].
#[derive(Debug)]
pub struct ScoringService {
    scorer: Scorer,
}

impl ScoringService {
    pub fn new(scorer: Scorer) -> Self {
        ScoringService { scorer }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Check one review.
    ///
    /// The text is trimmed first; blank text yields
    /// [`ServiceError::EmptyReview`]. Errors and panics raised while scoring
    /// are logged and reported as [`ServiceError::Internal`].
    pub fn check_review(&self, text: &str) -> std::result::Result<ReviewVerdict, ServiceError> {
        let review = text.trim();
        if review.is_empty() {
            return Err(ServiceError::EmptyReview);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.scorer.score(review))) {
            Ok(Ok(prediction)) => Ok(ReviewVerdict::new(review, prediction)),
            Ok(Err(e)) => {
                log::error!("Failed to analyze review: {e}");
                Err(ServiceError::Internal)
            }
            Err(payload) => {
                log::error!(
                    "Failed to analyze review: scoring panicked: {}",
                    panic_message(payload.as_ref())
                );
                Err(ServiceError::Internal)
            }
        }
    }

    /// Check many reviews in parallel, preserving order.
    pub fn check_all<S>(&self, texts: &[S]) -> Vec<std::result::Result<ReviewVerdict, ServiceError>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|t| self.check_review(t.as_ref()))
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ml::classifier::ClassProbabilities;
    use crate::ml::logistic::{LogisticRegression, LogisticRegressionConfig};
    use crate::ml::sparse::SparseVector;
    use crate::ml::tfidf::VectorizerConfig;

    fn vectorizer() -> TfIdfVectorizer {
        TfIdfVectorizer::fit(&["good product", "bad product"], VectorizerConfig::default())
            .unwrap()
    }

    fn trained_scorer() -> Scorer {
        let vectorizer = vectorizer();
        let features = vectorizer
            .transform_all(&["good product", "bad product"])
            .unwrap();
        let classifier = LogisticRegression::fit(
            &features,
            &[Label::Genuine, Label::Fake],
            &LogisticRegressionConfig::default(),
        )
        .unwrap();
        Scorer::new(ReviewCleaner::new().unwrap(), vectorizer, Box::new(classifier))
    }

    struct NoProbabilities;

    impl Classifier for NoProbabilities {
        fn predict(&self, _features: &SparseVector) -> Result<Label> {
            Ok(Label::Fake)
        }

        fn predict_proba(&self, _features: &SparseVector) -> Result<Option<ClassProbabilities>> {
            Ok(None)
        }

        fn name(&self) -> &str {
            "no_probabilities"
        }
    }

    struct Exploding;

    impl Classifier for Exploding {
        fn predict(&self, _features: &SparseVector) -> Result<Label> {
            panic!("classifier exploded");
        }

        fn predict_proba(&self, _features: &SparseVector) -> Result<Option<ClassProbabilities>> {
            Err(CandorError::internal("unreachable"))
        }

        fn name(&self) -> &str {
            "exploding"
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn predict(&self, _features: &SparseVector) -> Result<Label> {
            Err(CandorError::internal("model offline"))
        }

        fn predict_proba(&self, _features: &SparseVector) -> Result<Option<ClassProbabilities>> {
            Err(CandorError::internal("model offline"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn service_with(classifier: Box<dyn Classifier>) -> ScoringService {
        ScoringService::new(Scorer::new(
            ReviewCleaner::new().unwrap(),
            vectorizer(),
            classifier,
        ))
    }

    #[test]
    fn test_score_good_and_bad() {
        let scorer = trained_scorer();
        assert_eq!(scorer.score("A good product!").unwrap().label, Label::Genuine);
        assert_eq!(scorer.score("BAD bad product").unwrap().label, Label::Fake);
    }

    #[test]
    fn test_score_rejects_blank_text() {
        let scorer = trained_scorer();
        assert!(matches!(scorer.score(""), Err(CandorError::EmptyReview)));
        assert!(matches!(scorer.score(" \n\t"), Err(CandorError::EmptyReview)));
    }

    #[test]
    fn test_unknown_words_still_score() {
        let scorer = trained_scorer();
        let prediction = scorer.score("zebra xylophone").unwrap();
        let confidence = prediction.confidence.unwrap();
        assert!((0.5..=1.0).contains(&confidence));
    }

    #[test]
    fn test_check_review_trims_and_rounds() {
        let service = ScoringService::new(trained_scorer());
        let verdict = service.check_review("   good product  \n").unwrap();

        assert_eq!(verdict.review, "good product");
        assert_eq!(verdict.label, Label::Genuine);
        assert_eq!(verdict.prediction, "Genuine Review");
        let percent = verdict.confidence_percent.unwrap();
        assert_eq!(verdict.confidence.unwrap(), f64::from(percent) / 100.0);
    }

    #[test]
    fn test_check_review_empty_is_client_error() {
        let service = ScoringService::new(trained_scorer());
        let err = service.check_review("   ").unwrap_err();
        assert_eq!(err, ServiceError::EmptyReview);
        assert_eq!(err.status_code(), 400);
        assert!(err.is_client_error());
        assert_eq!(err.response().to_json(), r#"{"error":"No review text provided"}"#);
    }

    #[test]
    fn test_missing_probabilities_are_none() {
        let service = service_with(Box::new(NoProbabilities));
        let verdict = service.check_review("good product").unwrap();
        assert_eq!(verdict.prediction, "Fake Review");
        assert_eq!(verdict.confidence, None);
        assert_eq!(verdict.confidence_percent, None);
    }

    #[test]
    fn test_errors_and_panics_become_internal() {
        for classifier in [
            Box::new(Failing) as Box<dyn Classifier>,
            Box::new(Exploding),
        ] {
            let service = service_with(classifier);
            let err = service.check_review("good product").unwrap_err();
            assert_eq!(err, ServiceError::Internal);
            assert_eq!(err.status_code(), 500);
            assert_eq!(err.response().to_json(), r#"{"error":"Failed to analyze review"}"#);
        }
    }

    #[test]
    fn test_round_confidence() {
        assert_eq!(round_confidence(0.8749), (0.87, 87));
        assert_eq!(round_confidence(0.875), (0.88, 88));
        assert_eq!(round_confidence(1.0), (1.0, 100));
        assert_eq!(round_confidence(0.5), (0.5, 50));
    }

    #[test]
    fn test_check_all_preserves_order() {
        let service = ScoringService::new(trained_scorer());
        let results = service.check_all(&["good product", "", "bad product"]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().label, Label::Genuine);
        assert_eq!(results[1], Err(ServiceError::EmptyReview));
        assert_eq!(results[2].as_ref().unwrap().label, Label::Fake);
    }
}
