//! Feature extraction and classification.
//!
//! Cleaned review text flows through [`tfidf::TfIdfVectorizer`] into
//! [`sparse::SparseVector`]s, which a [`classifier::Classifier`] such as
//! [`logistic::LogisticRegression`] maps to a [`label::Label`].

pub mod classifier;
pub mod dataset;
pub mod label;
pub mod logistic;
pub mod metrics;
pub mod optim;
pub mod sparse;
pub mod split;
pub mod tfidf;

pub use self::classifier::{ClassProbabilities, Classifier, Prediction};
pub use self::dataset::{Dataset, DatasetConfig};
pub use self::label::{Label, LabelMapping};
pub use self::logistic::{LogisticRegression, LogisticRegressionConfig};
pub use self::metrics::EvaluationReport;
pub use self::split::{SplitConfig, train_test_split};
pub use self::tfidf::{TfIdfVectorizer, VectorizerConfig, VectorizerState};
