//! Error types for the candor library.
//!
//! All fallible operations in the crate return [`Result`], whose error side is
//! the [`CandorError`] enum. Variants are grouped the way callers need to react
//! to them: bad input, unusable training data, broken artifacts, and wrapped
//! runtime failures from the I/O and serialization layers.
//!
//! # Examples
//!
//! ```
//! use candor::error::{CandorError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(CandorError::invalid_argument("max_features must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for candor operations.
#[derive(Error, Debug)]
pub enum CandorError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Review text was empty or whitespace only.
    #[error("No review text provided")]
    EmptyReview,

    /// The dataset file does not exist.
    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// A required dataset column is absent from the header row.
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    /// A label value that the configured mapping does not recognize.
    #[error("Unrecognized label '{value}' on data row {row}")]
    UnknownLabel { value: String, row: usize },

    /// Fewer than two distinct classes are present.
    #[error("Training requires two classes, found only {0}")]
    SingleClass(String),

    /// The vectorizer was fitted on no documents.
    #[error("Cannot fit vectorizer on an empty corpus")]
    EmptyCorpus,

    /// Fitting produced no terms at all.
    #[error("Empty vocabulary: every document was empty after cleaning")]
    EmptyVocabulary,

    /// An artifact file is missing.
    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// An artifact file failed validation.
    #[error("Corrupt artifact {}: {reason}", .path.display())]
    CorruptArtifact { path: PathBuf, reason: String },

    /// The vectorizer and model artifacts come from different training runs.
    #[error("Artifact mismatch: vectorizer {vectorizer} does not pair with model {model}")]
    ArtifactMismatch { vectorizer: String, model: String },

    /// Invalid argument or configuration.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Internal failure with no better classification.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with CandorError.
pub type Result<T> = std::result::Result<T, CandorError>;

impl CandorError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        CandorError::Analysis(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        CandorError::InvalidArgument(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        CandorError::Internal(msg.into())
    }

    /// Create a new corrupt artifact error.
    pub fn corrupt<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        CandorError::CorruptArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by
    /// the data, the artifacts or the runtime.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CandorError::EmptyReview
                | CandorError::DatasetNotFound(_)
                | CandorError::MissingColumn(_)
                | CandorError::UnknownLabel { .. }
                | CandorError::ArtifactNotFound(_)
                | CandorError::InvalidArgument(_)
        )
    }
}
