//! # candor
//!
//! Genuine versus fake product review classification.
//!
//! ## Features
//!
//! - Review text normalization built on a small analysis pipeline
//! - TF-IDF features over word unigrams and bigrams
//! - Class-balanced, L2-regularized logistic regression trained with L-BFGS
//! - Checksummed artifact pairs that refuse to load mismatched halves
//! - A scoring service with a rounded confidence and a stable error contract
//!
//! ## Example
//!
//! ```no_run
//! use candor::scoring::{Scorer, ScoringService};
//!
//! # fn main() -> candor::error::Result<()> {
//! let service = ScoringService::new(Scorer::load("artifacts")?);
//! let verdict = service.check_review("Arrived broken and support never answered.")?;
//! println!("{} {:?}", verdict.prediction, verdict.confidence);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod artifact;
pub mod cli;
pub mod error;
pub mod ml;
pub mod scoring;
pub mod trainer;

pub mod prelude {
    pub use crate::analysis::analyzer::ReviewCleaner;
    pub use crate::error::{CandorError, Result};
    pub use crate::ml::{Classifier, Label, Prediction};
    pub use crate::scoring::{ReviewVerdict, Scorer, ScoringService, ServiceError};
    pub use crate::trainer::{Trainer, TrainerConfig, TrainingReport};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
