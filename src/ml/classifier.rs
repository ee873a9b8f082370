//! Review classifier trait definition.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::label::Label;
use crate::ml::sparse::SparseVector;

/// Probability of each label for one document. The two values sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub fake: f64,
    pub genuine: f64,
}

impl ClassProbabilities {
    /// Build from the probability of the positive (genuine) class.
    pub fn from_genuine(genuine: f64) -> Self {
        ClassProbabilities {
            fake: 1.0 - genuine,
            genuine,
        }
    }

    /// Probability of `label`.
    pub fn of(&self, label: Label) -> f64 {
        match label {
            Label::Fake => self.fake,
            Label::Genuine => self.genuine,
        }
    }

    /// The more probable label. Exact ties go to `Fake`.
    pub fn most_likely(&self) -> Label {
        if self.genuine > self.fake {
            Label::Genuine
        } else {
            Label::Fake
        }
    }
}

/// A predicted label and, when available, the probability assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub confidence: Option<f64>,
}

/// Review classifier trait.
///
/// Implementations map a TF-IDF feature vector to one of the two labels.
pub trait Classifier: Send + Sync {
    /// Predict the label for a feature vector.
    fn predict(&self, features: &SparseVector) -> Result<Label>;

    /// Per-class probabilities, or `None` when the classifier cannot
    /// produce them.
    fn predict_proba(&self, features: &SparseVector) -> Result<Option<ClassProbabilities>>;

    /// Predict a label together with the probability of that label.
    fn predict_with_confidence(&self, features: &SparseVector) -> Result<Prediction> {
        let label = self.predict(features)?;
        let confidence = self.predict_proba(features)?.map(|p| p.of(label));
        Ok(Prediction { label, confidence })
    }

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
