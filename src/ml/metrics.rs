//! Held-out evaluation of a fitted classifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CandorError, Result};
use crate::ml::label::Label;

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

/// Accuracy, confusion matrix and per-class scores on a test partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// `confusion[actual][predicted]`, indexed by label code.
    pub confusion: [[usize; 2]; 2],
    pub per_class: Vec<ClassMetrics>,
    pub samples: usize,
}

impl EvaluationReport {
    /// Score predictions against the true labels.
    pub fn evaluate(actual: &[Label], predicted: &[Label]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(CandorError::invalid_argument(format!(
                "got {} true labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        if actual.is_empty() {
            return Err(CandorError::invalid_argument(
                "cannot evaluate on zero samples",
            ));
        }

        let mut confusion = [[0usize; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            confusion[a.code() as usize][p.code() as usize] += 1;
        }

        let correct = confusion[0][0] + confusion[1][1];
        let per_class = Label::ALL
            .iter()
            .map(|&label| {
                let k = label.code() as usize;
                let tp = confusion[k][k];
                let support = confusion[k][0] + confusion[k][1];
                let predicted_k = confusion[0][k] + confusion[1][k];
                let precision = ratio(tp, predicted_k);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Ok(EvaluationReport {
            accuracy: ratio(correct, actual.len()),
            confusion,
            per_class,
            samples: actual.len(),
        })
    }

    /// Scores of one class.
    pub fn class(&self, label: Label) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|m| m.label == label)
    }

    /// Unweighted mean F1 over both classes.
    pub fn macro_f1(&self) -> f64 {
        if self.per_class.is_empty() {
            return 0.0;
        }
        self.per_class.iter().map(|m| m.f1).sum::<f64>() / self.per_class.len() as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4} ({} samples)", self.accuracy, self.samples)?;
        writeln!(f, "{:>16} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1", "support")?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>16} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                m.label.display_name(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f, "Confusion matrix (rows = actual, columns = predicted):")?;
        writeln!(f, "{:>16} {:>9} {:>9}", "", "fake", "genuine")?;
        for label in Label::ALL {
            let row = self.confusion[label.code() as usize];
            writeln!(f, "{:>16} {:>9} {:>9}", label.as_str(), row[0], row[1])?;
        }
        Ok(())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
