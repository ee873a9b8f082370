//! Binary logistic regression over sparse TF-IDF features.
//!
//! Training minimizes the sample-weighted mean log-loss plus an L2 penalty
//! on the weights (the intercept is not penalized):
//!
//! ```text
//! J(w, b) = (1/S) Σ sᵢ · ln(1 + exp(-yᵢ(w·xᵢ + b))) + ||w||² / (2·C·S)
//! ```
//!
//! where `yᵢ ∈ {-1, +1}`, `sᵢ` is the weight of sample `i` and `S = Σ sᵢ`.
//! With balanced class weights each sample of class `c` weighs
//! `n / (2 · n_c)`, so both classes contribute equally to the loss no matter
//! how skewed the dataset is. The objective is convex and minimized with
//! L-BFGS.

use serde::{Deserialize, Serialize};

use crate::error::{CandorError, Result};
use crate::ml::classifier::{ClassProbabilities, Classifier};
use crate::ml::label::Label;
use crate::ml::optim::{ConvergenceStatus, Lbfgs};
use crate::ml::sparse::SparseVector;

/// How training samples are weighted per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Every sample weighs one.
    Uniform,
    /// Samples weigh `n / (2 · n_class)`.
    Balanced,
}

/// Logistic regression hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength. Smaller values regularize more.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once no gradient component exceeds this.
    pub tol: f64,
    /// Number of L-BFGS correction pairs kept.
    pub history_size: usize,
    pub class_weight: ClassWeight,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        LogisticRegressionConfig {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            history_size: 10,
            class_weight: ClassWeight::Balanced,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(CandorError::invalid_argument(format!(
                "C must be a positive number, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(CandorError::invalid_argument("max_iter must be at least 1"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(CandorError::invalid_argument(format!(
                "tol must be a positive number, got {}",
                self.tol
            )));
        }
        if self.history_size == 0 {
            return Err(CandorError::invalid_argument(
                "history_size must be at least 1",
            ));
        }
        Ok(())
    }
}

/// How the optimizer finished.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    /// Final value of the regularized objective.
    pub loss: f64,
}

/// A fitted binary logistic regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    intercept: f64,
    config: LogisticRegressionConfig,
    summary: FitSummary,
}

impl LogisticRegression {
    /// Fit on feature vectors and their labels.
    pub fn fit(
        features: &[SparseVector],
        labels: &[Label],
        config: &LogisticRegressionConfig,
    ) -> Result<Self> {
        config.validate()?;
        if features.is_empty() {
            return Err(CandorError::invalid_argument(
                "cannot fit a classifier on zero samples",
            ));
        }
        if features.len() != labels.len() {
            return Err(CandorError::invalid_argument(format!(
                "got {} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        let n_features = features[0].dim();
        if let Some(bad) = features.iter().find(|x| x.dim() != n_features) {
            return Err(CandorError::invalid_argument(format!(
                "feature dimension {} does not match {}",
                bad.dim(),
                n_features
            )));
        }

        let mut counts = [0usize; 2];
        for label in labels {
            counts[label.code() as usize] += 1;
        }
        if let Some(missing) = Label::ALL.iter().find(|l| counts[l.code() as usize] == 0) {
            return Err(CandorError::SingleClass(missing.opposite().to_string()));
        }

        let n = labels.len() as f64;
        let class_weights = match config.class_weight {
            ClassWeight::Uniform => [1.0, 1.0],
            ClassWeight::Balanced => [n / (2.0 * counts[0] as f64), n / (2.0 * counts[1] as f64)],
        };
        let samples: Vec<(f64, f64)> = labels
            .iter()
            .map(|&label| {
                let y = if label == Label::Genuine { 1.0 } else { -1.0 };
                (y, class_weights[label.code() as usize])
            })
            .collect();
        let total_weight: f64 = samples.iter().map(|&(_, s)| s).sum();
        let c = config.c;

        // Sequential accumulation keeps repeated fits bit-identical.
        let objective = |theta: &[f64], grad: &mut [f64]| -> f64 {
            let (w, b) = theta.split_at(n_features);
            let b = b[0];
            grad.fill(0.0);

            let mut loss = 0.0;
            {
                let (grad_w, grad_b) = grad.split_at_mut(n_features);
                for (x, &(y, s)) in features.iter().zip(&samples) {
                    let margin = y * (x.dot(w) + b);
                    loss += s * log1p_exp(-margin);
                    let coef = -s * y * sigmoid(-margin);
                    x.axpy_into(coef, grad_w);
                    grad_b[0] += coef;
                }
            }

            let penalty_scale = 1.0 / (c * total_weight);
            let mut w_norm_sq = 0.0;
            for (g, &wj) in grad[..n_features].iter_mut().zip(w) {
                *g = *g / total_weight + penalty_scale * wj;
                w_norm_sq += wj * wj;
            }
            grad[n_features] /= total_weight;

            loss / total_weight + 0.5 * penalty_scale * w_norm_sq
        };

        let optimizer = Lbfgs::new(config.max_iter, config.tol, config.history_size);
        let result = optimizer.minimize(objective, vec![0.0; n_features + 1]);

        match result.status {
            ConvergenceStatus::Converged => log::debug!(
                "logistic regression converged after {} iterations (loss {:.6})",
                result.iterations,
                result.objective_value
            ),
            ConvergenceStatus::MaxIterations => log::warn!(
                "logistic regression did not converge within {} iterations (max |grad| {:.3e}); consider raising max_iter",
                result.iterations,
                result.gradient_norm
            ),
            ConvergenceStatus::Stalled => log::warn!(
                "logistic regression line search stalled after {} iterations (max |grad| {:.3e})",
                result.iterations,
                result.gradient_norm
            ),
        }

        if result.solution.iter().any(|v| !v.is_finite()) {
            return Err(CandorError::internal(
                "logistic regression produced non-finite parameters",
            ));
        }

        let mut weights = result.solution;
        let intercept = weights.pop().unwrap_or(0.0);
        Ok(LogisticRegression {
            weights,
            intercept,
            config: config.clone(),
            summary: FitSummary {
                iterations: result.iterations,
                converged: result.status == ConvergenceStatus::Converged,
                loss: result.objective_value,
            },
        })
    }

    /// Signed distance `w·x + b`. Positive means genuine.
    pub fn decision_function(&self, features: &SparseVector) -> Result<f64> {
        if features.dim() != self.weights.len() {
            return Err(CandorError::invalid_argument(format!(
                "feature dimension {} does not match model dimension {}",
                features.dim(),
                self.weights.len()
            )));
        }
        Ok(features.dot(&self.weights) + self.intercept)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    pub fn summary(&self) -> &FitSummary {
        &self.summary
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, features: &SparseVector) -> Result<Label> {
        let z = self.decision_function(features)?;
        Ok(if z > 0.0 { Label::Genuine } else { Label::Fake })
    }

    fn predict_proba(&self, features: &SparseVector) -> Result<Option<ClassProbabilities>> {
        let z = self.decision_function(features)?;
        Ok(Some(ClassProbabilities::from_genuine(sigmoid(z))))
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + exp(t))` without overflow.
fn log1p_exp(t: f64) -> f64 {
    if t > 0.0 {
        t + (-t).exp().ln_1p()
    } else {
        t.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> (Vec<SparseVector>, Vec<Label>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..5 {
            features.push(SparseVector::from_entries(3, vec![(0, 1.0)]));
            labels.push(Label::Genuine);
            features.push(SparseVector::from_entries(3, vec![(1, 1.0)]));
            labels.push(Label::Fake);
        }
        (features, labels)
    }

    #[test]
    fn test_fit_separable_data() {
        let (features, labels) = toy_data();
        let model =
            LogisticRegression::fit(&features, &labels, &LogisticRegressionConfig::default())
                .unwrap();

        assert!(model.summary().converged);
        assert_eq!(model.n_features(), 3);
        for (x, &y) in features.iter().zip(&labels) {
            assert_eq!(model.predict(x).unwrap(), y);
        }
        assert!(model.weights()[0] > 0.0);
        assert!(model.weights()[1] < 0.0);
        // Never seen during training, so its weight stays at zero.
        assert_eq!(model.weights()[2], 0.0);
    }

    #[test]
    fn test_confidence_is_probability_of_predicted_label() {
        let (features, labels) = toy_data();
        let model =
            LogisticRegression::fit(&features, &labels, &LogisticRegressionConfig::default())
                .unwrap();

        let x = SparseVector::from_entries(3, vec![(1, 1.0)]);
        let prediction = model.predict_with_confidence(&x).unwrap();
        let proba = model.predict_proba(&x).unwrap().unwrap();

        assert_eq!(prediction.label, Label::Fake);
        let confidence = prediction.confidence.unwrap();
        assert!(confidence > 0.5 && confidence < 1.0);
        assert_eq!(confidence, proba.fake);
        assert!((proba.fake + proba.genuine - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_weights_favor_minority_class() {
        // Nine genuine reviews with feature 0, one fake with feature 1. An
        // empty vector carries no evidence either way, so only the intercept
        // decides; balancing keeps it near zero.
        let mut features = vec![SparseVector::from_entries(2, vec![(0, 1.0)]); 9];
        let mut labels = vec![Label::Genuine; 9];
        features.push(SparseVector::from_entries(2, vec![(1, 1.0)]));
        labels.push(Label::Fake);

        let balanced =
            LogisticRegression::fit(&features, &labels, &LogisticRegressionConfig::default())
                .unwrap();
        let uniform = LogisticRegression::fit(
            &features,
            &labels,
            &LogisticRegressionConfig {
                class_weight: ClassWeight::Uniform,
                ..Default::default()
            },
        )
        .unwrap();

        assert!(balanced.intercept().abs() < uniform.intercept().abs());
        assert_eq!(
            balanced
                .predict(&SparseVector::from_entries(2, vec![(1, 1.0)]))
                .unwrap(),
            Label::Fake
        );
    }

    #[test]
    fn test_single_class_is_rejected() {
        let features = vec![SparseVector::from_entries(2, vec![(0, 1.0)]); 4];
        let labels = vec![Label::Genuine; 4];
        let err = LogisticRegression::fit(&features, &labels, &LogisticRegressionConfig::default())
            .unwrap_err();
        assert!(matches!(err, CandorError::SingleClass(ref l) if l == "genuine"));
    }

    #[test]
    fn test_bad_inputs_are_rejected() {
        let config = LogisticRegressionConfig::default();
        assert!(LogisticRegression::fit(&[], &[], &config).is_err());

        let (features, labels) = toy_data();
        assert!(LogisticRegression::fit(&features, &labels[1..], &config).is_err());

        let mut mixed = features.clone();
        mixed[0] = SparseVector::zeros(7);
        assert!(LogisticRegression::fit(&mixed, &labels, &config).is_err());

        let bad_config = LogisticRegressionConfig {
            c: 0.0,
            ..Default::default()
        };
        assert!(LogisticRegression::fit(&features, &labels, &bad_config).is_err());
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let (features, labels) = toy_data();
        let model =
            LogisticRegression::fit(&features, &labels, &LogisticRegressionConfig::default())
                .unwrap();
        assert!(model.predict(&SparseVector::zeros(5)).is_err());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (features, labels) = toy_data();
        let config = LogisticRegressionConfig::default();
        let a = LogisticRegression::fit(&features, &labels, &config).unwrap();
        let b = LogisticRegression::fit(&features, &labels, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_numerics_are_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!((log1p_exp(800.0) - 800.0).abs() < 1e-9);
        assert!(log1p_exp(-800.0) >= 0.0);
    }
}
