//! Offline training pipeline.
//!
//! [`Trainer::train`] runs the whole batch job: load the dataset, clean every
//! review, split, fit the vectorizer on the training rows only, fit the
//! classifier, evaluate on the held-out rows, and write the artifact pair.
//! Nothing touches the output directory until every earlier step succeeded.
//!
//! # Examples
//!
//! ```no_run
//! use candor::trainer::{Trainer, TrainerConfig};
//!
//! # fn main() -> candor::error::Result<()> {
//! let mut config = TrainerConfig::default();
//! config.dataset.path = "reviews.csv".into();
//! config.output_dir = "artifacts".into();
//!
//! let report = Trainer::new(config)?.train()?;
//! println!("accuracy: {:.3}", report.evaluation.accuracy);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::analyzer::ReviewCleaner;
use crate::artifact::{self, ArtifactPaths, ModelRecord};
use crate::error::Result;
use crate::ml::classifier::{Classifier, Prediction};
use crate::ml::dataset::{Dataset, DatasetConfig};
use crate::ml::label::Label;
use crate::ml::logistic::{LogisticRegression, LogisticRegressionConfig};
use crate::ml::metrics::EvaluationReport;
use crate::ml::split::{SplitConfig, train_test_split};
use crate::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
use crate::scoring::Scorer;

/// Review scored after training as a quick sanity check.
pub const DEFAULT_SAMPLE_REVIEW: &str = "This product is amazing and works perfectly!";

/// Everything a training run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub dataset: DatasetConfig,
    /// Directory receiving `vectorizer.bin` and `model.bin`.
    pub output_dir: PathBuf,
    pub split: SplitConfig,
    pub vectorizer: VectorizerConfig,
    pub classifier: LogisticRegressionConfig,
    /// Scored after training; `None` skips the check.
    pub sample_review: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            dataset: DatasetConfig::default(),
            output_dir: PathBuf::from("artifacts"),
            split: SplitConfig::default(),
            vectorizer: VectorizerConfig::default(),
            classifier: LogisticRegressionConfig::default(),
            sample_review: Some(DEFAULT_SAMPLE_REVIEW.to_string()),
        }
    }
}

impl TrainerConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: TrainerConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.dataset.validate()?;
        self.split.validate()?;
        self.vectorizer.validate()?;
        self.classifier.validate()
    }
}

/// The sanity-check prediction made after training.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePrediction {
    pub review: String,
    pub prediction: Prediction,
}

/// Summary of a finished training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub fingerprint: Uuid,
    pub dataset_rows: usize,
    pub skipped_rows: usize,
    /// Rows per label in the whole dataset, indexed by label code.
    pub class_counts: [usize; 2],
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub iterations: usize,
    pub converged: bool,
    pub evaluation: EvaluationReport,
    pub sample: Option<SamplePrediction>,
    pub artifacts: ArtifactPaths,
    pub elapsed_ms: u64,
}

/// A fitted vectorizer and classifier that have not been written yet.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub vectorizer: TfIdfVectorizer,
    pub classifier: LogisticRegression,
    pub evaluation: EvaluationReport,
    pub train_size: usize,
    pub test_size: usize,
    /// Training rows per label, indexed by label code.
    pub class_counts: [usize; 2],
}

/// Runs training jobs.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainerConfig,
    cleaner: ReviewCleaner,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer {
            config,
            cleaner: ReviewCleaner::new()?,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Load the configured dataset, fit, and write the artifacts.
    pub fn train(&self) -> Result<TrainingReport> {
        let started = Instant::now();
        let dataset = Dataset::load(&self.config.dataset)?;
        self.train_on(&dataset, started)
    }

    /// Fit on an already loaded dataset and write the artifacts.
    pub fn train_dataset(&self, dataset: &Dataset) -> Result<TrainingReport> {
        self.train_on(dataset, Instant::now())
    }

    fn train_on(&self, dataset: &Dataset, started: Instant) -> Result<TrainingReport> {
        let model = self.fit(dataset)?;

        let sample = match &self.config.sample_review {
            Some(review) => {
                let scorer = Scorer::new(
                    self.cleaner.clone(),
                    model.vectorizer.clone(),
                    Box::new(model.classifier.clone()),
                );
                let prediction = scorer.score(review)?;
                log::info!(
                    "sample review {:?} -> {} ({})",
                    review,
                    prediction.label.display_name(),
                    prediction
                        .confidence
                        .map(|c| format!("{:.1}%", c * 100.0))
                        .unwrap_or_else(|| "no confidence".to_string())
                );
                Some(SamplePrediction {
                    review: review.clone(),
                    prediction,
                })
            }
            None => None,
        };

        let fingerprint = Uuid::new_v4();
        let record = ModelRecord {
            classifier: model.classifier,
            evaluation: model.evaluation,
            train_size: model.train_size,
            test_size: model.test_size,
            class_counts: model.class_counts,
        };
        let artifacts = artifact::write_pair(
            &self.config.output_dir,
            fingerprint,
            model.vectorizer.state(),
            &record,
        )?;

        let summary = *record.classifier.summary();
        Ok(TrainingReport {
            fingerprint,
            dataset_rows: dataset.len(),
            skipped_rows: dataset.skipped(),
            class_counts: dataset.class_counts(),
            train_size: record.train_size,
            test_size: record.test_size,
            vocabulary_size: model.vectorizer.vocabulary_size(),
            iterations: summary.iterations,
            converged: summary.converged,
            evaluation: record.evaluation,
            sample,
            artifacts,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Fit the vectorizer and classifier on `dataset` without writing
    /// anything.
    pub fn fit(&self, dataset: &Dataset) -> Result<TrainedModel> {
        dataset.require_two_classes()?;
        let counts = dataset.class_counts();
        log::info!(
            "label distribution: {} genuine, {} fake",
            counts[Label::Genuine.code() as usize],
            counts[Label::Fake.code() as usize]
        );

        let cleaned = self.cleaner.clean_all(dataset.texts())?;
        let split = train_test_split(dataset.labels(), &self.config.split)?;
        log::info!(
            "split {} rows into {} train / {} test",
            dataset.len(),
            split.train.len(),
            split.test.len()
        );

        let train_texts: Vec<&str> = split.train.iter().map(|&i| cleaned[i].as_str()).collect();
        let train_labels: Vec<Label> = split.train.iter().map(|&i| dataset.labels()[i]).collect();
        let test_texts: Vec<&str> = split.test.iter().map(|&i| cleaned[i].as_str()).collect();
        let test_labels: Vec<Label> = split.test.iter().map(|&i| dataset.labels()[i]).collect();

        let vectorizer = TfIdfVectorizer::fit(&train_texts, self.config.vectorizer.clone())?;
        log::info!("vocabulary size: {}", vectorizer.vocabulary_size());

        let train_features = vectorizer.transform_all(&train_texts)?;
        let classifier =
            LogisticRegression::fit(&train_features, &train_labels, &self.config.classifier)?;

        let test_features = vectorizer.transform_all(&test_texts)?;
        let predicted = test_features
            .iter()
            .map(|x| classifier.predict(x))
            .collect::<Result<Vec<Label>>>()?;
        let evaluation = EvaluationReport::evaluate(&test_labels, &predicted)?;
        log::info!("held-out accuracy: {:.4}", evaluation.accuracy);
        log::debug!("evaluation:\n{evaluation}");

        let mut class_counts = [0usize; 2];
        for label in &train_labels {
            class_counts[label.code() as usize] += 1;
        }

        Ok(TrainedModel {
            vectorizer,
            classifier,
            evaluation,
            train_size: train_labels.len(),
            test_size: test_labels.len(),
            class_counts,
        })
    }
}
