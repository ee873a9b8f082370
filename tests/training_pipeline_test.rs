//! End-to-end tests for training from CSV and loading the artifacts back.

use std::fs;
use std::path::{Path, PathBuf};

use candor::artifact::{self, MODEL_FILE, VECTORIZER_FILE};
use candor::error::{CandorError, Result};
use candor::ml::label::Label;
use candor::scoring::Scorer;
use candor::trainer::{Trainer, TrainerConfig};
use tempfile::TempDir;

const GENUINE: &[&str] = &[
    "Works as described, the battery lasts about two days.",
    "Sturdy build, although the instructions were confusing.",
    "Arrived late but the seller refunded shipping.",
    "Fits my older model after trimming the bracket slightly.",
    "Decent blender, loud on the highest setting.",
    "The strap broke after a month, replacement came quickly.",
    "Cable is shorter than pictured, works fine otherwise.",
    "Battery died after a year of daily use, reasonable for the price.",
    "Instructions missing, found the manual online.",
    "Setting it up took an hour, the bracket was bent.",
];

const FAKE: &[&str] = &[
    "Amazing amazing product best purchase ever highly recommend!",
    "Best product ever, amazing quality, highly recommend to everyone!",
    "Perfect perfect perfect, five stars, best seller ever!",
    "Highly recommend, amazing, best thing I ever bought!",
    "Absolutely amazing, perfect product, best purchase!",
    "Best quality ever, amazing, highly recommend this seller!",
    "Love love love it, perfect gift, amazing quality!",
    "Five stars, amazing, everyone must buy this perfect product!",
    "Wonderful amazing product, best ever, highly recommend!",
    "Perfect quality, amazing price, best purchase I ever made!",
];

fn write_dataset(dir: &Path, rows: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("reviews.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer
        .write_record(["category", "rating", "label", "text_"])
        .unwrap();
    for (label, text) in rows {
        writer
            .write_record(["Home_and_Kitchen", "5.0", label, text])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

fn balanced_rows() -> Vec<(&'static str, &'static str)> {
    GENUINE
        .iter()
        .zip(FAKE)
        .flat_map(|(g, f)| [("OR", *g), ("CG", *f)])
        .collect()
}

fn config(dataset: PathBuf, output_dir: PathBuf) -> TrainerConfig {
    let mut config = TrainerConfig::default();
    config.dataset.path = dataset;
    config.output_dir = output_dir;
    config
}

#[test]
fn test_train_then_score() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path(), &balanced_rows());
    let output = dir.path().join("artifacts");

    let report = Trainer::new(config(dataset, output.clone()))?.train()?;
    assert_eq!(report.dataset_rows, 20);
    assert_eq!(report.train_size, 16);
    assert_eq!(report.test_size, 4);
    assert!(report.vocabulary_size > 0);
    assert!(report.sample.is_some());
    assert!(output.join(VECTORIZER_FILE).is_file());
    assert!(output.join(MODEL_FILE).is_file());

    let scorer = Scorer::load(&output)?;
    assert_eq!(scorer.fingerprint(), Some(report.fingerprint));

    let fake = scorer.score("Amazing product, best ever, highly recommend!")?;
    assert_eq!(fake.label, Label::Fake);
    let genuine = scorer.score("The battery lasts two days and the bracket fits.")?;
    assert_eq!(genuine.label, Label::Genuine);

    for prediction in [fake, genuine] {
        let confidence = prediction.confidence.unwrap();
        assert!((0.5..=1.0).contains(&confidence));
    }
    Ok(())
}

#[test]
fn test_training_is_deterministic() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let dataset = write_dataset(dir.path(), &balanced_rows());
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    Trainer::new(config(dataset.clone(), first.clone()))?.train()?;
    Trainer::new(config(dataset, second.clone()))?.train()?;

    let a = artifact::read_pair(&first)?;
    let b = artifact::read_pair(&second)?;
    assert_eq!(a.vectorizer, b.vectorizer);
    assert_eq!(a.model.classifier, b.model.classifier);
    assert_eq!(a.model.evaluation, b.model.evaluation);
    // Every run gets its own fingerprint.
    assert_ne!(a.fingerprint(), b.fingerprint());
    Ok(())
}

#[test]
fn test_single_label_dataset_writes_no_artifacts() {
    let dir = TempDir::new().unwrap();
    let rows: Vec<(&str, &str)> = GENUINE.iter().map(|g| ("OR", *g)).collect();
    let dataset = write_dataset(dir.path(), &rows);
    let output = dir.path().join("artifacts");

    let err = Trainer::new(config(dataset, output.clone()))
        .unwrap()
        .train()
        .unwrap_err();
    assert!(matches!(err, CandorError::SingleClass(_)));
    assert!(!output.exists());
}

#[test]
fn test_failed_training_keeps_previous_artifacts() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("artifacts");
    let good = write_dataset(dir.path(), &balanced_rows());
    let report = Trainer::new(config(good, output.clone()))?.train()?;

    let bad_dir = dir.path().join("bad");
    fs::create_dir_all(&bad_dir)?;
    let rows: Vec<(&str, &str)> = FAKE.iter().map(|f| ("CG", *f)).collect();
    let bad = write_dataset(&bad_dir, &rows);
    assert!(Trainer::new(config(bad, output.clone()))?.train().is_err());

    let scorer = Scorer::load(&output)?;
    assert_eq!(scorer.fingerprint(), Some(report.fingerprint));
    Ok(())
}

#[test]
fn test_dataset_errors() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("artifacts");

    let missing = config(dir.path().join("nope.csv"), output.clone());
    assert!(matches!(
        Trainer::new(missing).unwrap().train(),
        Err(CandorError::DatasetNotFound(_))
    ));

    let dataset = write_dataset(dir.path(), &balanced_rows());
    let mut wrong_column = config(dataset.clone(), output.clone());
    wrong_column.dataset.text_column = "review_text".to_string();
    assert!(matches!(
        Trainer::new(wrong_column).unwrap().train(),
        Err(CandorError::MissingColumn(ref c)) if c == "review_text"
    ));

    let mut rows = balanced_rows();
    rows.push(("spam", "Buy now"));
    let unknown = write_dataset(dir.path(), &rows);
    let err = Trainer::new(config(unknown, output.clone()))
        .unwrap()
        .train()
        .unwrap_err();
    assert!(matches!(err, CandorError::UnknownLabel { ref value, row: 21 } if value == "spam"));
    assert!(err.is_input_error());
    assert!(!output.exists());
}

#[test]
fn test_blank_labels_are_skipped() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let mut rows = balanced_rows();
    rows.push(("", "No label on this one"));
    rows.push(("  ", "Nor on this one"));
    let dataset = write_dataset(dir.path(), &rows);

    let report = Trainer::new(config(dataset, dir.path().join("out")))?.train()?;
    assert_eq!(report.dataset_rows, 20);
    assert_eq!(report.skipped_rows, 2);
    Ok(())
}
