//! Labeled review datasets read from CSV.
//!
//! The first row is the header. Only the configured text and label columns
//! are read; every other column is ignored.
//!
//! ```csv
//! category,rating,label,text_
//! Home_and_Kitchen,5.0,CG,"Love this! Well made, sturdy, and very comfortable."
//! Home_and_Kitchen,5.0,OR,"love it, a great upgrade from the original."
//! ```

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{CandorError, Result};
use crate::ml::label::{Label, LabelMapping};

/// Where the dataset lives and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub text_column: String,
    pub label_column: String,
    pub delimiter: char,
    pub labels: LabelMapping,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            path: PathBuf::from("fake reviews dataset.csv"),
            text_column: "text_".to_string(),
            label_column: "label".to_string(),
            delimiter: ',',
            labels: LabelMapping::default(),
        }
    }
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(CandorError::invalid_argument(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        if self.text_column.is_empty() || self.label_column.is_empty() {
            return Err(CandorError::invalid_argument(
                "text and label column names must not be empty",
            ));
        }
        self.labels.validate()
    }
}

/// Review texts with their labels, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    texts: Vec<String>,
    labels: Vec<Label>,
    skipped: usize,
}

impl Dataset {
    /// Build a dataset from parallel vectors.
    pub fn new(texts: Vec<String>, labels: Vec<Label>) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(CandorError::invalid_argument(format!(
                "got {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        Ok(Dataset {
            texts,
            labels,
            skipped: 0,
        })
    }

    /// Load the dataset file named by `config`.
    pub fn load(config: &DatasetConfig) -> Result<Self> {
        if !config.path.is_file() {
            return Err(CandorError::DatasetNotFound(config.path.clone()));
        }
        let file = File::open(&config.path)?;
        let dataset = Self::from_reader(file, config)?;
        log::info!(
            "loaded {} rows from {} ({} skipped)",
            dataset.len(),
            config.path.display(),
            dataset.skipped
        );
        Ok(dataset)
    }

    /// Read CSV data from any reader. `config.path` is ignored.
    ///
    /// Rows with a blank label are skipped with a warning. A non-blank label
    /// the mapping does not know is an error naming the 1-based data row.
    pub fn from_reader<R: Read>(reader: R, config: &DatasetConfig) -> Result<Self> {
        config.validate()?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(config.delimiter as u8)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CandorError::MissingColumn(name.to_string()))
        };
        let text_idx = column(&config.text_column)?;
        let label_idx = column(&config.label_column)?;

        let mut texts = Vec::new();
        let mut labels = Vec::new();
        let mut skipped = 0;

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let raw_label = record.get(label_idx).unwrap_or("").trim();
            if raw_label.is_empty() {
                log::warn!("skipping data row {row}: blank label");
                skipped += 1;
                continue;
            }
            let label = config
                .labels
                .parse(raw_label)
                .ok_or_else(|| CandorError::UnknownLabel {
                    value: raw_label.to_string(),
                    row,
                })?;
            texts.push(record.get(text_idx).unwrap_or("").to_string());
            labels.push(label);
        }

        Ok(Dataset {
            texts,
            labels,
            skipped,
        })
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Rows dropped for having a blank label.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row count per label, indexed by label code.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for label in &self.labels {
            counts[label.code() as usize] += 1;
        }
        counts
    }

    /// Fail unless both labels occur.
    pub fn require_two_classes(&self) -> Result<()> {
        if self.is_empty() {
            return Err(CandorError::EmptyCorpus);
        }
        let counts = self.class_counts();
        match Label::ALL.iter().find(|l| counts[l.code() as usize] == 0) {
            Some(missing) => Err(CandorError::SingleClass(missing.opposite().to_string())),
            None => Ok(()),
        }
    }

    /// The rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            texts: indices.iter().map(|&i| self.texts[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "category,rating,label,text_\n\
        Home,5.0,CG,\"Love this! Well made, sturdy.\"\n\
        Home,4.0,OR,\"Works fine, arrived late.\"\n\
        Home,1.0,,\"no label here\"\n\
        Toys,2.0,or,Broke quickly\n";

    #[test]
    fn test_from_reader() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes(), &DatasetConfig::default()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.skipped(), 1);
        assert_eq!(dataset.texts()[0], "Love this! Well made, sturdy.");
        assert_eq!(
            dataset.labels(),
            &[Label::Fake, Label::Genuine, Label::Genuine]
        );
        assert_eq!(dataset.class_counts(), [1, 2]);
        assert!(dataset.require_two_classes().is_ok());
    }

    #[test]
    fn test_missing_column() {
        let config = DatasetConfig {
            text_column: "review".to_string(),
            ..Default::default()
        };
        let err = Dataset::from_reader(SAMPLE.as_bytes(), &config).unwrap_err();
        assert!(matches!(err, CandorError::MissingColumn(ref c) if c == "review"));
    }

    #[test]
    fn test_unknown_label_names_row() {
        let data = "label,text_\nOR,fine\nmaybe,hmm\n";
        let err = Dataset::from_reader(data.as_bytes(), &DatasetConfig::default()).unwrap_err();
        match err {
            CandorError::UnknownLabel { value, row } => {
                assert_eq!(value, "maybe");
                assert_eq!(row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_delimiter_and_mapping() {
        let data = "verdict;body\nreal;good stuff\nfake;bad stuff\n";
        let config = DatasetConfig {
            text_column: "body".to_string(),
            label_column: "verdict".to_string(),
            delimiter: ';',
            ..Default::default()
        };
        let dataset = Dataset::from_reader(data.as_bytes(), &config).unwrap();
        assert_eq!(dataset.labels(), &[Label::Genuine, Label::Fake]);
    }

    #[test]
    fn test_single_class_dataset() {
        let data = "label,text_\nOR,one\nOR,two\n";
        let dataset = Dataset::from_reader(data.as_bytes(), &DatasetConfig::default()).unwrap();
        assert!(matches!(
            dataset.require_two_classes(),
            Err(CandorError::SingleClass(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let config = DatasetConfig {
            path: PathBuf::from("/nonexistent/reviews.csv"),
            ..Default::default()
        };
        assert!(matches!(
            Dataset::load(&config),
            Err(CandorError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn test_select() {
        let dataset = Dataset::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![Label::Fake, Label::Genuine, Label::Fake],
        )
        .unwrap();
        let picked = dataset.select(&[2, 0]);
        assert_eq!(picked.texts(), &["c".to_string(), "a".to_string()]);
    }
}
