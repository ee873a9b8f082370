//! Reproducible train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{CandorError, Result};
use crate::ml::label::Label;

/// Train/test split parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out for evaluation, in `(0, 1)`.
    pub test_size: f64,
    pub seed: u64,
    /// Keep the class proportions of the full dataset in both partitions.
    pub stratify: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_size: 0.2,
            seed: 42,
            stratify: true,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(CandorError::invalid_argument(format!(
                "test_size must lie strictly between 0 and 1, got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Row indices of each partition, both sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition row indices `0..labels.len()` into train and test sets.
///
/// The test partition holds `ceil(test_size * n)` rows. When stratifying,
/// each class contributes in proportion to its size, with at least one row
/// of every class on each side; on very small datasets this can shift the
/// test size by one.
pub fn train_test_split(labels: &[Label], config: &SplitConfig) -> Result<SplitIndices> {
    config.validate()?;
    let n = labels.len();
    let n_test = (config.test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(CandorError::invalid_argument(format!(
            "test_size {} leaves an empty partition for {} rows",
            config.test_size, n
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (mut train, mut test) = if config.stratify {
        stratified(labels, n_test, &mut rng)?
    } else {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        (train, indices)
    };

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

fn stratified(
    labels: &[Label],
    n_test: usize,
    rng: &mut StdRng,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n = labels.len();
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, label) in labels.iter().enumerate() {
        by_class[label.code() as usize].push(i);
    }
    for label in Label::ALL {
        let count = by_class[label.code() as usize].len();
        if count < 2 {
            return Err(CandorError::invalid_argument(format!(
                "stratified split needs at least 2 '{label}' rows, found {count}"
            )));
        }
    }

    // Largest-remainder allocation of the test rows across classes.
    let exact: Vec<f64> = by_class
        .iter()
        .map(|rows| n_test as f64 * rows.len() as f64 / n as f64)
        .collect();
    let mut quota: Vec<usize> = exact.iter().map(|q| q.floor() as usize).collect();
    let mut remaining = n_test - quota.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..by_class.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(by_class[b].len().cmp(&by_class[a].len()))
    });
    for &k in order.iter().cycle() {
        if remaining == 0 {
            break;
        }
        quota[k] += 1;
        remaining -= 1;
    }

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (rows, &q) in by_class.iter_mut().zip(&quota) {
        let q = q.clamp(1, rows.len() - 1);
        rows.shuffle(rng);
        test.extend_from_slice(&rows[..q]);
        train.extend_from_slice(&rows[q..]);
    }
    Ok((train, test))
}
