//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A sparse vector of `(index, value)` pairs sorted by index.
///
/// Every index is below `dim`, and no index appears twice. Zero entries are
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// An all-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            entries: Vec::new(),
        }
    }

    /// Build a vector from unordered entries.
    ///
    /// Duplicate indices are summed, zeros and out-of-range indices dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(idx, _)| idx < dim);
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, value) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == idx => last.1 += value,
                _ => merged.push((idx, value)),
            }
        }
        merged.retain(|&(_, value)| value != 0.0);

        SparseVector {
            dim,
            entries: merged,
        }
    }

    /// Dimension of the space this vector lives in.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index`, zero when absent.
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(idx, _)| idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Iterate over the stored entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product with a dense vector.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(idx, value)| dense.get(idx).copied().unwrap_or(0.0) * value)
            .sum()
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, v)| v * v)
            .sum::<f64>()
            .sqrt()
    }

    /// Scale to unit Euclidean norm. The zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for (_, value) in &mut self.entries {
                *value /= norm;
            }
        }
    }

    /// Add `scale * self` into a dense accumulator.
    pub fn axpy_into(&self, scale: f64, dense: &mut [f64]) {
        for &(idx, value) in &self.entries {
            if let Some(slot) = dense.get_mut(idx) {
                *slot += scale * value;
            }
        }
    }

    /// Expand into a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(idx, value) in &self.entries {
            dense[idx] = value;
        }
        dense
    }
}
