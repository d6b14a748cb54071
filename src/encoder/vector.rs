//! Dense term vectors over a fitted vocabulary.

use serde::{Deserialize, Serialize};

/// Dense, non-negative term-weight vector indexed by a fixed vocabulary.
///
/// Vectors produced by the same encoder share one index space and can be
/// compared directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EncodedVector {
    values: Vec<f64>,
}

impl EncodedVector {
    /// Wrap raw weights.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// All-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self { values: vec![0.0; dim] }
    }

    /// Vector dimension (vocabulary size).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has dimension zero.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw weights.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// L2 norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Whether every weight is zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Dot product.
    pub fn dot(&self, other: &EncodedVector) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Elementwise maximum: a term present in either vector keeps its larger weight.
    pub fn union(&self, other: &EncodedVector) -> EncodedVector {
        let dim = self.len().max(other.len());
        let values = (0..dim)
            .map(|i| {
                let a = self.values.get(i).copied().unwrap_or(0.0);
                let b = other.values.get(i).copied().unwrap_or(0.0);
                a.max(b)
            })
            .collect();
        EncodedVector { values }
    }

    /// Scale to unit L2 norm in place. Zero vectors are left untouched.
    pub(crate) fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Probability distribution: negatives clipped to 0, `eps` added, divided by the sum.
    pub fn to_distribution(&self, eps: f64) -> Vec<f64> {
        let smoothed: Vec<f64> = self.values.iter().map(|v| v.max(0.0) + eps).collect();
        let total: f64 = smoothed.iter().sum();
        if total <= 0.0 {
            return smoothed;
        }
        smoothed.into_iter().map(|v| v / total).collect()
    }
}

/// Cosine similarity clamped into `[0, 1]`.
///
/// Returns 0.0 if either vector has zero norm.
pub fn cosine_similarity(a: &EncodedVector, b: &EncodedVector) -> f64 {
    let na = a.norm();
    let nb = b.norm();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (na * nb)).clamp(0.0, 1.0)
}
