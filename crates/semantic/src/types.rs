use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// Single fixed-width vector, e.g. a mean-pooled text or a department centroid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// All-zero vector of width `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&x| x == 0.0)
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Per-token encoder output: one row per token (special tokens included),
/// each row `dim` wide. Stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEmbeddings {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl TokenEmbeddings {
    /// Wrap a row-major buffer. `data.len()` must equal `rows * dim`.
    pub fn from_flat(data: Vec<f32>, rows: usize, dim: usize) -> Result<Self, SemanticError> {
        if data.len() != rows * dim {
            return Err(SemanticError::Inference(format!(
                "token matrix of {} values cannot be shaped as {rows}x{dim}",
                data.len()
            )));
        }
        Ok(Self { data, rows, dim })
    }

    /// Build from individual rows; all rows must share the width `dim`.
    pub fn from_rows(rows: Vec<Vec<f32>>, dim: usize) -> Result<Self, SemanticError> {
        let count = rows.len();
        let mut data = Vec::with_capacity(count * dim);
        for row in rows {
            if row.len() != dim {
                return Err(SemanticError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: count,
            dim,
        })
    }

    /// Number of token rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Width of each token row.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        if idx >= self.rows {
            return None;
        }
        let start = idx * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // `chunks` panics on zero; a zero-width matrix has no meaningful rows.
        self.data.chunks(self.dim.max(1)).take(self.rows)
    }

    /// Average the token rows into one vector. A matrix without rows pools to zeros.
    pub fn mean_pool(&self) -> EmbeddingVector {
        let mut pooled = vec![0.0f32; self.dim];
        if self.rows == 0 {
            return EmbeddingVector(pooled);
        }
        for row in self.iter_rows() {
            for (acc, &val) in pooled.iter_mut().zip(row) {
                *acc += val;
            }
        }
        let n = self.rows as f32;
        for val in &mut pooled {
            *val /= n;
        }
        EmbeddingVector(pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_checks_shape() {
        assert!(TokenEmbeddings::from_flat(vec![0.0; 6], 2, 3).is_ok());
        assert!(TokenEmbeddings::from_flat(vec![0.0; 5], 2, 3).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = TokenEmbeddings::from_rows(vec![vec![1.0, 2.0], vec![1.0]], 2).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn row_access() {
        let m = TokenEmbeddings::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.dim(), 2);
        assert_eq!(m.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(m.row(2), None);
        assert_eq!(m.iter_rows().count(), 2);
    }

    #[test]
    fn mean_pool_averages_rows() {
        let m = TokenEmbeddings::from_rows(
            vec![vec![1.0, 0.0, 3.0], vec![3.0, 2.0, -1.0]],
            3,
        )
        .unwrap();
        assert_eq!(m.mean_pool().as_slice(), &[2.0, 1.0, 1.0]);
    }

    #[test]
    fn mean_pool_of_empty_matrix_is_zero_vector() {
        let m = TokenEmbeddings::from_rows(Vec::new(), 4).unwrap();
        let pooled = m.mean_pool();
        assert_eq!(pooled.dim(), 4);
        assert!(pooled.is_zero());
    }

    #[test]
    fn embedding_vector_norm() {
        let v = EmbeddingVector::new(vec![3.0, 4.0]);
        assert!((v.norm() - 5.0).abs() < 1e-6);
        assert!(!v.is_zero());
        assert!(EmbeddingVector::zeros(3).is_zero());
    }

    #[test]
    fn embedding_vector_serializes_as_plain_array() {
        let v = EmbeddingVector::new(vec![0.5, -0.5]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[0.5,-0.5]");
    }
}
