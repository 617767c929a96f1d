//! Validation and normalization for embeddings entering the system
//!
//! Embeddings arrive from the embedder, from snapshots on disk, and from
//! clients creating events. All of them pass through [`EmbeddingManager`]
//! before they are persisted.
//!
//! ```rust
//! use eventfeed::ml::{EmbeddingManager, EMBEDDING_DIM};
//!
//! let manager = EmbeddingManager::with_expected_dimensions(EMBEDDING_DIM);
//! let mut embedding = vec![0.5; EMBEDDING_DIM];
//! manager.validate_embedding(&embedding).unwrap();
//! manager.normalize_embedding(&mut embedding).unwrap();
//!
//! // Wrong-sized vectors coming back from storage become "no embedding"
//! assert!(manager.sanitize(Some(&[1.0, 2.0])).is_none());
//! ```

use super::error::{MLError, Result};
use super::vector;

/// Embedding validation utilities
#[derive(Debug, Clone)]
pub struct EmbeddingManager {
    /// Expected embedding dimensions (optional validation)
    expected_dimensions: Option<usize>,
}

impl EmbeddingManager {
    /// Create a new embedding manager without a dimension check
    pub fn new() -> Self {
        Self {
            expected_dimensions: None,
        }
    }

    /// Create an embedding manager with expected dimensions for validation
    pub fn with_expected_dimensions(expected_dimensions: usize) -> Self {
        Self {
            expected_dimensions: Some(expected_dimensions),
        }
    }

    /// Validate an embedding vector
    ///
    /// Checks for:
    /// - Non-empty vectors
    /// - Expected dimensions (if configured)
    /// - Finite values (no NaN/infinity)
    pub fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(MLError::embedding("Embedding cannot be empty"));
        }

        if let Some(expected) = self.expected_dimensions
            && embedding.len() != expected
        {
            return Err(MLError::Dimension {
                expected,
                got: embedding.len(),
            });
        }

        for (index, &value) in embedding.iter().enumerate() {
            if !value.is_finite() {
                return Err(MLError::InvalidValue { index, value });
            }
        }

        Ok(())
    }

    /// Normalize an embedding vector to unit length in place
    pub fn normalize_embedding(&self, embedding: &mut [f32]) -> Result<()> {
        if vector::is_zero(embedding) {
            return Err(MLError::embedding("Cannot normalize zero vector"));
        }

        let normalized = vector::normalize(embedding);
        embedding.copy_from_slice(&normalized);
        Ok(())
    }

    /// Validate and normalize a vector about to be persisted.
    ///
    /// The zero vector is accepted as-is: it is the "no embedding" sentinel.
    pub fn prepare(&self, embedding: Vec<f32>) -> Result<Vec<f32>> {
        self.validate_embedding(&embedding)?;
        if vector::is_zero(&embedding) {
            return Ok(embedding);
        }
        Ok(vector::normalize(&embedding))
    }

    /// Lenient variant of [`prepare`](Self::prepare) for data read back from
    /// storage or clients: a malformed vector is treated as "no embedding".
    pub fn sanitize(&self, embedding: Option<&[f32]>) -> Option<Vec<f32>> {
        let embedding = embedding?;
        match self.prepare(embedding.to_vec()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Discarding malformed embedding: {}", e);
                None
            }
        }
    }

    /// Get expected dimensions (if set)
    pub fn expected_dimensions(&self) -> Option<usize> {
        self.expected_dimensions
    }
}

impl Default for EmbeddingManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::EMBEDDING_DIM;

    #[test]
    fn test_validate_embedding() {
        let manager = EmbeddingManager::with_expected_dimensions(3);

        assert!(manager.validate_embedding(&[0.1, 0.2, 0.3]).is_ok());
        assert!(matches!(
            manager.validate_embedding(&[0.1, 0.2]),
            Err(MLError::Dimension {
                expected: 3,
                got: 2
            })
        ));
        assert!(manager.validate_embedding(&[]).is_err());
        assert!(matches!(
            manager.validate_embedding(&[0.1, f32::NAN, 0.3]),
            Err(MLError::InvalidValue { index: 1, .. })
        ));
    }

    #[test]
    fn test_normalize_embedding() {
        let manager = EmbeddingManager::new();

        let mut embedding = vec![3.0, 4.0];
        manager.normalize_embedding(&mut embedding).unwrap();
        assert!((embedding[0] - 0.6).abs() < 1e-6);
        assert!((embedding[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        assert!(manager.normalize_embedding(&mut zero).is_err());
    }

    #[test]
    fn test_prepare_keeps_zero_sentinel() {
        let manager = EmbeddingManager::with_expected_dimensions(EMBEDDING_DIM);

        let zero = vec![0.0; EMBEDDING_DIM];
        assert_eq!(manager.prepare(zero.clone()).unwrap(), zero);

        let mut raw = vec![0.0; EMBEDDING_DIM];
        raw[0] = 2.0;
        let prepared = manager.prepare(raw).unwrap();
        assert!((prepared[0] - 1.0).abs() < 1e-6);

        assert!(manager.prepare(vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_sanitize_drops_malformed() {
        let manager = EmbeddingManager::with_expected_dimensions(EMBEDDING_DIM);

        assert_eq!(manager.sanitize(None), None);
        assert_eq!(manager.sanitize(Some(&[1.0, 2.0])), None);

        let mut bad = vec![0.1; EMBEDDING_DIM];
        bad[7] = f32::INFINITY;
        assert_eq!(manager.sanitize(Some(&bad)), None);

        let good = vec![0.1; EMBEDDING_DIM];
        let out = manager.sanitize(Some(&good)).unwrap();
        assert!((crate::ml::l2_norm(&out) - 1.0).abs() < 1e-6);
    }
}
