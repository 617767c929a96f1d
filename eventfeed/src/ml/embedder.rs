//! Text embedding capability
//!
//! The ranking core only needs "text in, unit vector out". The concrete
//! model sits behind [`Embedder`] so a hosted model can be swapped in
//! without touching the recommender.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::error::Result;
use super::vector;
use super::EMBEDDING_DIM;
use crate::search::keywords;

/// Produces fixed-dimension embeddings for free text.
///
/// Implementations must return L2-normalized vectors of length
/// [`Embedder::dimension`], and the all-zero vector for empty text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Number of components in every produced vector
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model
    fn model_name(&self) -> String;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Local embedder based on signed feature hashing.
///
/// Each non-stop-word token (and each adjacent token pair) is hashed with
/// SHA-256; the first bytes select a bucket and the sign. The result is
/// deterministic across processes and needs no model download.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_name: String,
}

impl HashingEmbedder {
    /// Create a hashing embedder producing [`EMBEDDING_DIM`] components
    pub fn new() -> Self {
        Self::with_dimension(EMBEDDING_DIM)
    }

    /// Create a hashing embedder with a custom dimension
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            model_name: format!("feature-hash-sha256-{}", dimension),
        }
    }

    /// Override the reported model name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    fn accumulate(&self, acc: &mut [f64], feature: &str, weight: f64) {
        let digest = Sha256::digest(feature.as_bytes());
        let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
            % self.dimension;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        acc[bucket] += sign * weight;
    }

    /// Synchronous embedding used by both the trait and benchmarks
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let tokens = keywords::words(text);
        if tokens.is_empty() || self.dimension == 0 {
            return vec![0.0; self.dimension];
        }

        let mut acc = vec![0.0f64; self.dimension];
        for token in &tokens {
            self.accumulate(&mut acc, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut acc, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let raw: Vec<f32> = acc.into_iter().map(|x| x as f32).collect();
        vector::normalize(&raw)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{cosine_similarity, is_zero, l2_norm};

    #[tokio::test]
    async fn test_hashing_embedder_unit_length() {
        let embedder = HashingEmbedder::new();
        let v = embedder.embed("Rust meetup downtown").await.unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new();
        assert!(is_zero(&embedder.embed("").await.unwrap()));
        assert!(is_zero(&embedder.embed("the and of").await.unwrap()));
    }

    #[tokio::test]
    async fn test_deterministic_and_similar() {
        let embedder = HashingEmbedder::new();
        let a = embedder.embed("machine learning workshop").await.unwrap();
        let b = embedder.embed("machine learning workshop").await.unwrap();
        assert_eq!(a, b);

        let related = embedder.embed("workshop on machine learning").await.unwrap();
        let unrelated = embedder.embed("pottery for beginners").await.unwrap();
        assert!(cosine_similarity(&a, &related) > cosine_similarity(&a, &unrelated));
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let embedder = HashingEmbedder::new();
        let texts = vec!["jazz night".to_string(), String::new()];
        let out = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], embedder.embed_text("jazz night"));
        assert!(is_zero(&out[1]));
    }

    #[tokio::test]
    async fn test_mock_embedder() {
        let mut mock = MockEmbedder::new();
        mock.expect_dimension().return_const(4usize);
        mock.expect_embed()
            .returning(|_| Ok(vec![1.0, 0.0, 0.0, 0.0]));

        assert_eq!(mock.dimension(), 4);
        assert_eq!(mock.embed("anything").await.unwrap()[0], 1.0);
    }
}
