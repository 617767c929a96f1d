//! Embedding utilities for the recommendation core
//!
//! This module owns everything vector-shaped:
//! - [`vector`]: pure normalization and cosine similarity helpers
//! - [`model_manager`]: validation of stored or user-provided embeddings
//! - [`embedder`]: the text embedding capability and its local adapter
//!
//! Every persisted vector in the system has the same fixed dimension,
//! [`EMBEDDING_DIM`]. It is never inferred per call.

pub mod embedder;
pub mod error;
pub mod model_manager;
pub mod vector;

pub use embedder::{Embedder, HashingEmbedder};
pub use error::{MLError, Result};
pub use model_manager::EmbeddingManager;
pub use vector::{blend, cosine_similarity, is_zero, l2_norm, normalize, normalize_or_zero};

/// Dimension of every user and event embedding
pub const EMBEDDING_DIM: usize = 384;

/// Type for embedding vectors
pub type EmbeddingVector = Vec<f32>;
