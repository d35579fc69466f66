//! Embedding providers: turn text into a fixed-length vector.

pub mod config;
pub mod embedder;

pub use config::{EmbedderConfig, EmbedderSource};
pub use embedder::{create_embedder, Embedder};

/// Errors from embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding error: {0}")]
    EmbeddingError(String),
}
