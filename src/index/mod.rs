//! Client for the external vector index service.
//!
//! The service stores fixed-dimension vectors with an opaque metadata string
//! and answers nearest-neighbor queries over HTTP. Everything here is the
//! client side of that contract: provisioning, insert encoding, query
//! encoding and normalizing the two search response encodings the service is
//! known to emit.

pub mod client;
pub mod config;
pub mod provision;
pub mod ranking;
pub mod response;
pub mod wire;

use serde::{Deserialize, Serialize};

pub use client::IndexClient;
pub use config::{ClientConfig, IndexConfig, Precision, SpaceType};
pub use provision::CreateOutcome;
pub use ranking::RankingPolicy;
pub use response::{Normalized, RawResponseItem};
pub use wire::{Document, SearchQuery};

/// Free-form document metadata, stored by the service as JSON text.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Errors from vector index client operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Vector length differs from the configured index dimension. Raised
    /// before anything is sent.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid index configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("index service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("failed to decode search response: {0}")]
    Decode(String),
}

impl IndexError {
    /// True for failures of the network exchange itself, as opposed to
    /// caller errors or payload decoding problems.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            IndexError::Transport { .. } | IndexError::Timeout { .. } | IndexError::Status { .. }
        )
    }
}

/// One ranked hit returned by [`IndexClient::search`].
///
/// `similarity_score` is `1.0 - distance` with no clamping; under cosine
/// space it ranges over `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub similarity_score: f64,
    pub metadata: Metadata,
}
