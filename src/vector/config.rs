use serde::{Deserialize, Serialize};

use super::VectorError;

pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Where embeddings come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbedderSource {
    /// Any server speaking the OpenAI `/v1/embeddings` protocol.
    #[default]
    OpenAi,
    /// Local ONNX inference; needs the `local-embeddings` feature.
    FastEmbed,
}

impl std::str::FromStr for EmbedderSource {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(EmbedderSource::OpenAi),
            "fastembed" => Ok(EmbedderSource::FastEmbed),
            other => Err(VectorError::EmbeddingError(format!(
                "unknown embedder source \"{other}\" (expected openAi or fastEmbed)"
            ))),
        }
    }
}

/// Configuration for creating an embedder.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct EmbedderConfig {
    pub source: EmbedderSource,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub dimensions: Option<usize>,
}

impl EmbedderConfig {
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn validate(&self) -> Result<(), VectorError> {
        match self.source {
            EmbedderSource::OpenAi => {
                // `apiKey` is optional for self-hosted servers.
                if self.url.as_deref().map_or(true, str::is_empty) {
                    return Err(VectorError::EmbeddingError(
                        "openAi embedder requires `url`".into(),
                    ));
                }
            }
            EmbedderSource::FastEmbed => {}
        }
        if self.dimensions == Some(0) {
            return Err(VectorError::EmbeddingError(
                "`dimensions` must be positive".into(),
            ));
        }
        Ok(())
    }
}
