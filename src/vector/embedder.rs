use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::config::{EmbedderConfig, EmbedderSource};
use super::VectorError;

// ── OpenAiEmbedder ──

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a [&'a str],
    model: &'a str,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// `{"error": {"message": ...}}`, the OpenAI error envelope.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn api_error(status: reqwest::StatusCode, body: &str) -> VectorError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());
    VectorError::EmbeddingError(format!("embedding API error ({status}): {detail}"))
}

/// Client for any server speaking the OpenAI `/v1/embeddings` protocol
/// (OpenAI, Ollama, text-embeddings-inference, vLLM).
#[derive(Debug)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    configured_dimensions: Option<usize>,
    detected_dimensions: OnceLock<usize>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbedderConfig) -> Result<Self, VectorError> {
        config.validate()?;
        let base = config.url.as_deref().unwrap_or_default().trim_end_matches('/');

        let client = reqwest::Client::builder().build().map_err(|e| {
            VectorError::EmbeddingError(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint: format!("{base}/v1/embeddings"),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model_name().to_owned(),
            configured_dimensions: config.dimensions,
            detected_dimensions: OnceLock::new(),
        })
    }

    /// One vector per input, in input order.
    pub async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            input: texts,
            model: &self.model,
            encoding_format: "float",
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| VectorError::EmbeddingError(format!("embedding request failed: {e}")))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            VectorError::EmbeddingError(format!("failed to read embedding response: {e}"))
        })?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let parsed: EmbeddingsResponse = serde_json::from_str(&text).map_err(|e| {
            VectorError::EmbeddingError(format!("failed to parse embedding response: {e}"))
        })?;
        if parsed.data.len() != texts.len() {
            return Err(VectorError::EmbeddingError(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // Servers may answer out of order; `index` is authoritative when present.
        let mut items: Vec<(usize, Vec<f32>)> = parsed
            .data
            .into_iter()
            .enumerate()
            .map(|(position, item)| (item.index.unwrap_or(position), item.embedding))
            .collect();
        items.sort_by_key(|(index, _)| *index);

        items
            .into_iter()
            .map(|(_, vector)| {
                self.check_dimensions(vector.len())?;
                Ok(vector)
            })
            .collect()
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        self.embed_documents(&[text])
            .await?
            .pop()
            .ok_or_else(|| VectorError::EmbeddingError("empty response from embedder".into()))
    }

    /// Configured width, else the width of the first response, else 0.
    pub fn dimensions(&self) -> usize {
        self.configured_dimensions
            .or_else(|| self.detected_dimensions.get().copied())
            .unwrap_or(0)
    }

    pub fn source(&self) -> EmbedderSource {
        EmbedderSource::OpenAi
    }

    fn check_dimensions(&self, got: usize) -> Result<(), VectorError> {
        let expected = match self.configured_dimensions {
            Some(d) => d,
            None => *self.detected_dimensions.get_or_init(|| got),
        };
        if got == expected {
            Ok(())
        } else {
            Err(VectorError::DimensionMismatch { expected, got })
        }
    }
}

// ── FastEmbedEmbedder ──

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

    use crate::vector::config::{EmbedderConfig, EmbedderSource};
    use crate::vector::VectorError;

    const SUPPORTED_MODELS: &[(&str, EmbeddingModel)] = &[
        ("all-minilm-l6-v2", EmbeddingModel::AllMiniLML6V2),
        ("all-minilm-l12-v2", EmbeddingModel::AllMiniLML12V2),
        ("bge-small-en-v1.5", EmbeddingModel::BGESmallENV15),
        ("bge-base-en-v1.5", EmbeddingModel::BGEBaseENV15),
        ("nomic-embed-text-v1.5", EmbeddingModel::NomicEmbedTextV15),
    ];

    /// Model names are matched case-insensitively.
    pub(super) fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, VectorError> {
        let wanted = name.to_lowercase();
        SUPPORTED_MODELS
            .iter()
            .find(|(known, _)| *known == wanted)
            .map(|(_, model)| model.clone())
            .ok_or_else(|| {
                let known: Vec<&str> = SUPPORTED_MODELS.iter().map(|(n, _)| *n).collect();
                VectorError::EmbeddingError(format!(
                    "unknown fastembed model \"{name}\"; supported: {}",
                    known.join(", ")
                ))
            })
    }

    /// In-process ONNX embedder. `TextEmbedding::embed` takes `&mut self`, so
    /// the model is shared behind a mutex and runs on the blocking pool.
    pub struct FastEmbedEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
        dimensions: usize,
    }

    impl std::fmt::Debug for FastEmbedEmbedder {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FastEmbedEmbedder")
                .field("dimensions", &self.dimensions)
                .finish_non_exhaustive()
        }
    }

    impl FastEmbedEmbedder {
        pub fn new(config: &EmbedderConfig) -> Result<Self, VectorError> {
            let model = parse_embedding_model(config.model_name())?;
            let dimensions = TextEmbedding::get_model_info(&model)
                .map_err(|e| VectorError::EmbeddingError(format!("failed to get model info: {e}")))?
                .dim;
            match config.dimensions {
                Some(expected) if expected != dimensions => {
                    return Err(VectorError::DimensionMismatch {
                        expected,
                        got: dimensions,
                    })
                }
                _ => {}
            }

            let mut options = TextInitOptions::new(model).with_show_download_progress(false);
            if let Ok(dir) = std::env::var("FASTEMBED_CACHE_DIR") {
                options = options.with_cache_dir(PathBuf::from(dir));
            }

            tracing::info!(model = config.model_name(), dimensions, "Loading local embedding model");
            let embedding = TextEmbedding::try_new(options).map_err(|e| {
                VectorError::EmbeddingError(format!("failed to load {}: {e}", config.model_name()))
            })?;

            Ok(Self {
                model: Arc::new(Mutex::new(embedding)),
                dimensions,
            })
        }

        pub async fn embed_documents(
            &self,
            texts: &[&str],
        ) -> Result<Vec<Vec<f32>>, VectorError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let model = Arc::clone(&self.model);
            let inputs: Vec<String> = texts.iter().map(|t| (*t).to_owned()).collect();

            let joined = tokio::task::spawn_blocking(move || {
                let mut model = model
                    .lock()
                    .map_err(|_| VectorError::EmbeddingError("embedding model lock poisoned".into()))?;
                model
                    .embed(inputs, None)
                    .map_err(|e| VectorError::EmbeddingError(format!("local embedding failed: {e}")))
            })
            .await;
            joined.map_err(|e| VectorError::EmbeddingError(format!("embedding task failed: {e}")))?
        }

        pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, VectorError> {
            self.embed_documents(&[text])
                .await?
                .pop()
                .ok_or_else(|| VectorError::EmbeddingError("local model returned no vector".into()))
        }

        pub fn dimensions(&self) -> usize {
            self.dimensions
        }

        pub fn source(&self) -> EmbedderSource {
            EmbedderSource::FastEmbed
        }
    }
}

// ── Embedder Enum ──

/// Enum dispatch over the embedder backends; async fns in traits are not
/// object safe.
#[derive(Debug)]
pub enum Embedder {
    OpenAi(Box<OpenAiEmbedder>),
    #[cfg(feature = "local-embeddings")]
    FastEmbed(Box<FastEmbedEmbedder>),
}

impl Embedder {
    pub async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        match self {
            Embedder::OpenAi(e) => e.embed_documents(texts).await,
            #[cfg(feature = "local-embeddings")]
            Embedder::FastEmbed(e) => e.embed_documents(texts).await,
        }
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        match self {
            Embedder::OpenAi(e) => e.embed_query(text).await,
            #[cfg(feature = "local-embeddings")]
            Embedder::FastEmbed(e) => e.embed_query(text).await,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Embedder::OpenAi(e) => e.dimensions(),
            #[cfg(feature = "local-embeddings")]
            Embedder::FastEmbed(e) => e.dimensions(),
        }
    }

    pub fn source(&self) -> EmbedderSource {
        match self {
            Embedder::OpenAi(e) => e.source(),
            #[cfg(feature = "local-embeddings")]
            Embedder::FastEmbed(e) => e.source(),
        }
    }
}

/// Validate config and create the matching embedder.
pub fn create_embedder(config: &EmbedderConfig) -> Result<Embedder, VectorError> {
    config.validate()?;
    match config.source {
        EmbedderSource::OpenAi => Ok(Embedder::OpenAi(Box::new(OpenAiEmbedder::new(config)?))),
        #[cfg(feature = "local-embeddings")]
        EmbedderSource::FastEmbed => Ok(Embedder::FastEmbed(Box::new(FastEmbedEmbedder::new(
            config,
        )?))),
        #[cfg(not(feature = "local-embeddings"))]
        EmbedderSource::FastEmbed => Err(VectorError::EmbeddingError(
            "local embedding (source: \"fastEmbed\") requires the `local-embeddings` feature"
                .into(),
        )),
    }
}
