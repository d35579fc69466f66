//! Resume upload and job-description matching on top of the index client.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{MatcherError, Result};
use crate::extract::{extract_pdf_text, ExtractError};
use crate::index::{CreateOutcome, IndexClient, Metadata, SearchResult};
use crate::vector::{create_embedder, Embedder, VectorError};

pub const RESUME_SNIPPET_CHARS: usize = 200;
pub const JOB_SNIPPET_CHARS: usize = 100;

/// Identifier assigned to a stored resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub resume_id: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub job_description_snippet: String,
    pub matches: Vec<SearchResult>,
}

/// Embeds resumes and job descriptions and stores or queries them in one
/// index. Shareable across request handlers behind an `Arc`.
#[derive(Debug)]
pub struct ResumeMatcher {
    client: IndexClient,
    embedder: Embedder,
}

impl ResumeMatcher {
    pub fn new(client: IndexClient, embedder: Embedder) -> Self {
        Self { client, embedder }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = IndexClient::new(settings.client.clone(), settings.index.clone())?;
        let embedder = create_embedder(&settings.embedder)?;
        tracing::info!(
            embedder = ?embedder.source(),
            model = settings.embedder.model_name(),
            index = %settings.index.name,
            "Resume matcher configured"
        );
        Ok(Self::new(client, embedder))
    }

    pub fn client(&self) -> &IndexClient {
        &self.client
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Provision the index. Failure is returned, not fatal: the caller
    /// decides whether to keep serving.
    pub async fn startup(&self) -> Result<CreateOutcome> {
        Ok(self.client.ensure_index().await?)
    }

    /// Extract, embed and store one PDF resume.
    pub async fn upload_resume(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadReceipt> {
        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            return Err(MatcherError::UnsupportedFormat(
                "Only PDF files are supported.".into(),
            ));
        }

        // pdf-extract is CPU bound and may panic on malformed input.
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| ExtractError::Parse(format!("extraction task failed: {e}")))??;

        if text.trim().is_empty() {
            return Err(MatcherError::EmptyDocument(filename.to_string()));
        }
        self.index_resume_text(filename, &text).await
    }

    /// Embed and store already-extracted resume text under a fresh id.
    pub async fn index_resume_text(&self, filename: &str, text: &str) -> Result<UploadReceipt> {
        if text.trim().is_empty() {
            return Err(MatcherError::EmptyDocument(filename.to_string()));
        }

        let vector = self
            .embedder
            .embed_documents(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::EmbeddingError("embedder returned no vector".into()))?;

        let resume_id = uuid::Uuid::new_v4().to_string();
        let mut metadata = Metadata::new();
        metadata.insert("filename".into(), filename.into());
        metadata.insert(
            "text_snippet".into(),
            snippet(text, RESUME_SNIPPET_CHARS).into(),
        );

        self.client.insert(&resume_id, &vector, &metadata).await?;
        tracing::info!(
            resume_id = %resume_id,
            filename,
            chars = text.chars().count(),
            "Resume indexed"
        );

        Ok(UploadReceipt {
            resume_id,
            filename: filename.to_string(),
        })
    }

    /// Best-matching resumes for a job description, most similar first.
    pub async fn match_job(&self, description: &str, top_k: usize) -> Result<MatchReport> {
        if description.trim().is_empty() {
            return Err(MatcherError::InvalidRequest(
                "Job description cannot be empty.".into(),
            ));
        }
        if top_k == 0 {
            return Err(MatcherError::InvalidRequest(
                "top_k must be at least 1.".into(),
            ));
        }

        let vector = self.embedder.embed_query(description).await?;
        let matches = self
            .client
            .search(&vector, top_k, self.client.default_ef_search())
            .await?;
        tracing::debug!(top_k, returned = matches.len(), "Job description matched");

        Ok(MatchReport {
            job_description_snippet: snippet(description, JOB_SNIPPET_CHARS),
            matches,
        })
    }
}

/// First `max_chars` characters of `text` followed by `...`.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
