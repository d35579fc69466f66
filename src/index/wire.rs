//! Request payloads sent to the index service.

use serde::Serialize;

use super::config::{IndexConfig, Precision, SpaceType};
use super::{IndexError, Metadata};

/// Body of `POST /index/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIndexRequest<'a> {
    pub index_name: &'a str,
    pub dim: usize,
    pub space_type: SpaceType,
    #[serde(rename = "M")]
    pub m: usize,
    pub ef_con: usize,
    pub precision: Precision,
}

impl<'a> From<&'a IndexConfig> for CreateIndexRequest<'a> {
    fn from(config: &'a IndexConfig) -> Self {
        Self {
            index_name: &config.name,
            dim: config.dimension,
            space_type: config.space_type,
            m: config.m,
            ef_con: config.ef_construction,
            precision: config.precision,
        }
    }
}

/// A document to insert. The id is chosen by the caller so that a failed
/// insert can be retried with the same identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

impl Document {
    /// New document with a random UUID v4 id.
    pub fn new(vector: Vec<f32>, metadata: Metadata) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), vector, metadata)
    }

    pub fn with_id(id: impl Into<String>, vector: Vec<f32>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata,
        }
    }
}

/// One element of the `POST /index/{name}/vector/insert` batch. `meta` is
/// JSON text; the service stores it without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertRecord<'a> {
    pub id: &'a str,
    pub vector: &'a [f32],
    pub meta: String,
}

pub fn encode_document(document: &Document) -> Result<InsertRecord<'_>, IndexError> {
    let meta = serde_json::to_string(&document.metadata)
        .map_err(|e| IndexError::Encode(format!("metadata for {}: {e}", document.id)))?;
    Ok(InsertRecord {
        id: &document.id,
        vector: &document.vector,
        meta,
    })
}

pub fn encode_documents(documents: &[Document]) -> Result<Vec<InsertRecord<'_>>, IndexError> {
    documents.iter().map(encode_document).collect()
}

/// A nearest-neighbor query. `ef_search` is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub ef_search: usize,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.top_k == 0 {
            return Err(IndexError::InvalidArgument("top_k must be positive".into()));
        }
        if self.ef_search == 0 {
            return Err(IndexError::InvalidArgument(
                "ef_search must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Body of `POST /index/{name}/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest<'a> {
    pub vector: &'a [f32],
    pub k: usize,
    pub ef: usize,
    pub include_vectors: bool,
}

/// Vectors are never requested back.
pub fn encode_query(query: &SearchQuery) -> SearchRequest<'_> {
    SearchRequest {
        vector: &query.vector,
        k: query.top_k,
        ef: query.ef_search,
        include_vectors: false,
    }
}
