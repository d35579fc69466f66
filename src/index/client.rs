use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;

use super::config::{ClientConfig, IndexConfig};
use super::provision::{classify_create_response, CreateOutcome};
use super::ranking::RankingPolicy;
use super::response::normalize;
use super::wire::{
    encode_documents, encode_query, CreateIndexRequest, Document, InsertRecord, SearchQuery,
};
use super::{IndexError, Metadata, SearchResult};

/// HTTP client for one index on the vector index service.
///
/// Holds only read-only configuration, one reusable `reqwest::Client` and a
/// counter of dropped response items, so a single instance can be shared
/// across concurrent tasks. Every operation is one request/response exchange
/// with no retry. Dropping an operation's future aborts its request.
#[derive(Debug)]
pub struct IndexClient {
    http: reqwest::Client,
    api_url: String,
    config: ClientConfig,
    index: IndexConfig,
    ranking: RankingPolicy,
    skipped_items: AtomicU64,
}

impl IndexClient {
    pub fn new(config: ClientConfig, index: IndexConfig) -> Result<Self, IndexError> {
        index.validate()?;

        let mut header_map = HeaderMap::new();
        if let Some(token) = config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| IndexError::InvalidConfig(format!("invalid auth token: {e}")))?;
            value.set_sensitive(true);
            header_map.insert(AUTHORIZATION, value);
        }

        let mut client_builder = reqwest::Client::builder().default_headers(header_map);
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let http = client_builder
            .build()
            .map_err(|e| IndexError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url(),
            config,
            index,
            ranking: RankingPolicy,
            skipped_items: AtomicU64::new(0),
        })
    }

    pub fn index_config(&self) -> &IndexConfig {
        &self.index
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_ef_search(&self) -> usize {
        self.config.default_ef_search
    }

    /// Total search response items dropped because their shape was not
    /// recognized, since this client was created.
    pub fn skipped_items(&self) -> u64 {
        self.skipped_items.load(Ordering::Relaxed)
    }

    /// Create the index unless it already exists. Safe to call on every start.
    pub async fn ensure_index(&self) -> Result<CreateOutcome, IndexError> {
        let url = format!("{}/index/create", self.api_url);
        let (status, body) = self
            .post(&url, &CreateIndexRequest::from(&self.index))
            .await
            .inspect_err(|e| tracing::error!(index = %self.index.name, "Error creating index: {e}"))?;

        match classify_create_response(status, &body) {
            Ok(CreateOutcome::Created) => {
                tracing::info!(index = %self.index.name, dim = self.index.dimension, "Index created");
                Ok(CreateOutcome::Created)
            }
            Ok(CreateOutcome::AlreadyExists) => {
                tracing::info!(index = %self.index.name, "Index already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(e) => {
                tracing::error!(index = %self.index.name, %status, "Failed to create index: {body}");
                Err(e)
            }
        }
    }

    /// Insert one document. The vector length is checked before any request
    /// is made.
    pub async fn insert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: &Metadata,
    ) -> Result<(), IndexError> {
        self.index.check_dimension(vector)?;
        let meta = serde_json::to_string(metadata)
            .map_err(|e| IndexError::Encode(format!("metadata for {id}: {e}")))?;
        let record = InsertRecord { id, vector, meta };
        self.send_insert(&[record]).await?;
        tracing::info!(id, index = %self.index.name, "Inserted vector");
        Ok(())
    }

    /// Insert several documents in one request. Nothing is sent if any
    /// vector has the wrong length.
    pub async fn insert_batch(&self, documents: &[Document]) -> Result<(), IndexError> {
        if documents.is_empty() {
            return Ok(());
        }
        for document in documents {
            self.index.check_dimension(&document.vector)?;
        }
        let records = encode_documents(documents)?;
        self.send_insert(&records).await?;
        tracing::info!(
            count = documents.len(),
            index = %self.index.name,
            "Inserted vector batch"
        );
        Ok(())
    }

    async fn send_insert(&self, records: &[InsertRecord<'_>]) -> Result<(), IndexError> {
        let url = format!("{}/index/{}/vector/insert", self.api_url, self.index.name);
        let (status, body) = self
            .post(&url, records)
            .await
            .inspect_err(|e| tracing::error!(index = %self.index.name, "Error inserting vectors: {e}"))?;
        if !status.is_success() {
            tracing::error!(index = %self.index.name, %status, "Failed to insert vectors: {body}");
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Nearest neighbors of `vector`, best first, at most `top_k` of them.
    pub async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        ef_search: usize,
    ) -> Result<Vec<SearchResult>, IndexError> {
        let query = SearchQuery {
            vector: vector.to_vec(),
            top_k,
            ef_search,
        };
        self.search_query(&query).await
    }

    /// Run a search. An empty list means the index had no matches; every
    /// transport or decoding problem is an error.
    pub async fn search_query(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, IndexError> {
        self.index.check_dimension(&query.vector)?;
        query.validate()?;

        let url = format!("{}/index/{}/search", self.api_url, self.index.name);
        let (status, body) = self
            .post(&url, &encode_query(query))
            .await
            .inspect_err(|e| tracing::error!(index = %self.index.name, "Error during search: {e}"))?;
        if !status.is_success() {
            tracing::error!(index = %self.index.name, %status, "Search failed: {body}");
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| IndexError::Decode(format!("response is not valid JSON: {e}")))?;
        let normalized = normalize(json)
            .inspect_err(|e| tracing::error!(index = %self.index.name, "Search failed: {e}"))?;

        if normalized.skipped > 0 {
            self.skipped_items
                .fetch_add(normalized.skipped as u64, Ordering::Relaxed);
            tracing::warn!(
                index = %self.index.name,
                skipped = normalized.skipped,
                kept = normalized.results.len(),
                "Search response contained items of unknown shape"
            );
        }

        let results = self.ranking.rank_top(normalized.results, query.top_k);
        tracing::debug!(index = %self.index.name, hits = results.len(), "Search complete");
        Ok(results)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(StatusCode, String), IndexError> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error(url, e))?;
        Ok((status, text))
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> IndexError {
    if e.is_timeout() {
        IndexError::Timeout {
            url: url.to_owned(),
        }
    } else {
        IndexError::Transport {
            url: url.to_owned(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_validates_index_config() {
        let result = IndexClient::new(ClientConfig::default(), IndexConfig::new("bad name", 3));
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_client_rejects_unencodable_token() {
        let config = ClientConfig::default().with_auth_token("line\nbreak");
        let result = IndexClient::new(config, IndexConfig::new("idx", 3));
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_client_has_no_skipped_items() {
        let client = IndexClient::new(ClientConfig::default(), IndexConfig::new("idx", 3)).unwrap();
        assert_eq!(client.skipped_items(), 0);
        assert_eq!(client.default_ef_search(), 64);
        assert_eq!(client.index_config().dimension, 3);
    }

    #[test]
    fn test_client_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IndexClient>();
    }
}
