//! Stub index service used by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use resume_matcher::index::{ClientConfig, IndexClient, IndexConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const DIM: usize = 3;
pub const INDEX: &str = "test_index";

#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> IndexClient {
    IndexClient::new(
        ClientConfig::new(server.uri()),
        IndexConfig::new(INDEX, DIM),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn search_path() -> String {
    format!("/api/v1/index/{INDEX}/search")
}

#[allow(dead_code)]
pub fn insert_path() -> String {
    format!("/api/v1/index/{INDEX}/vector/insert")
}

/// Answers the first create call with 200 and every later one with the
/// service's 409 duplicate response, counting both.
#[derive(Clone, Default)]
pub struct CreateIndexStub {
    pub attempts: Arc<AtomicUsize>,
    pub created: Arc<AtomicUsize>,
}

impl Respond for CreateIndexStub {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .created
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            ResponseTemplate::new(200).set_body_json(json!({"message": "Index created"}))
        } else {
            ResponseTemplate::new(409)
                .set_body_json(json!({"error": format!("Index {INDEX} already exists")}))
        }
    }
}

/// In-memory stand-in for the index: stores inserted records and returns
/// all of them on search as keyed items, echoing `meta` verbatim.
#[derive(Clone, Default)]
pub struct MemoryIndex {
    pub records: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl MemoryIndex {
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(insert_path()))
            .respond_with(InsertStub(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path(search_path()))
            .respond_with(SearchStub(self.clone()))
            .mount(server)
            .await;
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

struct InsertStub(MemoryIndex);

impl Respond for InsertStub {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let batch: Vec<Value> = match serde_json::from_slice(&request.body) {
            Ok(batch) => batch,
            Err(_) => return ResponseTemplate::new(400).set_body_string("expected an array"),
        };
        self.0.records.lock().unwrap().extend(batch);
        ResponseTemplate::new(200)
    }
}

struct SearchStub(MemoryIndex);

impl Respond for SearchStub {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let records = self.0.records.lock().unwrap();
        let items: Vec<Value> = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                json!({
                    "id": r["id"],
                    "distance": 0.1 * i as f64,
                    "meta": r["meta"],
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(items)
    }
}

/// OpenAI-compatible embeddings endpoint returning one `DIM`-wide vector per
/// input, derived from the input's length.
#[allow(dead_code)]
pub struct EmbeddingStub;

impl Respond for EmbeddingStub {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let inputs = body["input"].as_array().cloned().unwrap_or_default();
        let data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let len = input.as_str().map_or(0, str::len) as f64;
                json!({"index": i, "embedding": [1.0, len, 0.5]})
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"object": "list", "data": data}))
    }
}

#[allow(dead_code)]
pub async fn mount_embedder(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(EmbeddingStub)
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn matcher_for(server: &MockServer) -> resume_matcher::ResumeMatcher {
    let embedder = resume_matcher::vector::create_embedder(&resume_matcher::vector::EmbedderConfig {
        url: Some(server.uri()),
        dimensions: Some(DIM),
        ..Default::default()
    })
    .unwrap();
    resume_matcher::ResumeMatcher::new(client_for(server), embedder)
}
