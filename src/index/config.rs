use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::IndexError;

pub const DEFAULT_INDEX_NAME: &str = "resume_index";
/// Output width of all-MiniLM-L6-v2, the default embedding model.
pub const DEFAULT_DIMENSION: usize = 384;
pub const DEFAULT_M: usize = 32;
pub const DEFAULT_EF_CONSTRUCTION: usize = 200;
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Distance space the index is built over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceType {
    #[default]
    Cosine,
    L2,
    Ip,
}

/// Storage precision for vector components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Float32,
    Float16,
    Int8,
}

/// Static description of the target index. Chosen once; every vector
/// inserted or queried must have exactly `dimension` components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub name: String,
    pub dimension: usize,
    pub space_type: SpaceType,
    pub m: usize,
    pub ef_construction: usize,
    pub precision: Precision,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_INDEX_NAME.to_owned(),
            dimension: DEFAULT_DIMENSION,
            space_type: SpaceType::Cosine,
            m: DEFAULT_M,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            precision: Precision::Float32,
        }
    }
}

impl IndexConfig {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            ..Default::default()
        }
    }

    /// The name is interpolated into request paths, so it is restricted to
    /// ASCII letters, digits, `-` and `_`.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.name.is_empty() {
            return Err(IndexError::InvalidConfig("index name cannot be empty".into()));
        }
        let valid = self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(IndexError::InvalidConfig(format!(
                "index name \"{}\" may contain only ASCII letters, numbers, '-' and '_'",
                self.name
            )));
        }

        let mut zero = Vec::new();
        if self.dimension == 0 {
            zero.push("`dimension`");
        }
        if self.m == 0 {
            zero.push("`M`");
        }
        if self.ef_construction == 0 {
            zero.push("`ef_construction`");
        }
        if !zero.is_empty() {
            return Err(IndexError::InvalidConfig(format!(
                "{} must be positive",
                zero.join(", ")
            )));
        }
        Ok(())
    }

    pub fn check_dimension(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        Ok(())
    }
}

/// Connection settings for the index service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme and authority, e.g. `http://localhost:8080`.
    pub host: String,
    /// Sent verbatim as the `Authorization` header on every call.
    pub auth_token: Option<String>,
    /// Per-request timeout. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    pub default_ef_search: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8080".to_owned(),
            auth_token: None,
            timeout: None,
            default_ef_search: DEFAULT_EF_SEARCH,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base of every endpoint path: `{host}/api/v1`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.host.trim_end_matches('/'))
    }
}
