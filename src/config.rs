use std::str::FromStr;
use std::time::Duration;

use crate::index::config::{DEFAULT_DIMENSION, DEFAULT_EF_SEARCH, DEFAULT_INDEX_NAME};
use crate::index::{ClientConfig, IndexConfig};
use crate::vector::{EmbedderConfig, EmbedderSource};

pub const DEFAULT_ENDEE_HOST: &str = "http://localhost:8080";

/// Runtime settings for the matcher, read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub index: IndexConfig,
    pub embedder: EmbedderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset and empty keys take their
    /// defaults; values that fail to parse are logged and replaced by the
    /// default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("ENDEE_HOST").unwrap_or_else(|| DEFAULT_ENDEE_HOST.to_string());
        let mut client = ClientConfig::new(host);
        if let Some(token) = var("ENDEE_AUTH_TOKEN") {
            client = client.with_auth_token(token);
        }
        if let Some(secs) = parsed::<u64>("ENDEE_TIMEOUT_SECS", var("ENDEE_TIMEOUT_SECS")) {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        client.default_ef_search =
            parsed("ENDEE_EF_SEARCH", var("ENDEE_EF_SEARCH")).unwrap_or(DEFAULT_EF_SEARCH);

        let dimension =
            parsed("VECTOR_DIMENSION", var("VECTOR_DIMENSION")).unwrap_or(DEFAULT_DIMENSION);
        let index_name = var("ENDEE_INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        let index = IndexConfig::new(index_name, dimension);

        let source = parsed::<EmbedderSource>("EMBEDDER_SOURCE", var("EMBEDDER_SOURCE"))
            .unwrap_or_default();
        let embedder = EmbedderConfig {
            source,
            model: var("MODEL_NAME"),
            api_key: var("EMBEDDER_API_KEY"),
            url: var("EMBEDDER_URL"),
            dimensions: Some(dimension),
        };

        tracing::debug!(
            host = %client.host,
            index = %index.name,
            dimension,
            embedder = ?embedder.source,
            "Loaded settings"
        );

        Settings {
            client,
            index,
            embedder,
        }
    }
}

fn parsed<T>(key: &str, raw: Option<String>) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Invalid {}={:?}: {}, using default", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.client.host, "http://localhost:8080");
        assert_eq!(settings.client.auth_token, None);
        assert_eq!(settings.client.timeout, None);
        assert_eq!(settings.client.default_ef_search, 64);
        assert_eq!(settings.index.name, "resume_index");
        assert_eq!(settings.index.dimension, 384);
        assert_eq!(settings.embedder.source, EmbedderSource::OpenAi);
        assert_eq!(settings.embedder.model_name(), "all-MiniLM-L6-v2");
        assert_eq!(settings.embedder.dimensions, Some(384));
    }

    #[test]
    fn test_all_keys_read() {
        let settings = settings_from(&[
            ("ENDEE_HOST", "http://endee:9000"),
            ("ENDEE_INDEX_NAME", "cv_index"),
            ("ENDEE_AUTH_TOKEN", "secret"),
            ("ENDEE_TIMEOUT_SECS", "15"),
            ("ENDEE_EF_SEARCH", "128"),
            ("VECTOR_DIMENSION", "768"),
            ("EMBEDDER_SOURCE", "fastEmbed"),
            ("MODEL_NAME", "bge-base-en-v1.5"),
            ("EMBEDDER_URL", "http://tei:80"),
            ("EMBEDDER_API_KEY", "sk-1"),
        ]);
        assert_eq!(settings.client.host, "http://endee:9000");
        assert_eq!(settings.client.auth_token.as_deref(), Some("secret"));
        assert_eq!(settings.client.timeout, Some(Duration::from_secs(15)));
        assert_eq!(settings.client.default_ef_search, 128);
        assert_eq!(settings.index.name, "cv_index");
        assert_eq!(settings.index.dimension, 768);
        assert_eq!(settings.embedder.source, EmbedderSource::FastEmbed);
        assert_eq!(settings.embedder.model_name(), "bge-base-en-v1.5");
        assert_eq!(settings.embedder.url.as_deref(), Some("http://tei:80"));
        assert_eq!(settings.embedder.api_key.as_deref(), Some("sk-1"));
        assert_eq!(settings.embedder.dimensions, Some(768));
    }

    #[test]
    fn test_empty_token_means_no_auth() {
        let settings = settings_from(&[("ENDEE_AUTH_TOKEN", "")]);
        assert_eq!(settings.client.auth_token, None);
    }

    #[test]
    fn test_unparsable_numbers_fall_back_to_defaults() {
        let settings = settings_from(&[
            ("VECTOR_DIMENSION", "three-eighty-four"),
            ("ENDEE_EF_SEARCH", "-1"),
            ("ENDEE_TIMEOUT_SECS", "soon"),
            ("EMBEDDER_SOURCE", "rest"),
        ]);
        assert_eq!(settings.index.dimension, 384);
        assert_eq!(settings.client.default_ef_search, 64);
        assert_eq!(settings.client.timeout, None);
        assert_eq!(settings.embedder.source, EmbedderSource::OpenAi);
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ENDEE_INDEX_NAME", "env_index");

        let settings = Settings::from_env();

        std::env::remove_var("ENDEE_INDEX_NAME");
        assert_eq!(settings.index.name, "env_index");
    }
}
