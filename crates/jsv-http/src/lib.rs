//! # jsv-http — HTTP Schema Loader
//!
//! The built-in [`SchemaLoader`] implementation: a thin transport
//! wrapper over `reqwest`. It GETs a schema URI, rejects non-success
//! statuses, and parses the body as JSON. Every failure maps to a
//! [`LoaderError`] carrying the URI and a diagnostic reason.
//!
//! No retry policy lives here — the resolution loop requests each URI
//! exactly once, and callers wanting retries or hard timeouts beyond
//! the per-request timeout wrap their own loader.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use jsv_schema::{LoaderError, SchemaLoader};

/// Configuration for [`HttpLoader`].
#[derive(Debug, Clone)]
pub struct HttpLoaderConfig {
    /// Per-request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for HttpLoaderConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Fetches referenced schemas over HTTP(S).
///
/// The client is built once at construction and is `Send + Sync`, so
/// one loader can be shared via `Arc` across validators.
#[derive(Debug)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    /// Build a loader from configuration.
    pub fn new(config: HttpLoaderConfig) -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                LoaderError::new("", format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SchemaLoader for HttpLoader {
    async fn load(&self, uri: &str) -> Result<Value, LoaderError> {
        tracing::debug!(uri, "fetching referenced schema");

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| LoaderError::new(uri, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::new(uri, format!("HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LoaderError::new(uri, format!("response body is not JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpLoaderConfig::default();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_loader_builds_from_default_config() {
        assert!(HttpLoader::new(HttpLoaderConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_loader_error() {
        let loader = HttpLoader::new(HttpLoaderConfig { timeout_secs: 1 }).unwrap();
        // a guaranteed-closed port: connection refused
        let error = loader.load("http://127.0.0.1:1/schema.json").await.unwrap_err();
        assert_eq!(error.uri, "http://127.0.0.1:1/schema.json");
        assert!(error.reason.contains("request failed"));
    }
}
