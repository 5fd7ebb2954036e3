//! # Schema Loader Capability
//!
//! The engine never performs I/O. Fetching a referenced remote schema is
//! a capability the caller injects: anything implementing
//! [`SchemaLoader`]. The workspace ships an HTTP implementation in
//! `jsv-http`; tests use map-backed stubs.
//!
//! Cancellation mid-round is not supported — a caller wanting a hard
//! timeout wraps its loader.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A schema fetch failed.
#[derive(Error, Debug, Clone)]
#[error("could not load schema from '{uri}': {reason}")]
pub struct LoaderError {
    /// The URI the loader was asked for.
    pub uri: String,
    /// Diagnostic description of the failure.
    pub reason: String,
}

impl LoaderError {
    pub fn new(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

/// Fetch-and-parse capability for referenced schemas.
///
/// `load` returns the parsed schema document for a base URI. The
/// resolution loop registers the result under the URI it was requested
/// as, so the document need not declare a matching `id`.
#[async_trait]
pub trait SchemaLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<Value, LoaderError>;
}
