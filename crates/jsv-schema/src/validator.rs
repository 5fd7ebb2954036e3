//! # Validator — the Public Facade
//!
//! One `Validator` owns one schema registry, one format registry, an
//! optional loader capability, and the set of URIs already requested
//! through that loader. Nothing is global: concurrent validators never
//! share state implicitly.
//!
//! Schemas without an `id` get an anonymous content-hash identity
//! before validation, so `$ref`s within the same document can target
//! them and identical anonymous schemas collapse to a single registry
//! entry across calls.
//!
//! The engine is versioned by the `$schema` keyword. Draft-04 is the
//! only (and default) rule-set; a document declaring an unknown
//! `$schema` is validated as draft-04 with a warning — adding another
//! draft is a new rule-set, not a change to this dispatch.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use jsv_core::{anonymous_id, uri, ErrorKind, ValidationError};

use crate::draft04::{Engine, DRAFT_04_URI};
use crate::formats::FormatRegistry;
use crate::loader::SchemaLoader;
use crate::registry::SchemaRegistry;
use crate::resolver;

/// Default bound on the reference-resolution round loop.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// A draft-04 validator instance.
pub struct Validator {
    registry: SchemaRegistry,
    formats: FormatRegistry,
    loader: Option<Arc<dyn SchemaLoader>>,
    max_depth: u32,
    requested: HashSet<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with no loader: all referenced schemas must be
    /// registered up front, or their `$ref`s report as errors.
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::new(),
            formats: FormatRegistry::with_builtins(),
            loader: None,
            max_depth: DEFAULT_MAX_DEPTH,
            requested: HashSet::new(),
        }
    }

    /// A validator that fetches missing referenced schemas through
    /// `loader` when validating asynchronously.
    pub fn with_loader(loader: Arc<dyn SchemaLoader>) -> Self {
        Self {
            loader: Some(loader),
            ..Self::new()
        }
    }

    /// Override the reference-resolution round budget (default 5).
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    /// Pre-register a schema document so later validations can reference
    /// it by URI. Returns the base URIs of non-local `$ref`s this
    /// document mentions that are still unregistered.
    pub fn register(&mut self, schema: &Value, id: Option<&str>) -> Vec<String> {
        self.registry.register(schema, id)
    }

    /// Base URIs referenced by registered documents but not yet known —
    /// for callers who want to pre-fetch.
    pub fn missing_schemas(&self) -> Vec<String> {
        self.registry.missing_schemas()
    }

    /// Register or override a named `format` validator. Built-in names
    /// (e.g. `uri`) are overridable.
    pub fn add_format(
        &mut self,
        name: impl Into<String>,
        validator: impl Fn(&Value, &Value) -> Option<String> + Send + Sync + 'static,
    ) {
        self.formats.add(name, validator);
    }

    /// Validate synchronously. No I/O happens: unresolved remote `$ref`s
    /// report as errors, and a configured loader is itself reported
    /// rather than silently ignored.
    ///
    /// An empty list means the instance conforms.
    pub fn validate(&mut self, instance: &Value, schema: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.loader.is_some() {
            errors.push(ValidationError::new(
                ErrorKind::Loader,
                "",
                "#",
                "loader",
                Value::Null,
                None,
                "a loader is configured but validate() ran synchronously; the loader was \
                 not invoked, so any unresolved remote $refs will be reported as errors",
            ));
        }
        let scope = self.ensure_registered(schema);
        errors.extend(self.run_engine(instance, schema, &scope));
        errors
    }

    /// Validate asynchronously: first drain missing references through
    /// the configured loader (if any), then run the engine. Loader and
    /// budget failures surface as a single-element error list.
    pub async fn validate_async(
        &mut self,
        instance: &Value,
        schema: &Value,
    ) -> Vec<ValidationError> {
        let scope = self.ensure_registered(schema);

        if let Some(loader) = self.loader.clone() {
            if let Err(error) = resolver::load_missing_refs(
                &mut self.registry,
                &mut self.requested,
                &loader,
                self.max_depth,
            )
            .await
            {
                return vec![error];
            }
        }

        self.run_engine(instance, schema, &scope)
    }

    /// Make sure the schema has an identity in the registry, minting an
    /// anonymous content-hash id when it declares none. Returns the
    /// canonical resolution scope for the validation run.
    fn ensure_registered(&mut self, schema: &Value) -> String {
        let id = schema
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| anonymous_id(schema));
        if !self.registry.is_registered(&id) {
            self.registry.register(schema, Some(&id));
        }
        uri::resolve(&id, &id)
    }

    fn run_engine(&self, instance: &Value, schema: &Value, scope: &str) -> Vec<ValidationError> {
        if let Some(version) = schema.get("$schema").and_then(Value::as_str) {
            if version != DRAFT_04_URI {
                tracing::warn!(version, "unknown $schema version; validating as draft-04");
            }
        }
        let engine = Engine {
            registry: &self.registry,
            formats: &self.formats,
            loader_configured: self.loader.is_some(),
        };
        engine.validate(instance, schema, scope, "#")
    }
}
