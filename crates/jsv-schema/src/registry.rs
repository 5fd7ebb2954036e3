//! # Schema Registry — Identity, Storage, and Resolution
//!
//! Owns the set of known schema documents, indexed by canonical base
//! URI. Registration walks a document once for identifier declarations
//! (nested `id`s become top-level entries or fragment aliases, depending
//! on their resolved form) and once for `$ref` occurrences (non-local
//! references to unknown base URIs feed the missing-reference set that
//! drives the asynchronous fetch loop).
//!
//! ## Invariants
//!
//! - First-write-wins: the first schema registered under a base URI
//!   keeps it; later registrations are no-ops. Re-registering during a
//!   recursive walk is therefore harmless, and `register` is idempotent.
//! - Only identifier-declaring nodes get entries or aliases. A
//!   JSON-Pointer fragment needs no alias — it resolves by direct
//!   traversal of the stored root.
//! - The missing-reference set persists across registrations and
//!   shrinks as matching documents arrive, regardless of arrival order.
//!
//! ## Failure semantics
//!
//! Registry operations never fail for malformed schemas; they degrade
//! to not-found/empty results. Turning an unresolved `$ref` into a
//! located error is the engine's job.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use jsv_core::{pointer, uri};

/// A registered schema document: the root node plus the aliases that
/// map opaque fragment identifiers (`#name`) declared inside it to the
/// JSON-Pointer paths of their declaring nodes.
#[derive(Debug, Clone)]
struct SchemaEntry {
    schema: Value,
    fragments: HashMap<String, String>,
}

/// URI-indexed storage for schema documents and their sub-schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaEntry>,
    missing: BTreeSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema document, optionally under an explicit
    /// identifier (used when a fetched document is registered under the
    /// URI it was requested as, and for id-less root schemas).
    ///
    /// Returns the base URIs of non-local `$ref`s in this document that
    /// are not yet registered — the document's contribution to the
    /// missing-reference set. Non-object schema values (arrays included)
    /// are not walkable and register as a no-op with an empty list.
    pub fn register(&mut self, schema: &Value, explicit_id: Option<&str>) -> Vec<String> {
        if !schema.is_object() {
            return Vec::new();
        }

        let root_id = schema.get("id").and_then(Value::as_str).or(explicit_id);
        let root_scope = match root_id {
            Some(id) => {
                let resolved = uri::resolve(id, id);
                self.register_node(schema, &resolved, "#");
                resolved
            }
            None => String::from("#"),
        };
        self.walk_ids(schema, &root_scope, "#");

        let mut refs = Vec::new();
        gather_refs(schema, &mut refs);

        let mut introduced = Vec::new();
        for reference in refs {
            if reference.starts_with('#') {
                continue;
            }
            let base = uri::base_uri(&reference);
            if self.schemas.contains_key(&base) {
                continue;
            }
            self.missing.insert(base.clone());
            if !introduced.contains(&base) {
                introduced.push(base);
            }
        }
        introduced
    }

    /// True when the exact identifier or its base URI names a known entry.
    pub fn is_registered(&self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        self.schemas.contains_key(id) || self.schemas.contains_key(&uri::base_uri(id))
    }

    /// Retrieve a previously-registered schema node by identifier.
    ///
    /// The identifier splits into base URI and fragment. An unknown base
    /// is `None`. An empty or bare-`#` fragment returns the stored root.
    /// A `#/...` fragment is pointer-walked on the root; any other
    /// fragment is first translated through the alias map (falling back
    /// to the literal fragment when unmapped) and then pointer-walked.
    pub fn get(&self, id: &str) -> Option<Value> {
        let (base, fragment) = uri::split_fragment(id);
        let entry = self.schemas.get(&base)?;

        let fragment = match fragment {
            None => return Some(entry.schema.clone()),
            Some(f) if f == "#" => return Some(entry.schema.clone()),
            Some(f) => f,
        };

        let path = if fragment.starts_with("#/") {
            fragment
        } else {
            entry
                .fragments
                .get(&fragment)
                .cloned()
                .unwrap_or(fragment)
        };
        pointer::walk(&entry.schema, &path).cloned()
    }

    /// Base URIs referenced by `$ref` somewhere in a registered document
    /// but still absent from the registry. Entries that a later
    /// registration happened to satisfy are filtered out.
    pub fn missing_schemas(&self) -> Vec<String> {
        self.missing
            .iter()
            .filter(|id| !self.is_registered(id))
            .cloned()
            .collect()
    }

    /// Store a node whose resolved identifier is known.
    ///
    /// A non-fragment resolved form becomes a top-level entry
    /// (first-write-wins, canonical path `#`). A fragment form that is
    /// not JSON-Pointer-shaped becomes an alias on the already-registered
    /// base entry (first-write-wins per fragment). Pointer-shaped
    /// fragments need no storage at all.
    fn register_node(&mut self, node: &Value, resolved: &str, path: &str) {
        let (base, fragment) = uri::split_fragment(resolved);
        let fragment = fragment.unwrap_or_else(|| String::from("#"));

        if fragment == "#" {
            if !self.schemas.contains_key(&base) {
                self.schemas.insert(
                    base,
                    SchemaEntry {
                        schema: node.clone(),
                        fragments: HashMap::new(),
                    },
                );
            }
        } else {
            if fragment.starts_with("#/") {
                return;
            }
            if let Some(entry) = self.schemas.get_mut(&base) {
                entry
                    .fragments
                    .entry(fragment)
                    .or_insert_with(|| path.to_string());
            }
        }
    }

    /// Depth-first identifier walk. Every object node declaring a string
    /// `id` is registered with the identifier resolved against the
    /// inherited scope; the resolved identifier becomes the scope for
    /// the node's descendants. The JSON-Pointer path extends with the
    /// encoded member key (or array index) at each step.
    fn walk_ids(&mut self, node: &Value, scope: &str, path: &str) {
        match node {
            Value::Object(map) => {
                let child_scope = match map.get("id").and_then(Value::as_str) {
                    Some(id) => {
                        let resolved = uri::resolve(scope, id);
                        self.register_node(node, &resolved, path);
                        resolved
                    }
                    None => scope.to_string(),
                };
                for (key, child) in map {
                    if child.is_object() || child.is_array() {
                        let token = pointer::encode_token(key);
                        self.walk_ids(
                            child,
                            &format!("{child_scope}/{token}"),
                            &format!("{path}/{token}"),
                        );
                    }
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    if child.is_object() || child.is_array() {
                        self.walk_ids(
                            child,
                            &format!("{scope}/{index}"),
                            &format!("{path}/{index}"),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

/// Collect every literal `$ref` string in the subtree.
fn gather_refs(node: &Value, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                out.push(reference.to_string());
            }
            for child in map.values() {
                if child.is_object() || child.is_array() {
                    gather_refs(child, out);
                }
            }
        }
        Value::Array(items) => {
            for child in items {
                if child.is_object() || child.is_array() {
                    gather_refs(child, out);
                }
            }
        }
        _ => {}
    }
}
