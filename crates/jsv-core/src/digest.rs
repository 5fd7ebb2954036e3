//! # Content Digest — Anonymous Schema Identity
//!
//! Schemas that declare no `id` still need a stable identity in the
//! registry, so that `$ref`s within the same document can target them and
//! so that re-validating with the same schema does not mint a fresh
//! registry entry per call. Identity is a SHA-256 digest of the schema's
//! serialized JSON text: identical anonymous schemas collapse to the same
//! identity across calls, which random identifiers cannot provide.
//!
//! Two *distinct* anonymous schemas hashing identically is treated as a
//! defect-free assumption and is not guarded against.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// URI scheme used for anonymous schema identifiers.
pub const ANON_URI_SCHEME: &str = "anon-schema";

/// SHA-256 hex digest of a JSON value's serialized text.
///
/// Serialization preserves map insertion order, so a given value tree
/// always produces the same digest. Two semantically-equal objects whose
/// keys arrived in different orders digest differently — acceptable for
/// identity purposes, since both entries validate identically.
pub fn content_digest(value: &Value) -> String {
    let text = serde_json::to_string(value).unwrap_or_default();
    let hash = Sha256::digest(text.as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Mint the anonymous identifier for an id-less schema:
/// `anon-schema://<sha256-hex>/#`.
pub fn anonymous_id(schema: &Value) -> String {
    format!("{ANON_URI_SCHEME}://{}/#", content_digest(schema))
}
