//! # JSON Pointer — RFC 6901 Tokens and Traversal
//!
//! Schema fragments come in two shapes: JSON Pointers (`#/definitions/foo`)
//! and opaque URI fragment identifiers (`#foo`). This module handles the
//! pointer shape — escape-sequence encode/decode and token-by-token
//! traversal over a value tree. Fragment identifiers are the registry's
//! concern (alias map translation), not this module's.
//!
//! Decode order is load-bearing: `~1` must be rewritten before `~0`, or a
//! token produced by a mis-ordered encoder would decode `~01` into `/`
//! instead of `~1`.

use serde_json::Value;

/// Decode a single pointer token: `~1` → `/` then `~0` → `~`.
pub fn decode_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Encode a single pointer token: `~` → `~0` then `/` → `~1`.
///
/// Used when the registry records alias paths during the identifier walk,
/// so member keys containing `/` or `~` survive the round trip back
/// through [`walk`].
pub fn encode_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Walk a JSON-Pointer-shaped fragment over a value tree.
///
/// Accepts the fragment with or without its leading `#`. The empty
/// pointer (or a bare `#`) returns the root. Each token descends one
/// level: an object key, or a decimal index into an array. Returns
/// `None` as soon as any step is absent — there are no partial results.
pub fn walk<'v>(root: &'v Value, pointer: &str) -> Option<&'v Value> {
    let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
    if pointer.is_empty() {
        return Some(root);
    }
    let path = pointer.strip_prefix('/')?;

    let mut current = root;
    for token in path.split('/') {
        let token = decode_token(token);
        current = match current {
            Value::Object(map) => map.get(&token)?,
            Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
