//! # URI Scope Resolution
//!
//! Schema identifiers are URIs resolved against a *resolution scope* —
//! the identifier of the nearest enclosing schema that declared one.
//! Resolution here is plain RFC 3986 relative-reference resolution via
//! the `url` crate, with one canonicalization on top: every resolved
//! identifier carries a fragment component (a bare `#` is appended when
//! the RFC result has none). That keeps base-URI extraction reflexive
//! whether or not the original reference spelled out a fragment.
//!
//! There are no error conditions. A scope or reference that does not
//! parse as a URL degrades string-wise: the reference passes through,
//! `#`-canonicalized. Reporting unresolvable references is the engine's
//! job, not this module's.

use url::Url;

/// Append a bare `#` when the identifier has no fragment component.
fn ensure_fragment(mut uri: String) -> String {
    if !uri.contains('#') {
        uri.push('#');
    }
    uri
}

/// Resolve a reference against a resolution scope.
///
/// Standard relative-URI resolution; the result always contains a `#`.
/// When the scope is not a parseable absolute URL the reference is
/// returned as-is (canonicalized) — RFC-rule degradation, not an error.
pub fn resolve(scope: &str, reference: &str) -> String {
    match Url::parse(scope) {
        Ok(base) => match base.join(reference) {
            Ok(joined) => ensure_fragment(joined.to_string()),
            Err(_) => ensure_fragment(reference.to_string()),
        },
        Err(_) => match Url::parse(reference) {
            Ok(absolute) => ensure_fragment(absolute.to_string()),
            Err(_) => ensure_fragment(reference.to_string()),
        },
    }
}

/// Strip the fragment component from an identifier, yielding its base URI.
///
/// Unparseable identifiers degrade to a string split at the first `#`.
pub fn base_uri(id: &str) -> String {
    match Url::parse(id) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => id.split('#').next().unwrap_or_default().to_string(),
    }
}

/// Split an identifier into its base URI and fragment (with leading `#`).
///
/// `None` when the identifier has no `#` at all; `Some("#")` for a bare
/// trailing `#`.
pub fn split_fragment(id: &str) -> (String, Option<String>) {
    match id.find('#') {
        Some(pos) => (base_uri(id), Some(id[pos..].to_string())),
        None => (base_uri(id), None),
    }
}
