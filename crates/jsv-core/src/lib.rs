//! # jsv-core — Foundational Types for the JSV Validation Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! that the schema registry and the validation engine are built from:
//!
//! 1. **Value classification and equality.** `apparent_type()` maps a JSON
//!    value to its draft-04 primitive type (a whole-valued number is an
//!    `integer`), and `json_equal()` implements deep equality as the JSON
//!    Schema spec defines it — order-sensitive for arrays, order-blind for
//!    objects, numeric for numbers (`17 == 17.0`), and never cross-type
//!    (`0 != false`).
//!
//! 2. **JSON Pointer.** Token encode/decode per RFC 6901 and a traversal
//!    that walks a pointer fragment over a value tree.
//!
//! 3. **URI scope resolution.** Relative reference resolution against a
//!    resolution scope, canonicalized so every identifier carries a
//!    fragment component.
//!
//! 4. **Content digests.** SHA-256 identity for schemas that declare no
//!    `id`, so identical anonymous schemas collapse to one registry entry
//!    across calls.
//!
//! 5. **The error model.** `ValidationError` — the located, serializable
//!    value object every validation failure is reported as.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates (this is the leaf of the DAG).
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Malformed input degrades (string-wise URI fallback, `None` from
//!   pointer walks); nothing in this crate returns `Err` or panics for
//!   malformed schemas or instances.

pub mod digest;
pub mod error;
pub mod pointer;
pub mod uri;
pub mod value;

pub use digest::{anonymous_id, content_digest, ANON_URI_SCHEME};
pub use error::{ErrorKind, ValidationError};
pub use value::{apparent_type, json_equal, InstanceType};
