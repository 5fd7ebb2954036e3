//! # jsv-schema — JSON Schema Draft-04 Validation
//!
//! Validates a parsed JSON instance against a JSON Schema draft-04
//! document and reports every violation as a located, structured
//! [`ValidationError`](jsv_core::ValidationError). An empty result means
//! the instance conforms.
//!
//! ## Architecture
//!
//! - [`registry`] — URI/JSON-Pointer identity and storage for schema
//!   documents and their nested sub-schemas, including cross-document
//!   `$ref` tracking (the missing-reference set).
//! - [`formats`] — named `format` validators, seeded with the draft-04
//!   built-ins and extensible by the host.
//! - [`draft04`] — the recursive, keyword-driven engine. Keywords are a
//!   fixed enumeration with parsed parameters; unknown schema keys are
//!   ignored by never being parsed.
//! - [`resolver`] — the asynchronous fetch-and-register round loop that
//!   drains the missing-reference set through a caller-supplied
//!   [`SchemaLoader`](loader::SchemaLoader) before validation runs.
//! - [`validator`] — the public [`Validator`] facade tying the pieces
//!   together. One `Validator` owns one registry; instances never share
//!   state implicitly.
//!
//! ## Validation never fails
//!
//! The engine returns violation lists, not `Err`: malformed *instances*
//! are ordinary violations, and malformed *schemas* degrade (an
//! unresolvable `$ref` becomes a single located reference error for that
//! subtree only). The only error channels are infrastructure: loader
//! failures and the resolution budget, surfaced as single-element error
//! lists from the async path.
//!
//! ## Example
//!
//! ```
//! use jsv_schema::Validator;
//! use serde_json::json;
//!
//! let mut validator = Validator::new();
//! let schema = json!({"type": "object", "required": ["name"]});
//! let errors = validator.validate(&json!({"name": "ada"}), &schema);
//! assert!(errors.is_empty());
//! ```

pub mod draft04;
pub mod formats;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use formats::FormatRegistry;
pub use loader::{LoaderError, SchemaLoader};
pub use registry::SchemaRegistry;
pub use validator::Validator;

pub use jsv_core::{ErrorKind, ValidationError};
