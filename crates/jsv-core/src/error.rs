//! # Validation Error Model
//!
//! Validation never fails — it reports. Every violation is a
//! [`ValidationError`] value object: located (resolution scope plus
//! instance pointer), tagged by the keyword that rejected the instance,
//! carrying the constraint's declared value and the tested value, and —
//! for composite keywords — a named map of per-branch nested errors so
//! one branch's failures never overwrite another's.
//!
//! Errors are immutable after creation and serialize to the wire shape
//! `{kind, resolutionScope, instanceContext, constraintName,
//! constraintValue, testedValue, description, subSchemaValidationErrors?}`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// The closed set of error kinds the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The instance's apparent type does not satisfy the declared `type`.
    Type,
    /// A numeric bound was violated (`multipleOf`, `maximum`, `minimum`, …).
    Numeric,
    /// A string constraint was violated (`maxLength`, `minLength`, `pattern`).
    String,
    /// An array constraint was violated (`items`, `maxItems`, `uniqueItems`, …).
    Array,
    /// An object constraint was violated (`required`, `properties`, …).
    Object,
    /// A named format validator rejected the value.
    Format,
    /// A general-instance keyword failed (`enum`, `allOf`, `anyOf`,
    /// `oneOf`, `not`); aggregates optionally carry per-branch errors.
    Composite,
    /// A `$ref` could not be resolved against the registry.
    Reference,
    /// An asynchronous fetch failed, or a loader was configured but
    /// validation ran synchronously.
    Loader,
    /// The reference-resolution recursion budget was exhausted.
    Budget,
}

/// A single located validation violation.
///
/// `sub_schema_validation_errors` is populated only by composite keywords
/// (`anyOf`, `oneOf`); entries are keyed `sub-schema-<N>` by branch
/// position so failing branches stay individually inspectable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Identifier of the schema (plus keyword path) that rejected the value.
    pub resolution_scope: String,
    /// JSON-Pointer-shaped location of the instance sub-value under test.
    pub instance_context: String,
    /// The keyword that produced this error.
    pub constraint_name: String,
    /// The constraint's declared value in the schema.
    pub constraint_value: Value,
    /// The value (or derived measure, e.g. a length) that was tested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested_value: Option<Value>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_schema_validation_errors: Option<BTreeMap<String, Vec<ValidationError>>>,
}

impl ValidationError {
    /// Construct an error with every locating field supplied.
    pub fn new(
        kind: ErrorKind,
        resolution_scope: impl Into<String>,
        instance_context: impl Into<String>,
        constraint_name: impl Into<String>,
        constraint_value: Value,
        tested_value: Option<Value>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            resolution_scope: resolution_scope.into(),
            instance_context: instance_context.into(),
            constraint_name: constraint_name.into(),
            constraint_value,
            tested_value,
            description: description.into(),
            sub_schema_validation_errors: None,
        }
    }

    /// Attach per-branch nested errors, keyed `sub-schema-<N>` by branch
    /// position.
    pub fn with_branch_errors(mut self, branches: BTreeMap<String, Vec<ValidationError>>) -> Self {
        if !branches.is_empty() {
            self.sub_schema_validation_errors = Some(branches);
        }
        self
    }

    /// The conventional key for branch `index` in a nested error map.
    pub fn branch_key(index: usize) -> String {
        format!("sub-schema-{index}")
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.instance_context, self.description, self.constraint_name
        )
    }
}
