//! # Draft-04 Validation Engine
//!
//! The recursive, keyword-driven walk over (instance, schema). Each call
//! evaluates `type` first — every other keyword assumes the instance
//! already has a compatible shape — then dispatches the applicable
//! keywords and concatenates their errors. There is no short-circuit
//! across keywords: independent violations are all reported in one pass.
//!
//! Keywords are a fixed enumeration, each variant carrying its parsed
//! parameters. Schema keys that match no variant are never parsed, which
//! is how unknown keywords stay ignored. Keys whose value has the wrong
//! shape for their keyword degrade to "no constraint" — malformed
//! schemas never panic the engine.
//!
//! A `$ref` member takes over its subschema entirely: the reference is
//! resolved against the current scope via the registry and validation
//! continues inside the target with the resolved URI as the new scope.
//! Cyclic `$ref` chains terminate by construction — a reference is
//! resolved once per recursive call against a concrete sub-instance, and
//! the instance is a finite tree. A schema-only cycle with no descending
//! instance is not defended against.
//!
//! The engine is pure and synchronous: no I/O, no suspension, no
//! registry mutation. Anything it cannot resolve locally becomes a
//! located reference error for that subtree alone.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use jsv_core::{apparent_type, json_equal, pointer, uri, ErrorKind, InstanceType, ValidationError};

use crate::formats::FormatRegistry;
use crate::registry::SchemaRegistry;

/// The draft-04 `$schema` identifier this engine implements.
pub const DRAFT_04_URI: &str = "http://json-schema.org/draft-04/schema#";

type JsonMap = Map<String, Value>;

/// One applicable keyword with its parsed parameters.
enum Keyword<'s> {
    Enum(&'s Vec<Value>),
    AllOf(&'s Vec<Value>),
    AnyOf(&'s Vec<Value>),
    OneOf(&'s Vec<Value>),
    Not(&'s Value),
    Format(&'s str),
    MultipleOf { divisor: f64, raw: &'s Value },
    Maximum { limit: f64, exclusive: bool, raw: &'s Value },
    Minimum { limit: f64, exclusive: bool, raw: &'s Value },
    MaxLength(u64),
    MinLength(u64),
    Pattern(&'s str),
    Items {
        items: &'s Value,
        additional: Option<&'s Value>,
    },
    MaxItems(u64),
    MinItems(u64),
    UniqueItems,
    MaxProperties(u64),
    MinProperties(u64),
    Required(&'s Vec<Value>),
    /// `properties`, `patternProperties`, and `additionalProperties` are
    /// never evaluated independently — their semantics depend on each
    /// other, so any of them being present triggers one combined pass.
    PropertySet {
        properties: Option<&'s JsonMap>,
        patterns: Option<&'s JsonMap>,
        additional: Option<&'s Value>,
    },
    Dependencies(&'s JsonMap),
}

/// Build the applicable-keyword list: the general family (valid for all
/// instance types) plus the type-specific family matching the instance's
/// classified type.
fn applicable<'s>(schema: &'s JsonMap, itype: InstanceType) -> Vec<Keyword<'s>> {
    let mut keywords = Vec::new();

    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        keywords.push(Keyword::Enum(values));
    }
    if let Some(branches) = schema.get("allOf").and_then(Value::as_array) {
        keywords.push(Keyword::AllOf(branches));
    }
    if let Some(branches) = schema.get("anyOf").and_then(Value::as_array) {
        keywords.push(Keyword::AnyOf(branches));
    }
    if let Some(branches) = schema.get("oneOf").and_then(Value::as_array) {
        keywords.push(Keyword::OneOf(branches));
    }
    if let Some(subschema) = schema.get("not") {
        keywords.push(Keyword::Not(subschema));
    }
    if let Some(name) = schema.get("format").and_then(Value::as_str) {
        keywords.push(Keyword::Format(name));
    }

    match itype {
        InstanceType::Integer | InstanceType::Number => {
            if let Some(raw) = schema.get("multipleOf") {
                if let Some(divisor) = raw.as_f64() {
                    keywords.push(Keyword::MultipleOf { divisor, raw });
                }
            }
            if let Some(raw) = schema.get("maximum") {
                if let Some(limit) = raw.as_f64() {
                    let exclusive = schema
                        .get("exclusiveMaximum")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    keywords.push(Keyword::Maximum { limit, exclusive, raw });
                }
            }
            if let Some(raw) = schema.get("minimum") {
                if let Some(limit) = raw.as_f64() {
                    let exclusive = schema
                        .get("exclusiveMinimum")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    keywords.push(Keyword::Minimum { limit, exclusive, raw });
                }
            }
        }
        InstanceType::String => {
            if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
                keywords.push(Keyword::MaxLength(max));
            }
            if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
                keywords.push(Keyword::MinLength(min));
            }
            if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
                keywords.push(Keyword::Pattern(pattern));
            }
        }
        InstanceType::Array => {
            if let Some(items) = schema.get("items") {
                keywords.push(Keyword::Items {
                    items,
                    additional: schema.get("additionalItems"),
                });
            }
            if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
                keywords.push(Keyword::MaxItems(max));
            }
            if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
                keywords.push(Keyword::MinItems(min));
            }
            if schema.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
                keywords.push(Keyword::UniqueItems);
            }
        }
        InstanceType::Object => {
            if let Some(max) = schema.get("maxProperties").and_then(Value::as_u64) {
                keywords.push(Keyword::MaxProperties(max));
            }
            if let Some(min) = schema.get("minProperties").and_then(Value::as_u64) {
                keywords.push(Keyword::MinProperties(min));
            }
            if let Some(names) = schema.get("required").and_then(Value::as_array) {
                keywords.push(Keyword::Required(names));
            }
            let properties = schema.get("properties").and_then(Value::as_object);
            let patterns = schema.get("patternProperties").and_then(Value::as_object);
            let additional = schema.get("additionalProperties");
            if properties.is_some() || patterns.is_some() || additional.is_some() {
                keywords.push(Keyword::PropertySet {
                    properties,
                    patterns,
                    additional,
                });
            }
            if let Some(deps) = schema.get("dependencies").and_then(Value::as_object) {
                keywords.push(Keyword::Dependencies(deps));
            }
        }
        InstanceType::Null | InstanceType::Boolean => {}
    }

    keywords
}

/// The evaluation context for one validation run: the registry for
/// `$ref` resolution, the format registry for the `format` keyword, and
/// whether a loader exists (it sharpens the unresolved-remote-`$ref`
/// message).
pub(crate) struct Engine<'a> {
    pub registry: &'a SchemaRegistry,
    pub formats: &'a FormatRegistry,
    pub loader_configured: bool,
}

impl Engine<'_> {
    /// Validate `instance` against `schema` within `scope`, reporting
    /// violations located at the instance pointer `context`.
    pub fn validate(
        &self,
        instance: &Value,
        schema: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(map) = schema.as_object() else {
            // Non-object schemas constrain nothing.
            return Vec::new();
        };
        if map.is_empty() {
            return Vec::new();
        }

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return self.eval_ref(instance, reference, scope, context);
        }

        // `type` runs first and alone: every other keyword assumes a
        // compatible instance shape.
        let type_errors = self.eval_type(map, instance, scope, context);
        if !type_errors.is_empty() {
            return type_errors;
        }

        let mut errors = Vec::new();
        for keyword in applicable(map, apparent_type(instance)) {
            errors.extend(self.eval_keyword(&keyword, instance, schema, scope, context));
        }
        errors
    }

    fn eval_type(
        &self,
        schema: &JsonMap,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(declared) = schema.get("type") else {
            return Vec::new();
        };
        let names: Vec<&str> = match declared {
            Value::String(s) => vec![s.as_str()],
            Value::Array(list) => list.iter().filter_map(Value::as_str).collect(),
            _ => return Vec::new(),
        };

        let itype = apparent_type(instance);
        let satisfied = match itype {
            // An integer instance also satisfies a declared `number`.
            InstanceType::Integer => names.iter().any(|n| *n == "integer" || *n == "number"),
            other => names.iter().any(|n| *n == other.as_str()),
        };

        if satisfied {
            Vec::new()
        } else {
            vec![ValidationError::new(
                ErrorKind::Type,
                scope,
                context,
                "type",
                declared.clone(),
                Some(json!(itype.as_str())),
                format!("expected type {}, got {itype}", names.join(" or ")),
            )]
        }
    }

    fn eval_ref(
        &self,
        instance: &Value,
        reference: &str,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let resolved = uri::resolve(scope, reference);
        match self.registry.get(&resolved) {
            Some(target) => self.validate(instance, &target, &resolved, context),
            None => {
                let fetchable =
                    resolved.starts_with("http://") || resolved.starts_with("https://");
                let description = if fetchable && !self.loader_configured {
                    format!(
                        "could not resolve $ref '{resolved}': no schema is registered under \
                         that URI; validating asynchronously with a loader would attempt to \
                         retrieve it"
                    )
                } else {
                    format!(
                        "could not resolve $ref '{resolved}': no schema is registered under \
                         that URI"
                    )
                };
                vec![ValidationError::new(
                    ErrorKind::Reference,
                    scope,
                    context,
                    "$ref",
                    json!(reference),
                    None,
                    description,
                )]
            }
        }
    }

    fn eval_keyword(
        &self,
        keyword: &Keyword<'_>,
        instance: &Value,
        schema: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        match keyword {
            Keyword::Enum(values) => self.eval_enum(values, instance, scope, context),
            Keyword::AllOf(branches) => self.eval_all_of(branches, instance, scope, context),
            Keyword::AnyOf(branches) => self.eval_any_of(branches, instance, scope, context),
            Keyword::OneOf(branches) => self.eval_one_of(branches, instance, scope, context),
            Keyword::Not(subschema) => self.eval_not(subschema, instance, scope, context),
            Keyword::Format(name) => self.eval_format(name, instance, schema, scope, context),
            Keyword::MultipleOf { divisor, raw } => {
                let value = number_of(instance);
                if *divisor != 0.0 && value % divisor != 0.0 {
                    vec![ValidationError::new(
                        ErrorKind::Numeric,
                        scope,
                        context,
                        "multipleOf",
                        (*raw).clone(),
                        Some(instance.clone()),
                        format!("{value} is not a multiple of {divisor}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::Maximum { limit, exclusive, raw } => {
                let value = number_of(instance);
                let (violated, name, relation) = if *exclusive {
                    (value >= *limit, "exclusiveMaximum", "strictly less than")
                } else {
                    (value > *limit, "maximum", "at most")
                };
                if violated {
                    vec![ValidationError::new(
                        ErrorKind::Numeric,
                        scope,
                        context,
                        name,
                        (*raw).clone(),
                        Some(instance.clone()),
                        format!("{value} must be {relation} {limit}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::Minimum { limit, exclusive, raw } => {
                let value = number_of(instance);
                let (violated, name, relation) = if *exclusive {
                    (value <= *limit, "exclusiveMinimum", "strictly greater than")
                } else {
                    (value < *limit, "minimum", "at least")
                };
                if violated {
                    vec![ValidationError::new(
                        ErrorKind::Numeric,
                        scope,
                        context,
                        name,
                        (*raw).clone(),
                        Some(instance.clone()),
                        format!("{value} must be {relation} {limit}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::MaxLength(max) => {
                // Lengths count Unicode code points, not UTF-16 code
                // units or bytes — an astral-plane character counts once.
                let length = string_length(instance);
                if length > *max {
                    vec![ValidationError::new(
                        ErrorKind::String,
                        scope,
                        context,
                        "maxLength",
                        json!(max),
                        Some(json!(length)),
                        format!("string of {length} code points exceeds maxLength {max}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::MinLength(min) => {
                let length = string_length(instance);
                if length < *min {
                    vec![ValidationError::new(
                        ErrorKind::String,
                        scope,
                        context,
                        "minLength",
                        json!(min),
                        Some(json!(length)),
                        format!("string of {length} code points is shorter than minLength {min}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::Pattern(pattern) => self.eval_pattern(pattern, instance, scope, context),
            Keyword::Items { items, additional } => {
                self.eval_items(items, *additional, instance, scope, context)
            }
            Keyword::MaxItems(max) => {
                let length = array_length(instance);
                if length > *max {
                    vec![ValidationError::new(
                        ErrorKind::Array,
                        scope,
                        context,
                        "maxItems",
                        json!(max),
                        Some(json!(length)),
                        format!("array of {length} items exceeds maxItems {max}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::MinItems(min) => {
                let length = array_length(instance);
                if length < *min {
                    vec![ValidationError::new(
                        ErrorKind::Array,
                        scope,
                        context,
                        "minItems",
                        json!(min),
                        Some(json!(length)),
                        format!("array of {length} items is smaller than minItems {min}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::UniqueItems => self.eval_unique_items(instance, scope, context),
            Keyword::MaxProperties(max) => {
                let count = property_count(instance);
                if count > *max {
                    vec![ValidationError::new(
                        ErrorKind::Object,
                        scope,
                        context,
                        "maxProperties",
                        json!(max),
                        Some(json!(count)),
                        format!("object with {count} properties exceeds maxProperties {max}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::MinProperties(min) => {
                let count = property_count(instance);
                if count < *min {
                    vec![ValidationError::new(
                        ErrorKind::Object,
                        scope,
                        context,
                        "minProperties",
                        json!(min),
                        Some(json!(count)),
                        format!("object with {count} properties is below minProperties {min}"),
                    )]
                } else {
                    Vec::new()
                }
            }
            Keyword::Required(names) => self.eval_required(names, instance, scope, context),
            Keyword::PropertySet {
                properties,
                patterns,
                additional,
            } => self.eval_property_set(*properties, *patterns, *additional, instance, scope, context),
            Keyword::Dependencies(deps) => {
                self.eval_dependencies(deps, instance, scope, context)
            }
        }
    }

    fn eval_enum(
        &self,
        values: &[Value],
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        if values.iter().any(|candidate| json_equal(instance, candidate)) {
            Vec::new()
        } else {
            vec![ValidationError::new(
                ErrorKind::Composite,
                scope,
                context,
                "enum",
                Value::Array(values.to_vec()),
                Some(instance.clone()),
                "does not equal any of the enumerated values",
            )]
        }
    }

    fn eval_all_of(
        &self,
        branches: &[Value],
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (index, branch) in branches.iter().enumerate() {
            errors.extend(self.validate(
                instance,
                branch,
                &format!("{scope}/allOf/{index}"),
                context,
            ));
        }
        errors
    }

    fn eval_any_of(
        &self,
        branches: &[Value],
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let mut branch_errors = BTreeMap::new();
        for (index, branch) in branches.iter().enumerate() {
            let errors = self.validate(
                instance,
                branch,
                &format!("{scope}/anyOf/{index}"),
                context,
            );
            if errors.is_empty() {
                return Vec::new();
            }
            branch_errors.insert(ValidationError::branch_key(index), errors);
        }
        vec![ValidationError::new(
            ErrorKind::Composite,
            scope,
            context,
            "anyOf",
            Value::Array(branches.to_vec()),
            None,
            "does not validate against any of these schemas; it must validate against at \
             least one",
        )
        .with_branch_errors(branch_errors)]
    }

    fn eval_one_of(
        &self,
        branches: &[Value],
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let mut valid_count = 0usize;
        let mut branch_errors = BTreeMap::new();

        for (index, branch) in branches.iter().enumerate() {
            let errors = self.validate(
                instance,
                branch,
                &format!("{scope}/oneOf/{index}"),
                context,
            );
            if errors.is_empty() {
                valid_count += 1;
                // Exactly how many branches beyond two validated is
                // irrelevant; stop as soon as "more than one" is known.
                if valid_count > 1 {
                    break;
                }
            } else {
                branch_errors.insert(ValidationError::branch_key(index), errors);
            }
        }

        if valid_count == 1 {
            return Vec::new();
        }
        let description = if valid_count == 0 {
            "does not validate against any of these schemas; must validate against one and \
             only one of them"
        } else {
            "validates against more than one of these schemas; must validate against one \
             and only one of them"
        };
        vec![ValidationError::new(
            ErrorKind::Composite,
            scope,
            context,
            "oneOf",
            Value::Array(branches.to_vec()),
            None,
            description,
        )
        .with_branch_errors(branch_errors)]
    }

    fn eval_not(
        &self,
        subschema: &Value,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        if self
            .validate(instance, subschema, &format!("{scope}/not"), context)
            .is_empty()
        {
            vec![ValidationError::new(
                ErrorKind::Composite,
                scope,
                context,
                "not",
                subschema.clone(),
                None,
                "validates against this schema; must NOT validate against this schema",
            )]
        } else {
            Vec::new()
        }
    }

    fn eval_format(
        &self,
        name: &str,
        instance: &Value,
        schema: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        // Unknown formats are not errors.
        let Some(validator) = self.formats.get(name) else {
            return Vec::new();
        };
        match validator(instance, schema) {
            None => Vec::new(),
            Some(description) => vec![ValidationError::new(
                ErrorKind::Format,
                scope,
                context,
                "format",
                json!(name),
                Some(instance.clone()),
                description,
            )],
        }
    }

    fn eval_pattern(
        &self,
        pattern: &str,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(text) = instance.as_str() else {
            return Vec::new();
        };
        let compiled = match regex::Regex::new(pattern) {
            Ok(re) => re,
            Err(error) => {
                tracing::warn!(pattern, %error, "unparseable pattern keyword; skipping");
                return Vec::new();
            }
        };
        if compiled.is_match(text) {
            Vec::new()
        } else {
            vec![ValidationError::new(
                ErrorKind::String,
                scope,
                context,
                "pattern",
                json!(pattern),
                Some(instance.clone()),
                format!("does not match pattern \"{pattern}\""),
            )]
        }
    }

    fn eval_items(
        &self,
        items: &Value,
        additional: Option<&Value>,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(elements) = instance.as_array() else {
            return Vec::new();
        };
        let mut errors = Vec::new();

        match items {
            Value::Array(schemas) => {
                // Positional form: element i validates against items[i].
                let paired = elements.len().min(schemas.len());
                for index in 0..paired {
                    errors.extend(self.validate(
                        &elements[index],
                        &schemas[index],
                        &format!("{scope}/items/{index}"),
                        &format!("{context}/{index}"),
                    ));
                }
                // Elements beyond the positional schemas are governed by
                // additionalItems.
                if elements.len() > schemas.len() {
                    match additional {
                        Some(Value::Bool(false)) => errors.push(ValidationError::new(
                            ErrorKind::Array,
                            scope,
                            context,
                            "additionalItems",
                            json!(false),
                            Some(json!(elements.len())),
                            format!(
                                "array length ({}) is greater than \"items\" length ({}) \
                                 and \"additionalItems\" is false",
                                elements.len(),
                                schemas.len()
                            ),
                        )),
                        Some(Value::Bool(true)) | None => {}
                        Some(extra_schema) => {
                            for index in schemas.len()..elements.len() {
                                errors.extend(self.validate(
                                    &elements[index],
                                    extra_schema,
                                    &format!("{scope}/additionalItems"),
                                    &format!("{context}/{index}"),
                                ));
                            }
                        }
                    }
                }
            }
            single_schema => {
                for (index, element) in elements.iter().enumerate() {
                    errors.extend(self.validate(
                        element,
                        single_schema,
                        &format!("{scope}/items"),
                        &format!("{context}/{index}"),
                    ));
                }
            }
        }
        errors
    }

    fn eval_unique_items(
        &self,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(elements) = instance.as_array() else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        for x in 0..elements.len() {
            for y in (x + 1)..elements.len() {
                if json_equal(&elements[x], &elements[y]) {
                    errors.push(ValidationError::new(
                        ErrorKind::Array,
                        scope,
                        context,
                        "uniqueItems",
                        json!(true),
                        None,
                        format!("items {x} and {y} are duplicates"),
                    ));
                    break;
                }
            }
        }
        errors
    }

    fn eval_required(
        &self,
        names: &[Value],
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(object) = instance.as_object() else {
            return Vec::new();
        };
        let missing: Vec<&str> = names
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| !object.contains_key(*name))
            .collect();
        if missing.is_empty() {
            Vec::new()
        } else {
            // All missing names report as one combined error.
            vec![ValidationError::new(
                ErrorKind::Object,
                scope,
                context,
                "required",
                Value::Array(names.to_vec()),
                None,
                format!("missing: {}", missing.join(", ")),
            )]
        }
    }

    fn eval_property_set(
        &self,
        properties: Option<&JsonMap>,
        patterns: Option<&JsonMap>,
        additional: Option<&Value>,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(object) = instance.as_object() else {
            return Vec::new();
        };
        let mut errors = Vec::new();

        // Compile each patternProperties regex once per pass.
        let mut compiled = Vec::new();
        if let Some(patterns) = patterns {
            for (pattern, subschema) in patterns {
                match regex::Regex::new(pattern) {
                    Ok(re) => compiled.push((pattern, re, subschema)),
                    Err(error) => {
                        tracing::warn!(
                            pattern = %pattern,
                            %error,
                            "unparseable patternProperties key; skipping"
                        );
                    }
                }
            }
        }

        for (key, value) in object {
            let token = pointer::encode_token(key);
            let child_context = format!("{context}/{token}");
            let mut constrained = false;

            if let Some(subschema) = properties.and_then(|p| p.get(key)) {
                errors.extend(self.validate(
                    value,
                    subschema,
                    &format!("{scope}/properties/{token}"),
                    &child_context,
                ));
                constrained = true;
            }

            // A key may match several patterns; all of them apply.
            for (pattern, re, subschema) in &compiled {
                if re.is_match(key) {
                    errors.extend(self.validate(
                        value,
                        subschema,
                        &format!("{scope}/patternProperties/{pattern}"),
                        &child_context,
                    ));
                    constrained = true;
                }
            }

            if !constrained {
                match additional {
                    Some(Value::Bool(false)) => errors.push(ValidationError::new(
                        ErrorKind::Object,
                        scope,
                        context,
                        "additionalProperties",
                        json!(false),
                        Some(json!(key)),
                        format!(
                            "property \"{key}\" not allowed by \"properties\" or by \
                             \"patternProperties\" and \"additionalProperties\" is false"
                        ),
                    )),
                    Some(Value::Bool(true)) | None => {}
                    Some(subschema) => errors.extend(self.validate(
                        value,
                        subschema,
                        &format!("{scope}/additionalProperties"),
                        &child_context,
                    )),
                }
            }
        }
        errors
    }

    fn eval_dependencies(
        &self,
        dependencies: &JsonMap,
        instance: &Value,
        scope: &str,
        context: &str,
    ) -> Vec<ValidationError> {
        let Some(object) = instance.as_object() else {
            return Vec::new();
        };
        let mut errors = Vec::new();

        for (key, dependency) in dependencies {
            if !object.contains_key(key) {
                continue;
            }
            match dependency {
                Value::Array(names) => {
                    let missing: Vec<&str> = names
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|name| !object.contains_key(*name))
                        .collect();
                    if !missing.is_empty() {
                        let mut declared = Map::new();
                        declared.insert(key.clone(), dependency.clone());
                        errors.push(ValidationError::new(
                            ErrorKind::Object,
                            scope,
                            context,
                            "dependencies",
                            Value::Object(declared),
                            None,
                            format!("missing: {}", missing.join(", ")),
                        ));
                    }
                }
                // Schema dependency: the *entire instance* is validated,
                // with the error location attributed to the dependency's
                // key name.
                schema_dependency => {
                    let token = pointer::encode_token(key);
                    errors.extend(self.validate(
                        instance,
                        schema_dependency,
                        &format!("{scope}/dependencies/{token}"),
                        &format!("{context}/{token}"),
                    ));
                }
            }
        }
        errors
    }
}

fn number_of(instance: &Value) -> f64 {
    instance.as_f64().unwrap_or(0.0)
}

fn string_length(instance: &Value) -> u64 {
    instance.as_str().map_or(0, |s| s.chars().count() as u64)
}

fn array_length(instance: &Value) -> u64 {
    instance.as_array().map_or(0, |a| a.len() as u64)
}

fn property_count(instance: &Value) -> u64 {
    instance.as_object().map_or(0, |o| o.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(instance: Value, schema: Value) -> Vec<ValidationError> {
        let mut registry = SchemaRegistry::new();
        registry.register(&schema, Some("http://test.local/schema"));
        let formats = FormatRegistry::with_builtins();
        let engine = Engine {
            registry: &registry,
            formats: &formats,
            loader_configured: false,
        };
        engine.validate(&instance, &schema, "http://test.local/schema#", "#")
    }

    #[test]
    fn test_empty_schema_accepts_everything() {
        assert!(run(json!(42), json!({})).is_empty());
        assert!(run(json!({"any": ["thing"]}), json!({})).is_empty());
    }

    #[test]
    fn test_unknown_keywords_are_ignored() {
        assert!(run(json!(42), json!({"frobnicate": true, "x-vendor": [1]})).is_empty());
    }

    #[test]
    fn test_integer_type_accepts_whole_floats() {
        let schema = json!({"type": "integer"});
        assert!(run(json!(42.0), schema.clone()).is_empty());

        let errors = run(json!(42.5), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Type);
        assert_eq!(errors[0].constraint_name, "type");
        assert_eq!(errors[0].tested_value, Some(json!("number")));
    }

    #[test]
    fn test_integer_satisfies_declared_number() {
        assert!(run(json!(7), json!({"type": "number"})).is_empty());
        assert!(run(json!([1]), json!({"type": ["array", "null"]})).is_empty());
        assert!(!run(json!("s"), json!({"type": ["array", "null"]})).is_empty());
    }

    #[test]
    fn test_type_mismatch_suppresses_other_keywords() {
        // A type failure reports only itself, never the numeric keywords.
        let errors = run(json!("not a number"), json!({"type": "integer", "minimum": 3}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "type");
    }

    #[test]
    fn test_multiple_of() {
        assert!(run(json!(9), json!({"multipleOf": 3})).is_empty());
        let errors = run(json!(7), json!({"multipleOf": 3}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Numeric);
        assert_eq!(errors[0].constraint_value, json!(3));
    }

    #[test]
    fn test_zero_divisor_multiple_of_is_ignored() {
        assert!(run(json!(7), json!({"multipleOf": 0})).is_empty());
    }

    #[test]
    fn test_maximum_and_exclusive_maximum() {
        assert!(run(json!(10), json!({"maximum": 10})).is_empty());
        assert_eq!(run(json!(11), json!({"maximum": 10})).len(), 1);

        let errors = run(json!(10), json!({"maximum": 10, "exclusiveMaximum": true}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "exclusiveMaximum");
    }

    #[test]
    fn test_minimum_and_exclusive_minimum() {
        assert!(run(json!(10), json!({"minimum": 10})).is_empty());
        assert_eq!(run(json!(9), json!({"minimum": 10})).len(), 1);
        assert_eq!(
            run(json!(10), json!({"minimum": 10, "exclusiveMinimum": true})).len(),
            1
        );
    }

    #[test]
    fn test_maximum_constraint_value_zero_is_reported() {
        let errors = run(json!(1), json!({"maximum": 0}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_value, json!(0));
    }

    #[test]
    fn test_string_lengths_count_code_points() {
        // "𝄞" (U+1D11E) is one code point even though it needs a
        // surrogate pair in UTF-16.
        assert!(run(json!("𝄞𝄞𝄞"), json!({"maxLength": 3})).is_empty());
        assert_eq!(run(json!("𝄞𝄞𝄞𝄞"), json!({"maxLength": 3})).len(), 1);
        assert!(run(json!("𝄞𝄞"), json!({"minLength": 2})).is_empty());
        assert_eq!(run(json!("𝄞"), json!({"minLength": 2})).len(), 1);
    }

    #[test]
    fn test_pattern() {
        assert!(run(json!("2125554444"), json!({"pattern": "^[0-9]{10}$"})).is_empty());
        let errors = run(json!("212-555"), json!({"pattern": "^[0-9]{10}$"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::String);
    }

    #[test]
    fn test_invalid_pattern_degrades_to_no_constraint() {
        assert!(run(json!("anything"), json!({"pattern": "(unclosed"})).is_empty());
    }

    #[test]
    fn test_items_single_schema_form() {
        let schema = json!({"items": {"type": "integer"}});
        assert!(run(json!([1, 2, 3]), schema.clone()).is_empty());

        let errors = run(json!([1, "two", 3.5]), schema);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].instance_context, "#/1");
        assert_eq!(errors[1].instance_context, "#/2");
    }

    #[test]
    fn test_items_positional_form_with_additional_false() {
        let schema = json!({
            "items": [{"type": "integer"}, {"type": "string"}],
            "additionalItems": false
        });
        assert!(run(json!([1, "two"]), schema.clone()).is_empty());

        let errors = run(json!([1, "two", true, null]), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "additionalItems");
    }

    #[test]
    fn test_items_positional_form_with_additional_schema() {
        let schema = json!({
            "items": [{"type": "integer"}],
            "additionalItems": {"type": "boolean"}
        });
        assert!(run(json!([1, true, false]), schema.clone()).is_empty());
        let errors = run(json!([1, true, "nope"]), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_context, "#/2");
    }

    #[test]
    fn test_items_positional_extra_elements_unconstrained_by_default() {
        let schema = json!({"items": [{"type": "integer"}]});
        assert!(run(json!([1, "anything", null]), schema).is_empty());
    }

    #[test]
    fn test_max_and_min_items() {
        assert_eq!(run(json!([1, 2, 3]), json!({"maxItems": 2})).len(), 1);
        assert_eq!(run(json!([1]), json!({"minItems": 2})).len(), 1);
        assert!(run(json!([1, 2]), json!({"maxItems": 2, "minItems": 2})).is_empty());
    }

    #[test]
    fn test_unique_items_deep_equality() {
        let schema = json!({"uniqueItems": true});
        assert!(run(json!([1, 2, 3]), schema.clone()).is_empty());
        // 0 and false are not equal; 17 and 17.0 are.
        assert!(run(json!([0, false]), schema.clone()).is_empty());
        assert_eq!(run(json!([17, 17.0]), schema.clone()).len(), 1);
        // object key order does not defeat duplicate detection
        let errors = run(
            json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}]),
            schema,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "uniqueItems");
    }

    #[test]
    fn test_max_and_min_properties() {
        assert_eq!(run(json!({"a": 1, "b": 2}), json!({"maxProperties": 1})).len(), 1);
        assert_eq!(run(json!({"a": 1}), json!({"minProperties": 2})).len(), 1);
        assert!(run(json!({"a": 1, "b": 2}), json!({"maxProperties": 2, "minProperties": 1})).is_empty());
    }

    #[test]
    fn test_required_reports_one_combined_error() {
        let schema = json!({"required": ["first", "last"]});
        let errors = run(json!({"first": "A"}), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Object);
        assert_eq!(errors[0].constraint_name, "required");
        assert!(errors[0].description.contains("last"));
        assert!(!errors[0].description.contains("first,"));
    }

    #[test]
    fn test_properties_with_additional_false() {
        let schema = json!({
            "properties": {"x": {"type": "string"}},
            "additionalProperties": false
        });
        assert!(run(json!({"x": "ok"}), schema.clone()).is_empty());

        let errors = run(json!({"x": "ok", "y": 1}), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Object);
        assert_eq!(errors[0].constraint_name, "additionalProperties");
        assert_eq!(errors[0].tested_value, Some(json!("y")));
    }

    #[test]
    fn test_pattern_properties_all_matches_apply() {
        let schema = json!({
            "patternProperties": {
                "^s": {"type": "string"},
                "ring$": {"type": "string", "minLength": 3}
            }
        });
        // "string" matches both patterns; both constraints apply.
        assert!(run(json!({"string": "long enough"}), schema.clone()).is_empty());
        let errors = run(json!({"string": "ab"}), schema.clone());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "minLength");

        let errors = run(json!({"string": 5}), schema);
        assert_eq!(errors.len(), 2); // type error from each matching pattern
    }

    #[test]
    fn test_additional_properties_schema_form() {
        let schema = json!({
            "properties": {"x": {"type": "string"}},
            "additionalProperties": {"type": "integer"}
        });
        assert!(run(json!({"x": "ok", "y": 3}), schema.clone()).is_empty());
        let errors = run(json!({"x": "ok", "y": "not an int"}), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_context, "#/y");
    }

    #[test]
    fn test_dependencies_name_list() {
        let schema = json!({"dependencies": {"credit_card": ["billing_address"]}});
        assert!(run(json!({"name": "x"}), schema.clone()).is_empty());
        assert!(run(
            json!({"credit_card": "4111", "billing_address": "1 Main St"}),
            schema.clone()
        )
        .is_empty());

        let errors = run(json!({"credit_card": "4111"}), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "dependencies");
        assert!(errors[0].description.contains("billing_address"));
    }

    #[test]
    fn test_dependencies_schema_form_validates_whole_instance() {
        let schema = json!({
            "dependencies": {
                "credit_card": {"required": ["billing_address"]}
            }
        });
        let errors = run(json!({"credit_card": "4111"}), schema);
        assert_eq!(errors.len(), 1);
        // the error's location is attributed to the dependency key
        assert_eq!(errors[0].instance_context, "#/credit_card");
    }

    #[test]
    fn test_enum_uses_deep_equality() {
        let schema = json!({"enum": [[1, 2], {"a": 1}, "x"]});
        assert!(run(json!([1, 2]), schema.clone()).is_empty());
        assert!(run(json!({"a": 1}), schema.clone()).is_empty());
        let errors = run(json!([2, 1]), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "enum");
    }

    #[test]
    fn test_all_of_accumulates_branch_errors() {
        let schema = json!({"allOf": [{"minimum": 10}, {"multipleOf": 3}]});
        assert!(run(json!(12), schema.clone()).is_empty());
        let errors = run(json!(7), schema);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_any_of_first_valid_branch_wins() {
        let schema = json!({"anyOf": [{"type": "string"}, {"minimum": 10}]});
        assert!(run(json!("text"), schema.clone()).is_empty());
        assert!(run(json!(11), schema.clone()).is_empty());

        let errors = run(json!(3), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "anyOf");
        let branches = errors[0].sub_schema_validation_errors.as_ref().unwrap();
        assert_eq!(branches.len(), 2);
        assert!(branches.contains_key("sub-schema-0"));
        assert!(branches.contains_key("sub-schema-1"));
    }

    #[test]
    fn test_one_of_exactly_one_law() {
        let schema = json!({
            "oneOf": [{"type": "string"}, {"type": "number", "enum": [1, 2]}]
        });
        assert!(run(json!("text"), schema.clone()).is_empty());
        assert!(run(json!(1), schema.clone()).is_empty());

        let errors = run(json!(3), schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Composite);
        assert!(errors[0].description.contains("does not validate against any"));
        let branches = errors[0].sub_schema_validation_errors.as_ref().unwrap();
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_one_of_more_than_one_is_distinguished() {
        let schema = json!({"oneOf": [{"minimum": 0}, {"multipleOf": 1}]});
        let errors = run(json!(5), schema);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].description.contains("more than one"));
    }

    #[test]
    fn test_not() {
        assert!(run(json!("text"), json!({"not": {"type": "integer"}})).is_empty());
        let errors = run(json!(5), json!({"not": {"type": "integer"}}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "not");
    }

    #[test]
    fn test_format_known_and_unknown() {
        let errors = run(json!("not a date"), json!({"format": "date-time"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Format);

        // unknown formats are ignored, not errors
        assert!(run(json!("anything"), json!({"format": "no-such-format"})).is_empty());
    }

    #[test]
    fn test_local_ref_through_registry() {
        let schema = json!({
            "id": "http://test.local/root",
            "properties": {"x": {"$ref": "#/definitions/positive"}},
            "definitions": {"positive": {"type": "integer", "minimum": 1}}
        });
        let mut registry = SchemaRegistry::new();
        registry.register(&schema, None);
        let formats = FormatRegistry::with_builtins();
        let engine = Engine {
            registry: &registry,
            formats: &formats,
            loader_configured: false,
        };

        let scope = "http://test.local/root#";
        assert!(engine
            .validate(&json!({"x": 3}), &schema, scope, "#")
            .is_empty());

        let errors = engine.validate(&json!({"x": 0}), &schema, scope, "#");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].constraint_name, "minimum");
        assert_eq!(errors[0].instance_context, "#/x");
    }

    #[test]
    fn test_unresolved_remote_ref_mentions_loader() {
        let errors = run(json!(1), json!({"$ref": "http://example.org/foo#"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Reference);
        assert!(errors[0].description.contains("http://example.org/foo#"));
        assert!(errors[0].description.contains("loader"));
    }

    #[test]
    fn test_ref_failure_does_not_poison_siblings() {
        let schema = json!({
            "properties": {
                "good": {"type": "integer"},
                "bad": {"$ref": "http://nowhere.example/missing"}
            }
        });
        let errors = run(json!({"good": "oops", "bad": 1}), schema);
        assert_eq!(errors.len(), 2);
        let kinds: Vec<ErrorKind> = errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ErrorKind::Type));
        assert!(kinds.contains(&ErrorKind::Reference));
    }
}
