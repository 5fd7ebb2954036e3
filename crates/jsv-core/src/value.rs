//! # Value Classification & Deep Equality
//!
//! Draft-04 interprets JSON values through seven primitive types. Two of
//! them overlap: a number with a zero fractional part is an `integer`,
//! and an `integer` instance also satisfies a declared `number` type.
//! Classification here is purely about the *value*, not how it was
//! written — `42.0` classifies as `integer`.
//!
//! Equality follows the JSON Schema definition, not host-language
//! semantics: arrays compare pairwise in order, objects compare by key
//! set regardless of insertion order, numbers compare by numeric value
//! (`17 == 17.0`), and values of different primitive types are never
//! equal (`0 != false`, `"0" != 0`).

use serde_json::Value;

/// The apparent primitive type of a JSON instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceType {
    Null,
    Boolean,
    /// A number with no fractional part. Also satisfies a declared `number`.
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl InstanceType {
    /// The draft-04 type name as it appears in a schema's `type` keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for InstanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an instance value by its apparent draft-04 primitive type.
///
/// Numbers classify by value: zero fractional remainder means `integer`,
/// anything else `number`. Integer-valued floats written as `42.0`
/// therefore classify as `integer`.
pub fn apparent_type(value: &Value) -> InstanceType {
    match value {
        Value::Null => InstanceType::Null,
        Value::Bool(_) => InstanceType::Boolean,
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                InstanceType::Integer
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => InstanceType::Integer,
                    _ => InstanceType::Number,
                }
            }
        }
        Value::String(_) => InstanceType::String,
        Value::Array(_) => InstanceType::Array,
        Value::Object(_) => InstanceType::Object,
    }
}

/// Deep equality as defined by the JSON Schema spec.
///
/// Arrays are equal iff they have the same length and are pairwise equal
/// in order. Objects are equal iff they have the same key set (order
/// independent) and each value is deep-equal. Numbers are equal by
/// numeric value, so `17 == 17.0`. Scalars of different types are never
/// equal: `0 != false`, `"0" != 0`, `null != {}`.
pub fn json_equal(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        // Numeric comparison is by value, not representation. serde_json
        // keeps 17 (i64) and 17.0 (f64) distinct; JSON Schema does not.
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(va, vb)| json_equal(va, vb))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, va)| b.get(k).is_some_and(|vb| json_equal(va, vb)))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_apparent_type_scalars() {
        assert_eq!(apparent_type(&json!(null)), InstanceType::Null);
        assert_eq!(apparent_type(&json!(true)), InstanceType::Boolean);
        assert_eq!(apparent_type(&json!(false)), InstanceType::Boolean);
        assert_eq!(apparent_type(&json!("hello world")), InstanceType::String);
    }

    #[test]
    fn test_apparent_type_numbers() {
        assert_eq!(apparent_type(&json!(42)), InstanceType::Integer);
        assert_eq!(apparent_type(&json!(0)), InstanceType::Integer);
        assert_eq!(apparent_type(&json!(42.0)), InstanceType::Integer);
        assert_eq!(apparent_type(&json!(-7.0)), InstanceType::Integer);
        assert_eq!(apparent_type(&json!(42.1)), InstanceType::Number);
        assert_eq!(apparent_type(&json!(0.5)), InstanceType::Number);
    }

    #[test]
    fn test_apparent_type_structural() {
        assert_eq!(apparent_type(&json!([15, 37, "abcdefg"])), InstanceType::Array);
        assert_eq!(apparent_type(&json!({"foo": [1, 2, 3]})), InstanceType::Object);
    }

    #[test]
    fn test_json_equal_scalars() {
        assert!(json_equal(&json!(null), &json!(null)));
        assert!(json_equal(&json!(true), &json!(true)));
        assert!(json_equal(&json!("hello"), &json!("hello")));
        assert!(!json_equal(&json!("hello"), &json!("goodbye")));
        assert!(!json_equal(&json!(null), &json!(0)));
        assert!(!json_equal(&json!(null), &json!(false)));
        assert!(!json_equal(&json!(""), &json!(0)));
    }

    #[test]
    fn test_json_equal_numbers_by_value() {
        assert!(json_equal(&json!(17), &json!(17.0)));
        assert!(json_equal(&json!(3.14195), &json!(3.14195)));
        assert!(!json_equal(&json!(42.1), &json!(42)));
        assert!(!json_equal(&json!(42.1), &json!(42.2)));
    }

    #[test]
    fn test_json_equal_no_cross_type_coercion() {
        assert!(!json_equal(&json!(0), &json!(false)));
        assert!(!json_equal(&json!(1), &json!(true)));
        assert!(!json_equal(&json!(7), &json!("7")));
        assert!(!json_equal(&json!("0"), &json!(0)));
    }

    #[test]
    fn test_json_equal_arrays_ordered() {
        assert!(json_equal(&json!([]), &json!([])));
        assert!(json_equal(&json!(["a", "b", "c"]), &json!(["a", "b", "c"])));
        assert!(!json_equal(&json!(["a", "b"]), &json!(["b", "a"])));
        assert!(!json_equal(&json!(["a", "b"]), &json!(["a", "b", "c"])));
    }

    #[test]
    fn test_json_equal_objects_key_order_blind() {
        assert!(json_equal(
            &json!({"foo": "bar", "baz": 42}),
            &json!({"baz": 42, "foo": "bar"})
        ));
        assert!(json_equal(
            &json!(["a", "b", {"foo": "bar", "baz": 42}]),
            &json!(["a", "b", {"baz": 42, "foo": "bar"}])
        ));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 2})));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_json_equal_reflexive(v in arb_json()) {
            prop_assert!(json_equal(&v, &v));
        }

        #[test]
        fn prop_json_equal_symmetric(a in arb_json(), b in arb_json()) {
            prop_assert_eq!(json_equal(&a, &b), json_equal(&b, &a));
        }
    }
}
