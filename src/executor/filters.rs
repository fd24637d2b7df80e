//! Predicate evaluation
//!
//! Every condition must hold. Within a condition each operation must be
//! satisfied by at least one slot reached through the path.
//!
//! Absent fields satisfy only the negative operations (`ne`, `nin` unless
//! it excludes absence, "contains none") and the presence-aware checks.
//! Unreachable fields (missing intermediate object) satisfy only the
//! presence-aware checks.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::compiler::{CompiledPredicate, Condition, PathCondition, PrimitiveOp};
use crate::node::{lookup, Slot};

/// Evaluates compiled predicates against node bodies
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if an object matches all conditions
    pub fn matches(object: &Map<String, Value>, predicate: &CompiledPredicate) -> bool {
        predicate
            .conditions()
            .iter()
            .all(|condition| Self::matches_condition(object, condition))
    }

    fn matches_condition(object: &Map<String, Value>, condition: &PathCondition) -> bool {
        let slots = lookup(object, &condition.path);

        match &condition.condition {
            Condition::Ops(ops) => ops
                .iter()
                .all(|op| slots.iter().any(|slot| Self::matches_op(*slot, op))),
            Condition::ElemMatch(nested) => slots.iter().any(|slot| match slot {
                Slot::Value(value) => Self::elem_match(value, nested),
                _ => false,
            }),
        }
    }

    /// Some element of the list (or the object itself) satisfies `nested`
    fn elem_match(value: &Value, nested: &CompiledPredicate) -> bool {
        match value {
            Value::Array(items) => items.iter().any(|item| match item {
                Value::Object(map) => Self::matches(map, nested),
                _ => false,
            }),
            Value::Object(map) => Self::matches(map, nested),
            _ => false,
        }
    }

    fn matches_op(slot: Slot<'_>, op: &PrimitiveOp) -> bool {
        let value = match slot {
            Slot::Value(value) => value,
            Slot::Absent => {
                return match op {
                    PrimitiveOp::Ne(_) | PrimitiveOp::ContainsNone(_) => true,
                    PrimitiveOp::Nin { exclude_absent, .. } => !exclude_absent,
                    PrimitiveOp::Missing | PrimitiveOp::NotTrue => true,
                    _ => false,
                }
            }
            Slot::Unreachable => return matches!(op, PrimitiveOp::Missing | PrimitiveOp::NotTrue),
        };

        match op {
            PrimitiveOp::Eq(expected) => values_equal(value, expected),
            PrimitiveOp::Ne(expected) => !values_equal(value, expected),
            PrimitiveOp::Lt(bound) => compare(value, bound) == Some(Ordering::Less),
            PrimitiveOp::Lte(bound) => matches!(compare(value, bound), Some(Ordering::Less | Ordering::Equal)),
            PrimitiveOp::Gt(bound) => compare(value, bound) == Some(Ordering::Greater),
            PrimitiveOp::Gte(bound) => matches!(compare(value, bound), Some(Ordering::Greater | Ordering::Equal)),
            PrimitiveOp::In(values) => contains(values, value),
            PrimitiveOp::Nin { values, .. } => !contains(values, value),
            PrimitiveOp::Contains(expected) => items(value).iter().any(|item| values_equal(item, expected)),
            PrimitiveOp::ContainsAny(values) => items(value).iter().any(|item| contains(values, item)),
            PrimitiveOp::ContainsNone(values) => !items(value).iter().any(|item| contains(values, item)),
            PrimitiveOp::Regex(regex) => regex.is_match(value),
            PrimitiveOp::Glob(glob) => glob.is_match(value),
            PrimitiveOp::Missing => value.is_null(),
            PrimitiveOp::Present => !value.is_null(),
            PrimitiveOp::NotTrue => *value != Value::Bool(true),
            // rejected before evaluation starts
            PrimitiveOp::Unknown { .. } => false,
        }
    }
}

/// Equality without coercion, except that numbers compare by value
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between two values of the same scalar kind
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn contains(values: &[Value], value: &Value) -> bool {
    values.iter().any(|v| values_equal(v, value))
}

/// Elements of a list value; a scalar counts as a one-element list
fn items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{FilterCompiler, FilterExpr};
    use crate::schema::{ObjectTypeDef, SchemaBuilder};
    use serde_json::json;
    use std::sync::Arc;

    fn predicate(filter: Value) -> CompiledPredicate {
        let registry = SchemaBuilder::new()
            .object_type(ObjectTypeDef::new("Wax").field("foo", "Boolean"))
            .object_type(ObjectTypeDef::new("Item").field("n", "Int").field("flags", "[Boolean]"))
            .object_type(
                ObjectTypeDef::new("Test")
                    .node()
                    .field("hair", "Int")
                    .field("name", "String")
                    .field("boolean", "Boolean")
                    .field("anArray", "[Int]")
                    .field("waxOnly", "Wax")
                    .field("items", "[Item]"),
            )
            .build()
            .unwrap();
        FilterCompiler::new(Arc::new(registry))
            .compile(&FilterExpr::from_json(&filter).unwrap(), "Test")
            .unwrap()
    }

    fn matches(filter: Value, body: Value) -> bool {
        let Value::Object(map) = body else { unreachable!() };
        PredicateFilter::matches(&map, &predicate(filter))
    }

    #[test]
    fn test_comparisons() {
        assert!(matches(json!({ "hair": { "lt": 2 } }), json!({ "hair": 1 })));
        assert!(!matches(json!({ "hair": { "lt": 2 } }), json!({ "hair": 2 })));
        assert!(matches(json!({ "hair": { "lte": 2, "gte": 2 } }), json!({ "hair": 2.0 })));
        assert!(!matches(json!({ "hair": { "gt": 0 } }), json!({})));
        assert!(!matches(json!({ "hair": { "gt": 0 } }), json!({ "hair": "5" })));
    }

    #[test]
    fn test_null_handling() {
        assert!(matches(json!({ "hair": { "eq": null } }), json!({})));
        assert!(matches(json!({ "hair": { "eq": null } }), json!({ "hair": null })));
        assert!(!matches(json!({ "hair": { "eq": null } }), json!({ "hair": 0 })));
        assert!(matches(json!({ "hair": { "ne": null } }), json!({ "hair": 0 })));
        assert!(!matches(json!({ "hair": { "ne": null } }), json!({})));
        assert!(matches(json!({ "hair": { "ne": 2 } }), json!({})));
    }

    #[test]
    fn test_lists() {
        let body = json!({ "anArray": [1, 2, 5, 4] });
        assert!(matches(json!({ "anArray": { "in": [5] } }), body.clone()));
        assert!(!matches(json!({ "anArray": { "nin": [5] } }), body.clone()));
        assert!(matches(json!({ "anArray": { "eq": 2 } }), body.clone()));
        assert!(!matches(json!({ "anArray": { "ne": 2 } }), body));
        assert!(matches(json!({ "anArray": { "nin": [5] } }), json!({})));
        assert!(!matches(json!({ "anArray": { "in": [5] } }), json!({})));
    }

    #[test]
    fn test_boolean_nin() {
        let filter = json!({ "boolean": { "nin": [true, null] } });
        assert!(!matches(filter.clone(), json!({ "boolean": true })));
        assert!(matches(filter.clone(), json!({ "boolean": false })));
        assert!(!matches(filter, json!({})));
    }

    #[test]
    fn test_nested_ne_true() {
        let filter = json!({ "waxOnly": { "foo": { "ne": true } } });
        assert!(!matches(filter.clone(), json!({ "waxOnly": { "foo": true } })));
        assert!(matches(filter.clone(), json!({ "waxOnly": { "foo": false } })));
        assert!(matches(filter.clone(), json!({ "waxOnly": null })));
        assert!(matches(filter, json!({})));

        // plain ne does not reach through a missing intermediate
        assert!(!matches(json!({ "waxOnly": { "foo": { "ne": false } } }), json!({})));
    }

    #[test]
    fn test_regex_requires_presence() {
        let filter = json!({ "name": { "regex": "/.*/" } });
        assert!(matches(filter.clone(), json!({ "name": "" })));
        assert!(!matches(filter, json!({})));
    }

    #[test]
    fn test_elem_match_and_fan_out() {
        let body = json!({ "items": [{ "n": 1 }, { "n": 3, "flags": [true] }] });
        assert!(matches(json!({ "items": { "elemMatch": { "n": { "gt": 2 } } } }), body.clone()));
        assert!(!matches(json!({ "items": { "elemMatch": { "n": { "gt": 3 } } } }), body.clone()));
        assert!(matches(
            json!({ "items": { "elemMatch": { "n": { "eq": 3 }, "flags": { "in": [true] } } } }),
            body.clone()
        ));
        assert!(!matches(
            json!({ "items": { "elemMatch": { "n": { "eq": 1 }, "flags": { "in": [true] } } } }),
            body.clone()
        ));
        // dotted paths through lists are existential
        assert!(matches(json!({ "items": { "n": { "eq": 1 } } }), body));
    }

    #[test]
    fn test_value_helpers() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!("1")));
        assert_eq!(compare(&json!("a"), &json!("b")), Some(Ordering::Less));
        assert_eq!(compare(&json!(1), &json!("b")), None);
    }
}
