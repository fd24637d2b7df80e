//! Result sorting for query execution
//!
//! Multi-key, stable. Each key carries its own direction.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;

use crate::compiler::{SortDirection, SortSpec};
use crate::node::{resolve, Node, Slot};

/// Sorts result nodes
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts nodes according to the sort specification.
    ///
    /// Ties on every key keep their input order.
    pub fn sort(nodes: &mut [Arc<Node>], sort: &SortSpec) {
        nodes.sort_by(|a, b| {
            for field in sort.fields() {
                let ordering = Self::compare_slots(
                    resolve(a.body(), &field.path),
                    resolve(b.body(), &field.path),
                );
                let ordering = match field.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Ascending order of sort slots.
    ///
    /// Ordering rules:
    /// - values < null < absent
    /// - values compare with [`ResultSorter::compare_values`]
    pub fn compare_slots(a: Slot<'_>, b: Slot<'_>) -> Ordering {
        let rank = |slot: &Slot<'_>| -> u8 {
            match slot {
                Slot::Value(Value::Null) => 1,
                Slot::Value(_) => 0,
                Slot::Absent | Slot::Unreachable => 2,
            }
        };

        match (a, b) {
            (Slot::Value(x), Slot::Value(y)) if !x.is_null() && !y.is_null() => {
                Self::compare_values(x, y)
            }
            (a, b) => rank(&a).cmp(&rank(&b)),
        }
    }

    /// Compares two JSON values.
    ///
    /// Ordering rules:
    /// - null < bool < number < string < array < object
    /// - For same types, natural ordering; arrays element-wise
    pub fn compare_values(a: &Value, b: &Value) -> Ordering {
        let type_order = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            }
        };

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Array(x), Value::Array(y)) => x
                .iter()
                .zip(y.iter())
                .map(|(x, y)| Self::compare_values(x, y))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or_else(|| x.len().cmp(&y.len())),
            (Value::Object(_), Value::Object(_)) => Ordering::Equal,
            _ => type_order(a).cmp(&type_order(b)),
        }
    }
}
