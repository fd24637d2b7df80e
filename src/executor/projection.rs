//! Projections over query results
//!
//! `distinct` and `group` read values with list fan-out, so a node whose
//! field holds a list contributes every element.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::filters::values_equal;
use super::sorter::ResultSorter;
use crate::node::{lookup, Node};

/// Nodes sharing one value at the grouping path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub field_value: Value,
    pub total_count: usize,
    #[serde(skip)]
    pub nodes: Vec<Arc<Node>>,
}

/// Scalar values found at `path`, ascending and without duplicates.
///
/// Nulls are skipped.
pub fn distinct(nodes: &[Arc<Node>], path: &str) -> Vec<Value> {
    let mut values: Vec<Value> = nodes
        .iter()
        .flat_map(|node| scalars_at(node, path))
        .collect();
    values.sort_by(ResultSorter::compare_values);
    values.dedup_by(|a, b| values_equal(a, b));
    values
}

/// Groups nodes by the value at `path`; groups ascend by value.
///
/// Nodes keep their result order inside a group. Nodes without a value are
/// left out.
pub fn group(nodes: &[Arc<Node>], path: &str) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();

    for node in nodes {
        let mut seen: Vec<Value> = Vec::new();
        for value in scalars_at(node, path) {
            if seen.iter().any(|v| values_equal(v, &value)) {
                continue;
            }
            match groups.iter_mut().find(|g| values_equal(&g.field_value, &value)) {
                Some(group) => group.nodes.push(Arc::clone(node)),
                None => groups.push(Group {
                    field_value: value.clone(),
                    total_count: 0,
                    nodes: vec![Arc::clone(node)],
                }),
            }
            seen.push(value);
        }
    }

    for group in &mut groups {
        group.total_count = group.nodes.len();
    }
    groups.sort_by(|a, b| ResultSorter::compare_values(&a.field_value, &b.field_value));
    groups
}

fn scalars_at(node: &Node, path: &str) -> Vec<Value> {
    lookup(node.body(), path)
        .into_iter()
        .filter_map(|slot| slot.value())
        .flat_map(|value| match value {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        })
        .filter(|value| !value.is_null() && !value.is_object() && !value.is_array())
        .collect()
}
