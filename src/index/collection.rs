//! Per-type node collections with lazily built indexes
//!
//! A collection mirrors the store's node list for one type. Indexes map the
//! scalar values reachable at a dotted path (list elements included) to node
//! positions, and only ever narrow candidates: the executor re-checks the
//! full predicate on every candidate.

use std::collections::{HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::btree::{IndexKey, IndexTree, Position};
use super::errors::{IndexError, IndexResult};
use crate::compiler::PrimitiveOp;
use crate::executor::Collection;
use crate::node::{lookup, Node, Slot};

/// Indexed view over the nodes of one type
#[derive(Debug)]
pub struct NodeCollection {
    type_name: String,
    nodes: Vec<Arc<Node>>,
    indexes: HashMap<String, IndexTree>,
    /// Paths whose build failed; not retried until the next re-sync
    failed: HashSet<String>,
    max_index_entries: usize,
}

impl NodeCollection {
    pub fn new(type_name: impl Into<String>, max_index_entries: usize) -> Self {
        Self {
            type_name: type_name.into(),
            nodes: Vec::new(),
            indexes: HashMap::new(),
            failed: HashSet::new(),
            max_index_entries,
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Arc<Node>>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Replaces the node list unless it holds the same nodes (by identity).
    ///
    /// Existing index paths are rebuilt over the new list. Returns true when
    /// the list changed.
    pub fn sync(&mut self, nodes: Vec<Arc<Node>>) -> bool {
        let unchanged = self.nodes.len() == nodes.len()
            && self.nodes.iter().zip(&nodes).all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            return false;
        }

        self.nodes = nodes;
        self.failed.clear();

        let paths: Vec<String> = self.indexes.drain().map(|(path, _)| path).collect();
        for path in paths {
            match self.build_tree(&path) {
                Ok(tree) => {
                    self.indexes.insert(path, tree);
                }
                Err(e) => {
                    warn!(type_name = %self.type_name, error = %e, "index dropped on re-sync");
                    self.failed.insert(path);
                }
            }
        }

        debug!(type_name = %self.type_name, nodes = self.nodes.len(), indexes = self.indexes.len(), "collection re-synced");
        true
    }

    /// Builds the index for `path` unless it exists or already failed.
    ///
    /// Returns `Ok(true)` when an index was built by this call.
    pub fn ensure_index(&mut self, path: &str) -> IndexResult<bool> {
        if self.indexes.contains_key(path) || self.failed.contains(path) {
            return Ok(false);
        }

        match self.build_tree(path) {
            Ok(tree) => {
                self.indexes.insert(path.to_string(), tree);
                Ok(true)
            }
            Err(e) => {
                self.failed.insert(path.to_string());
                Err(e)
            }
        }
    }

    pub fn has_index(&self, path: &str) -> bool {
        self.indexes.contains_key(path)
    }

    /// Built index paths, sorted
    pub fn index_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    fn build_tree(&self, path: &str) -> IndexResult<IndexTree> {
        let mut tree = IndexTree::new();
        let mut entries = 0usize;

        for (position, node) in self.nodes.iter().enumerate() {
            for slot in lookup(node.body(), path) {
                let Slot::Value(value) = slot else { continue };
                let values: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for key in values.into_iter().filter_map(IndexKey::from_json) {
                    entries += 1;
                    if entries > self.max_index_entries {
                        return Err(IndexError::build_failed(
                            path,
                            format!("more than {} entries", self.max_index_entries),
                        ));
                    }
                    tree.insert(key, position);
                }
            }
        }

        Ok(tree)
    }

    fn lookup_many(tree: &IndexTree, values: &[Value]) -> Option<Vec<Position>> {
        let mut positions = Vec::new();
        for value in values {
            positions.extend(tree.lookup_eq(&IndexKey::from_json(value)?));
        }
        positions.sort_unstable();
        positions.dedup();
        Some(positions)
    }
}

impl Collection for NodeCollection {
    fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    fn candidates(&self, path: &str, op: &PrimitiveOp) -> Option<Vec<Position>> {
        let tree = self.indexes.get(path)?;

        match op {
            PrimitiveOp::Eq(v) | PrimitiveOp::Contains(v) => Some(tree.lookup_eq(&IndexKey::from_json(v)?)),
            PrimitiveOp::In(values) | PrimitiveOp::ContainsAny(values) => Self::lookup_many(tree, values),
            PrimitiveOp::Lt(v) | PrimitiveOp::Lte(v) => {
                let key = IndexKey::from_json(v)?;
                let min = key.kind_min();
                let max = match op {
                    PrimitiveOp::Lt(_) => Bound::Excluded(&key),
                    _ => Bound::Included(&key),
                };
                Some(tree.lookup_range(Bound::Included(&min), max))
            }
            PrimitiveOp::Gt(v) | PrimitiveOp::Gte(v) => {
                let key = IndexKey::from_json(v)?;
                let max = key.kind_max();
                let min = match op {
                    PrimitiveOp::Gt(_) => Bound::Excluded(&key),
                    _ => Bound::Included(&key),
                };
                Some(tree.lookup_range(min, max.as_ref()))
            }
            _ => None,
        }
    }
}
