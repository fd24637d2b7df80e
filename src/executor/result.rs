//! Result types for query execution

use std::sync::Arc;

use serde_json::Value;

use crate::node::Node;

/// Output of one query: a list, or a single (possibly missing) node
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Many(Vec<Arc<Node>>),
    One(Option<Arc<Node>>),
}

impl QueryOutput {
    /// Returns the nodes in result order
    pub fn nodes(&self) -> &[Arc<Node>] {
        match self {
            QueryOutput::Many(nodes) => nodes,
            QueryOutput::One(Some(node)) => std::slice::from_ref(node),
            QueryOutput::One(None) => &[],
        }
    }

    /// Consumes the output, returning the nodes in result order
    pub fn into_vec(self) -> Vec<Arc<Node>> {
        match self {
            QueryOutput::Many(nodes) => nodes,
            QueryOutput::One(node) => node.into_iter().collect(),
        }
    }

    /// Returns the first node, if any
    pub fn first(&self) -> Option<&Arc<Node>> {
        self.nodes().first()
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Node ids in result order
    pub fn ids(&self) -> Vec<&str> {
        self.nodes().iter().map(|n| n.id()).collect()
    }

    /// Drops `skip` leading nodes and keeps at most `limit` of the rest.
    ///
    /// A single-node output is returned unchanged.
    pub fn paginate(self, skip: Option<usize>, limit: Option<usize>) -> Self {
        match self {
            QueryOutput::Many(nodes) => QueryOutput::Many(
                nodes
                    .into_iter()
                    .skip(skip.unwrap_or(0))
                    .take(limit.unwrap_or(usize::MAX))
                    .collect(),
            ),
            one => one,
        }
    }

    /// JSON form: an array for lists, the node or null for single lookups
    pub fn to_json(&self) -> Value {
        match self {
            QueryOutput::Many(nodes) => Value::Array(nodes.iter().map(|n| n.to_json()).collect()),
            QueryOutput::One(Some(node)) => node.to_json(),
            QueryOutput::One(None) => Value::Null,
        }
    }
}
