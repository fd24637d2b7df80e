//! Content node representation

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::errors::{NodeError, NodeResult};

/// A unit of content with identity, type and content version.
///
/// The body holds every field including `id` and `internal`; identity
/// metadata is copied out at construction for cheap access.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    type_name: String,
    content_digest: String,
    body: Map<String, Value>,
}

impl Node {
    /// Builds a node from its JSON form.
    ///
    /// Requires a string `id` and an `internal.type` string. A missing
    /// `internal.contentDigest` is treated as the empty digest.
    pub fn from_json(value: Value) -> NodeResult<Self> {
        let Value::Object(body) = value else {
            return Err(NodeError::malformed("node must be a JSON object"));
        };

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NodeError::malformed("node is missing a string `id`"))?
            .to_string();

        let internal = body
            .get("internal")
            .and_then(Value::as_object)
            .ok_or_else(|| NodeError::malformed(format!("node {} is missing `internal`", id)))?;

        let type_name = internal
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                NodeError::malformed(format!("node {} is missing `internal.type`", id))
            })?
            .to_string();

        let content_digest = internal
            .get("contentDigest")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id,
            type_name,
            content_digest,
            body,
        })
    }

    /// Returns the node id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the node's type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the content version
    pub fn content_digest(&self) -> &str {
        &self.content_digest
    }

    /// Returns the full field map
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Returns a top-level field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Returns the parent id, if any
    pub fn parent(&self) -> Option<&str> {
        self.body.get("parent").and_then(Value::as_str)
    }

    /// Returns the ids of child nodes
    pub fn children(&self) -> Vec<&str> {
        self.body
            .get("children")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Creates a snapshot sharing this node's identity with a new body.
    ///
    /// The stored node is left untouched.
    pub fn with_body(&self, body: Map<String, Value>) -> Self {
        Self {
            id: self.id.clone(),
            type_name: self.type_name.clone(),
            content_digest: self.content_digest.clone(),
            body,
        }
    }

    /// Returns the node as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
