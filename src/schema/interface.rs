//! Built-in node interface
//!
//! Every node type carries `id`, `parent`, `children` and `internal`, which
//! are queried like any user field.

use std::sync::Arc;

use super::registry::{FieldDef, ObjectTypeDef};
use super::resolver::LinkResolver;

/// Name of the interface type every node implements
pub const NODE_TYPE: &str = "Node";

/// Name of the type behind the `internal` field
pub const INTERNAL_TYPE: &str = "Internal";

/// Names of the node interface fields in declaration order
pub fn node_interface_field_names() -> [&'static str; 4] {
    ["id", "parent", "children", "internal"]
}

/// Node interface fields; `parent` and `children` follow ids to nodes
pub(crate) fn node_interface_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("id", "ID!"),
        FieldDef::new("parent", NODE_TYPE).with_resolver(Arc::new(LinkResolver::by_id())),
        FieldDef::new("children", "[Node!]!").with_resolver(Arc::new(LinkResolver::by_id())),
        FieldDef::new("internal", "Internal!"),
    ]
}

pub(crate) fn node_type_def() -> ObjectTypeDef {
    ObjectTypeDef::new(NODE_TYPE).node()
}

pub(crate) fn internal_type_def() -> ObjectTypeDef {
    ObjectTypeDef::new(INTERNAL_TYPE)
        .field("content", "String")
        .field("contentDigest", "String!")
        .field("description", "String")
        .field("fieldOwners", "[String]")
        .field("ignoreType", "Boolean")
        .field("mediaType", "String")
        .field("owner", "String!")
        .field("type", "String!")
}
