//! Type registry subsystem
//!
//! Supplies field descriptors, resolvers and type relationships to the
//! filter deriver, compiler and materializer.
//!
//! # Design Principles
//!
//! - Declared types are resolved to a [`FieldKind`] once, when the registry
//!   is built; nothing downstream inspects type names to pick semantics
//! - Registries are immutable after `build()`
//! - Node types always carry the node interface fields

mod errors;
mod interface;
mod loader;
mod registry;
mod resolver;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use interface::{node_interface_field_names, INTERNAL_TYPE, NODE_TYPE};
pub use loader::SchemaLoader;
pub use registry::{FieldDef, ObjectTypeDef, SchemaBuilder, SchemaRegistry, TypeRegistry};
pub use resolver::{
    resolver_fn, FieldResolver, LinkResolver, ResolveContext, ResolveInfo, ResolveParams,
    ResolverError,
};
pub use types::{DeclaredType, EnumType, FieldDescriptor, FieldKind, LeafType, ObjectType, ScalarType};
