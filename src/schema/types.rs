//! Field and type descriptors
//!
//! Supported declared types:
//! - scalars: ID, String, Int, Float, Boolean, Date, JSON
//! - enums registered by name
//! - object types registered by name
//! - one level of list wrapping: `[Name]`, with optional `!` markers

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::resolver::FieldResolver;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Id,
    String,
    Int,
    Float,
    Boolean,
    Date,
    /// Opaque JSON; no filter operators
    Json,
}

impl ScalarType {
    /// Looks up a built-in scalar by its declared name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(ScalarType::Id),
            "String" => Some(ScalarType::String),
            "Int" => Some(ScalarType::Int),
            "Float" => Some(ScalarType::Float),
            "Boolean" => Some(ScalarType::Boolean),
            "Date" => Some(ScalarType::Date),
            "JSON" => Some(ScalarType::Json),
            _ => None,
        }
    }

    /// Returns the declared name
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Id => "ID",
            ScalarType::String => "String",
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::Boolean => "Boolean",
            ScalarType::Date => "Date",
            ScalarType::Json => "JSON",
        }
    }
}

/// Leaf value type: a scalar or an enum
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeafType {
    Scalar(ScalarType),
    Enum(String),
}

/// Tagged field kind, computed once when the registry is built.
///
/// Operator semantics (scalar vs element-wise vs existential) are chosen
/// from this tag alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Enum(String),
    /// Nested object of the named type
    Object(String),
    ListOfScalar(LeafType),
    /// List of objects of the named type
    ListOfObject(String),
}

impl FieldKind {
    /// Returns true for list kinds
    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::ListOfScalar(_) | FieldKind::ListOfObject(_))
    }

    /// Returns true for a non-list Boolean field
    pub fn is_boolean(&self) -> bool {
        matches!(self, FieldKind::Scalar(ScalarType::Boolean))
    }

    /// Returns the object type name for object and list-of-object kinds
    pub fn object_type(&self) -> Option<&str> {
        match self {
            FieldKind::Object(name) | FieldKind::ListOfObject(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the leaf type for scalar, enum and list-of-scalar kinds
    pub fn leaf(&self) -> Option<LeafType> {
        match self {
            FieldKind::Scalar(s) => Some(LeafType::Scalar(*s)),
            FieldKind::Enum(name) => Some(LeafType::Enum(name.clone())),
            FieldKind::ListOfScalar(leaf) => Some(leaf.clone()),
            _ => None,
        }
    }
}

/// A parsed declared type such as `[String!]!`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Named type inside any list wrapper
    pub name: String,
    /// Whether the type is wrapped in a list
    pub list: bool,
}

impl DeclaredType {
    /// Parses GraphQL-style type notation.
    ///
    /// Nested lists are rejected.
    pub fn parse(declared: &str) -> SchemaResult<Self> {
        let trimmed = declared.trim().trim_end_matches('!');

        let (inner, list) = match trimmed.strip_prefix('[') {
            Some(rest) => {
                let inner = rest.strip_suffix(']').ok_or_else(|| {
                    SchemaError::malformed(declared, "unterminated list type")
                })?;
                (inner.trim().trim_end_matches('!'), true)
            }
            None => (trimmed, false),
        };

        if inner.starts_with('[') {
            return Err(SchemaError::malformed(declared, "nested list types are not supported"));
        }
        if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SchemaError::malformed(declared, "invalid type name"));
        }

        Ok(Self {
            name: inner.to_string(),
            list,
        })
    }
}

/// A registered enum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Resolved field descriptor
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    declared_type: String,
    kind: FieldKind,
    resolver: Option<Arc<dyn FieldResolver>>,
    default_args: Map<String, Value>,
}

impl FieldDescriptor {
    pub(crate) fn new(
        name: String,
        declared_type: String,
        kind: FieldKind,
        resolver: Option<Arc<dyn FieldResolver>>,
        default_args: Map<String, Value>,
    ) -> Self {
        Self {
            name,
            declared_type,
            kind,
            resolver,
            default_args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type exactly as written, e.g. `[Node!]!`
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn resolver(&self) -> Option<&Arc<dyn FieldResolver>> {
        self.resolver.as_ref()
    }

    /// Arguments passed to the resolver when none are supplied
    pub fn default_args(&self) -> &Map<String, Value> {
        &self.default_args
    }

    pub(crate) fn set_resolver(&mut self, resolver: Arc<dyn FieldResolver>) {
        self.resolver = Some(resolver);
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("kind", &self.kind)
            .field("resolver", &self.resolver.is_some())
            .field("default_args", &self.default_args)
            .finish()
    }
}

/// Resolved object type; fields keep declaration order
#[derive(Debug, Clone)]
pub struct ObjectType {
    name: String,
    is_node: bool,
    fields: Vec<FieldDescriptor>,
}

impl ObjectType {
    pub(crate) fn new(name: String, is_node: bool, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name,
            is_node,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the type implements the node interface
    pub fn is_node(&self) -> bool {
        self.is_node
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}
