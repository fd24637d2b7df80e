//! Type registry and its builder

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::interface::{internal_type_def, node_interface_fields, node_type_def, INTERNAL_TYPE, NODE_TYPE};
use super::resolver::FieldResolver;
use super::types::{DeclaredType, EnumType, FieldDescriptor, FieldKind, LeafType, ObjectType, ScalarType};

/// Read-only access to object types
pub trait TypeRegistry: Send + Sync {
    /// Looks up an object type by name
    fn object_type(&self, name: &str) -> Option<Arc<ObjectType>>;
}

/// Unresolved field definition
#[derive(Clone)]
pub struct FieldDef {
    name: String,
    declared_type: String,
    resolver: Option<Arc<dyn FieldResolver>>,
    default_args: Map<String, Value>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            resolver: None,
            default_args: Map::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn FieldResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_default_args(mut self, args: Map<String, Value>) -> Self {
        self.default_args = args;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Unresolved object type definition
#[derive(Clone)]
pub struct ObjectTypeDef {
    name: String,
    node: bool,
    fields: Vec<FieldDef>,
}

impl ObjectTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: false,
            fields: Vec::new(),
        }
    }

    /// Marks the type as a node type; it receives the node interface fields
    pub fn node(mut self) -> Self {
        self.node = true;
        self
    }

    /// Adds a plain field
    pub fn field(self, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        self.field_def(FieldDef::new(name, declared_type))
    }

    /// Adds a field computed by a resolver
    pub fn resolved_field(
        self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        resolver: Arc<dyn FieldResolver>,
    ) -> Self {
        self.field_def(FieldDef::new(name, declared_type).with_resolver(resolver))
    }

    pub fn field_def(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Collects definitions and resolves them into a [`SchemaRegistry`]
#[derive(Default)]
pub struct SchemaBuilder {
    types: Vec<ObjectTypeDef>,
    enums: Vec<EnumType>,
    resolvers: Vec<(String, String, Arc<dyn FieldResolver>)>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_type(mut self, def: ObjectTypeDef) -> Self {
        self.types.push(def);
        self
    }

    pub fn enum_type(mut self, def: EnumType) -> Self {
        self.enums.push(def);
        self
    }

    /// Attaches a resolver to an already defined field
    pub fn resolver(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        resolver: Arc<dyn FieldResolver>,
    ) -> Self {
        self.resolvers.push((type_name.into(), field.into(), resolver));
        self
    }

    /// Resolves every declared type to a [`FieldKind`].
    ///
    /// The `Node` and `Internal` types are always registered.
    pub fn build(self) -> SchemaResult<SchemaRegistry> {
        let mut defs = self.types;
        if !defs.iter().any(|d| d.name == NODE_TYPE) {
            defs.push(node_type_def());
        }
        if !defs.iter().any(|d| d.name == INTERNAL_TYPE) {
            defs.push(internal_type_def());
        }

        let mut enums = HashMap::new();
        for e in self.enums {
            if enums.contains_key(&e.name) {
                return Err(SchemaError::duplicate_type(&e.name));
            }
            enums.insert(e.name.clone(), e);
        }

        let mut object_names = HashSet::new();
        for def in &defs {
            if !object_names.insert(def.name.clone()) || enums.contains_key(&def.name) {
                return Err(SchemaError::duplicate_type(&def.name));
            }
        }

        let mut types = HashMap::new();
        for def in defs {
            let mut field_defs = def.fields;
            if def.node {
                for interface_field in node_interface_fields() {
                    if !field_defs.iter().any(|f| f.name == interface_field.name) {
                        field_defs.push(interface_field);
                    }
                }
            }

            let mut fields = Vec::with_capacity(field_defs.len());
            for f in field_defs {
                if fields.iter().any(|d: &FieldDescriptor| d.name() == f.name) {
                    return Err(SchemaError::malformed(
                        format!("{}.{}", def.name, f.name),
                        "field declared twice",
                    ));
                }
                let kind = resolve_kind(&def.name, &f, &object_names, &enums)?;
                fields.push(FieldDescriptor::new(f.name, f.declared_type, kind, f.resolver, f.default_args));
            }

            types.insert(def.name.clone(), ObjectType::new(def.name, def.node, fields));
        }

        for (type_name, field, resolver) in self.resolvers {
            let ty = types
                .get_mut(&type_name)
                .ok_or_else(|| SchemaError::unknown_type(&type_name))?;
            let descriptor = ty
                .field_mut(&field)
                .ok_or_else(|| SchemaError::unknown_field(&type_name, &field))?;
            descriptor.set_resolver(resolver);
        }

        Ok(SchemaRegistry {
            types: types.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            enums,
        })
    }
}

fn resolve_kind(
    type_name: &str,
    field: &FieldDef,
    objects: &HashSet<String>,
    enums: &HashMap<String, EnumType>,
) -> SchemaResult<FieldKind> {
    let declared = DeclaredType::parse(&field.declared_type)
        .map_err(|e| SchemaError::malformed(format!("{}.{}", type_name, field.name), e.message()))?;

    let kind = if let Some(scalar) = ScalarType::from_name(&declared.name) {
        if declared.list {
            FieldKind::ListOfScalar(LeafType::Scalar(scalar))
        } else {
            FieldKind::Scalar(scalar)
        }
    } else if enums.contains_key(&declared.name) {
        if declared.list {
            FieldKind::ListOfScalar(LeafType::Enum(declared.name))
        } else {
            FieldKind::Enum(declared.name)
        }
    } else if objects.contains(&declared.name) {
        if declared.list {
            FieldKind::ListOfObject(declared.name)
        } else {
            FieldKind::Object(declared.name)
        }
    } else {
        return Err(SchemaError::malformed(
            format!("{}.{}", type_name, field.name),
            format!("type {} is not defined", declared.name),
        ));
    };

    Ok(kind)
}

/// Immutable registry of resolved types
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: HashMap<String, Arc<ObjectType>>,
    enums: HashMap<String, EnumType>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    /// Object type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TypeRegistry for SchemaRegistry {
    fn object_type(&self, name: &str) -> Option<Arc<ObjectType>> {
        self.types.get(name).cloned()
    }
}
