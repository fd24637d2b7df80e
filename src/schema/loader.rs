//! Schema loader for JSON type definitions
//!
//! Format:
//!
//! ```json
//! {
//!   "enums": [{ "name": "Color", "values": ["RED", "BLUE"] }],
//!   "types": [
//!     { "name": "Post", "node": true,
//!       "fields": { "title": "String", "tags": "[String]",
//!                   "excerpt": { "type": "String", "defaultArgs": { "length": 140 } } } }
//!   ]
//! }
//! ```
//!
//! Resolvers cannot be expressed in JSON; attach them to the returned
//! builder with [`SchemaBuilder::resolver`] before calling `build()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::registry::{FieldDef, ObjectTypeDef, SchemaBuilder};
use super::types::EnumType;

#[derive(Debug, Deserialize)]
struct TypeDefinitions {
    #[serde(default)]
    enums: Vec<EnumType>,
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

#[derive(Debug, Deserialize)]
struct TypeDefinition {
    name: String,
    #[serde(default)]
    node: bool,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldSpec {
    Short(String),
    Full {
        #[serde(rename = "type")]
        declared_type: String,
        #[serde(default, rename = "defaultArgs")]
        default_args: Map<String, Value>,
    },
}

/// Reads type definitions into a [`SchemaBuilder`]
pub struct SchemaLoader;

impl SchemaLoader {
    /// Parses definitions from a JSON string
    pub fn parse_str(source: &str) -> SchemaResult<SchemaBuilder> {
        Self::parse("<in-memory>", source)
    }

    /// Reads definitions from a JSON file
    pub fn from_file(path: &Path) -> SchemaResult<SchemaBuilder> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;
        Self::parse(&path.display().to_string(), &content)
    }

    fn parse(origin: &str, source: &str) -> SchemaResult<SchemaBuilder> {
        let defs: TypeDefinitions = serde_json::from_str(source)
            .map_err(|e| SchemaError::malformed(origin, format!("Invalid JSON: {}", e)))?;

        let mut builder = SchemaBuilder::new();
        for e in defs.enums {
            builder = builder.enum_type(e);
        }

        for ty in defs.types {
            let mut def = ObjectTypeDef::new(&ty.name);
            if ty.node {
                def = def.node();
            }
            for (field, spec) in ty.fields {
                let spec: FieldSpec = serde_json::from_value(spec).map_err(|e| {
                    SchemaError::malformed(origin, format!("{}.{}: {}", ty.name, field, e))
                })?;
                let field_def = match spec {
                    FieldSpec::Short(declared) => FieldDef::new(field, declared),
                    FieldSpec::Full {
                        declared_type,
                        default_args,
                    } => FieldDef::new(field, declared_type).with_default_args(default_args),
                };
                def = def.field_def(field_def);
            }
            builder = builder.object_type(def);
        }

        Ok(builder)
    }
}
