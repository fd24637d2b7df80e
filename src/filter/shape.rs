//! Filter shape representation

use serde_json::{json, Map, Value};

use super::operators::FilterOperator;

/// One field of a filter shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeField {
    /// Leaf field (scalar, enum or list of scalars)
    Operators(&'static [FilterOperator]),
    /// Nested object; refers to the shape of the named type
    Object(String),
    /// List of objects; `elemMatch` plus the named type's fields
    ListOfObject(String),
}

/// Derived filter shape of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterShape {
    type_name: String,
    fields: Vec<(String, ShapeField)>,
}

impl FilterShape {
    pub(crate) fn new(type_name: impl Into<String>, fields: Vec<(String, ShapeField)>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Source type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Input name, e.g. `PostFilterInput`
    pub fn name(&self) -> String {
        input_name(&self.type_name)
    }

    pub fn fields(&self) -> &[(String, ShapeField)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Field names exposed when this shape is used for a list of objects
    pub fn list_field_names(&self) -> Vec<&str> {
        std::iter::once("elemMatch").chain(self.field_names()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON description of the shape
    pub fn to_json(&self) -> Value {
        let mut fields = Map::new();
        for (name, field) in &self.fields {
            let described = match field {
                ShapeField::Operators(ops) => {
                    Value::Array(ops.iter().map(|op| json!(op.name())).collect())
                }
                ShapeField::Object(ty) => json!({ "type": input_name(ty) }),
                ShapeField::ListOfObject(ty) => json!({
                    "type": format!("{}FilterListInput", ty),
                    "elemMatch": input_name(ty),
                }),
            };
            fields.insert(name.clone(), described);
        }
        json!({ "name": self.name(), "fields": fields })
    }
}

fn input_name(type_name: &str) -> String {
    format!("{}FilterInput", type_name)
}
