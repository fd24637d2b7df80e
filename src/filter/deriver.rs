//! Memoized filter shape derivation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::schema::{FieldKind, SchemaError, SchemaErrorCode, SchemaResult, TypeRegistry};

use super::operators::operators_for;
use super::shape::{FilterShape, ShapeField};

/// Derives and memoizes filter shapes per type
pub struct FilterShapeDeriver {
    registry: Arc<dyn TypeRegistry>,
    cache: Mutex<HashMap<String, Arc<FilterShape>>>,
    derivations: AtomicU64,
}

impl FilterShapeDeriver {
    pub fn new(registry: Arc<dyn TypeRegistry>) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
            derivations: AtomicU64::new(0),
        }
    }

    /// Returns the filter shape of a type, deriving it on first use.
    ///
    /// The cache lock is held for the whole derivation so each type is
    /// derived at most once.
    pub fn derive(&self, type_name: &str) -> SchemaResult<Arc<FilterShape>> {
        let mut cache = self.cache.lock();
        if let Some(shape) = cache.get(type_name) {
            return Ok(shape.clone());
        }

        let mut stack = Vec::new();
        self.derive_into(type_name, &mut stack, &mut cache)
    }

    /// Number of shapes computed so far
    pub fn derivations(&self) -> u64 {
        self.derivations.load(Ordering::Relaxed)
    }

    fn derive_into(
        &self,
        type_name: &str,
        stack: &mut Vec<String>,
        cache: &mut HashMap<String, Arc<FilterShape>>,
    ) -> SchemaResult<Arc<FilterShape>> {
        if let Some(shape) = cache.get(type_name) {
            return Ok(shape.clone());
        }

        let ty = self
            .registry
            .object_type(type_name)
            .ok_or_else(|| SchemaError::unknown_type(type_name))?;

        stack.push(type_name.to_string());

        let mut fields = Vec::new();
        for field in ty.fields() {
            let shaped = match field.kind() {
                FieldKind::Scalar(_) | FieldKind::Enum(_) | FieldKind::ListOfScalar(_) => {
                    let ops = field.kind().leaf().map(|leaf| operators_for(&leaf)).unwrap_or(&[]);
                    (!ops.is_empty()).then_some(ShapeField::Operators(ops))
                }
                FieldKind::Object(nested) | FieldKind::ListOfObject(nested) => {
                    let keep = if stack.iter().any(|t| t == nested) {
                        // still being derived further up; cycles keep the reference
                        true
                    } else {
                        let shape = self.derive_into(nested, stack, cache).map_err(|e| {
                            if e.code() == SchemaErrorCode::NqUnknownType {
                                SchemaError::unknown_field(type_name, field.name())
                            } else {
                                e
                            }
                        })?;
                        !shape.is_empty()
                    };

                    keep.then(|| match field.kind() {
                        FieldKind::ListOfObject(_) => ShapeField::ListOfObject(nested.clone()),
                        _ => ShapeField::Object(nested.clone()),
                    })
                }
            };

            if let Some(shaped) = shaped {
                fields.push((field.name().to_string(), shaped));
            }
        }

        stack.pop();

        let shape = Arc::new(FilterShape::new(type_name, fields));
        self.derivations.fetch_add(1, Ordering::Relaxed);
        debug!(type_name, fields = shape.fields().len(), "derived filter shape");
        cache.insert(type_name.to_string(), shape.clone());
        Ok(shape)
    }
}
