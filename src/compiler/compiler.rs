//! Filter compiler
//!
//! Translates a filter expression into a flat [`CompiledPredicate`]. Leaf
//! translation rules, first match wins:
//!
//! 1. `glob` compiles to a glob matcher
//! 2. `regex` compiles to a matcher that never matches an absent field
//! 3. `eq: null` matches null or absent
//! 4. `ne: null` matches present and not null
//! 5. `eq` on a list field matches lists holding the value
//! 6. `ne` on a list field matches lists not holding the value
//! 7. `in` on a list field matches lists sharing an element with the set
//! 8. `nin` on a list field matches lists sharing no element with the set
//! 9. `nin` on a boolean field also rejects absent values
//! 10. anything else passes through unchanged
//!
//! Known operators must belong to the field's operator set; fields without
//! one (objects, JSON) take no operators at all.
//!
//! Nested fields flatten to dotted paths, except below `elemMatch`, whose
//! nested filter stays a predicate of its own. A final pass turns every
//! `ne: true` into a presence-aware "not true" check.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::ast::{FilterEntry, FilterExpr, Operator, SortSpec};
use super::errors::{CompileError, CompileResult};
use super::pattern::{GlobMatcher, RegexMatcher};
use super::predicate::{CompiledPredicate, PrimitiveOp};
use crate::filter::{operators_for, FilterOperator};
use crate::schema::{FieldDescriptor, FieldKind, ObjectType, TypeRegistry};

/// Compiles filter expressions against the type registry
pub struct FilterCompiler {
    registry: Arc<dyn TypeRegistry>,
}

impl FilterCompiler {
    pub fn new(registry: Arc<dyn TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Compiles a filter for the given type.
    ///
    /// Pure with respect to the registry: type metadata is only read.
    pub fn compile(&self, filter: &FilterExpr, type_name: &str) -> CompileResult<CompiledPredicate> {
        let ty = self.object_type(type_name)?;

        let mut predicate = CompiledPredicate::new();
        self.compile_object(filter, &ty, "", &mut predicate)?;
        predicate.rewrite_ne_true();

        debug!(type_name, paths = ?predicate.paths(), "compiled filter");
        Ok(predicate)
    }

    /// Validates that every sort path names declared fields
    pub fn check_sort(&self, sort: &SortSpec, type_name: &str) -> CompileResult<()> {
        for path in sort.paths() {
            self.resolve_path(type_name, path)?;
        }
        Ok(())
    }

    /// Resolves a dotted path to the kind of its last field.
    ///
    /// Intermediate segments must be objects or lists of objects.
    pub fn resolve_path(&self, type_name: &str, path: &str) -> CompileResult<FieldKind> {
        let mut ty = self.object_type(type_name)?;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let field = ty
                .field(segment)
                .ok_or_else(|| CompileError::unknown_field(type_name, path))?;
            let kind = field.kind().clone();

            if segments.peek().is_none() {
                return Ok(kind);
            }

            let nested = kind.object_type().ok_or_else(|| {
                CompileError::schema_mismatch(path, format!("'{}' has no nested fields", segment))
            })?;
            ty = self.object_type(nested)?;
        }

        Err(CompileError::malformed(format!("empty field path on {}", type_name)))
    }

    fn object_type(&self, type_name: &str) -> CompileResult<Arc<ObjectType>> {
        self.registry
            .object_type(type_name)
            .ok_or_else(|| CompileError::unknown_type(type_name))
    }

    /// Compiles one object level; `prefix` is the dotted path of the object
    fn compile_object(
        &self,
        expr: &FilterExpr,
        ty: &ObjectType,
        prefix: &str,
        out: &mut CompiledPredicate,
    ) -> CompileResult<()> {
        for entry in expr.entries() {
            match entry {
                FilterEntry::Field { name, expr } => {
                    let path = join(prefix, name);
                    let field = ty
                        .field(name)
                        .ok_or_else(|| CompileError::unknown_field(ty.name(), &path))?;
                    self.compile_field(expr, field, &path, out)?;
                }
                FilterEntry::ElemMatch(_) => {
                    return Err(CompileError::schema_mismatch(
                        if prefix.is_empty() { ty.name() } else { prefix },
                        "elemMatch requires a list of objects",
                    ));
                }
                FilterEntry::Operator { op, .. } => {
                    return Err(CompileError::malformed(format!(
                        "operator '{}' must be applied to a field of {}",
                        op.name(),
                        ty.name()
                    )));
                }
            }
        }
        Ok(())
    }

    fn compile_field(
        &self,
        expr: &FilterExpr,
        field: &FieldDescriptor,
        path: &str,
        out: &mut CompiledPredicate,
    ) -> CompileResult<()> {
        for entry in expr.entries() {
            match entry {
                FilterEntry::Operator { op, value } => {
                    out.push_op(path, translate(op, value, field, path)?);
                }
                FilterEntry::ElemMatch(inner) => {
                    let FieldKind::ListOfObject(element) = field.kind() else {
                        return Err(CompileError::schema_mismatch(
                            path,
                            format!("elemMatch requires a list of objects, found {}", field.declared_type()),
                        ));
                    };
                    let element_type = self.object_type(element)?;

                    let mut nested = CompiledPredicate::new();
                    self.compile_object(inner, &element_type, "", &mut nested)?;
                    out.push_elem_match(path, nested);
                }
                FilterEntry::Field { name, expr } => {
                    let Some(nested_type) = field.kind().object_type() else {
                        return Err(CompileError::schema_mismatch(
                            path,
                            format!("{} has no nested field '{}'", field.declared_type(), name),
                        ));
                    };
                    let nested_type = self.object_type(nested_type)?;
                    let child_path = join(path, name);
                    let child = nested_type
                        .field(name)
                        .ok_or_else(|| CompileError::unknown_field(nested_type.name(), &child_path))?;
                    self.compile_field(expr, child, &child_path, out)?;
                }
            }
        }
        Ok(())
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn translate(op: &Operator, value: &Value, field: &FieldDescriptor, path: &str) -> CompileResult<PrimitiveOp> {
    let kind = field.kind();
    let allowed = kind.leaf().map(|leaf| operators_for(&leaf)).unwrap_or(&[]);
    if allowed.is_empty() {
        return Err(CompileError::schema_mismatch(
            path,
            format!("{} accepts no filter operators, found '{}'", field.declared_type(), op.name()),
        ));
    }

    let Operator::Known(known) = op else {
        return Ok(PrimitiveOp::Unknown {
            op: op.name().to_string(),
            value: value.clone(),
        });
    };
    if !allowed.contains(known) {
        return Err(CompileError::schema_mismatch(
            path,
            format!("operator '{}' is not supported on {}", known, field.declared_type()),
        ));
    }

    let list = kind.is_list();
    let translated = match known {
        FilterOperator::Glob => PrimitiveOp::Glob(GlobMatcher::parse(path, value)?),
        FilterOperator::Regex => PrimitiveOp::Regex(RegexMatcher::parse(path, value)?),
        FilterOperator::Eq if value.is_null() => PrimitiveOp::Missing,
        FilterOperator::Ne if value.is_null() => PrimitiveOp::Present,
        FilterOperator::Eq if list => PrimitiveOp::Contains(value.clone()),
        FilterOperator::Ne if list => PrimitiveOp::ContainsNone(vec![value.clone()]),
        FilterOperator::In if list => PrimitiveOp::ContainsAny(value_set(value, path, known)?),
        FilterOperator::Nin if list => PrimitiveOp::ContainsNone(value_set(value, path, known)?),
        FilterOperator::Nin => PrimitiveOp::Nin {
            values: value_set(value, path, known)?,
            exclude_absent: kind.is_boolean(),
        },
        FilterOperator::In => PrimitiveOp::In(value_set(value, path, known)?),
        FilterOperator::Eq => PrimitiveOp::Eq(value.clone()),
        FilterOperator::Ne => PrimitiveOp::Ne(value.clone()),
        FilterOperator::Lt => PrimitiveOp::Lt(value.clone()),
        FilterOperator::Lte => PrimitiveOp::Lte(value.clone()),
        FilterOperator::Gt => PrimitiveOp::Gt(value.clone()),
        FilterOperator::Gte => PrimitiveOp::Gte(value.clone()),
    };
    Ok(translated)
}

fn value_set(value: &Value, path: &str, op: &FilterOperator) -> CompileResult<Vec<Value>> {
    match value {
        Value::Array(values) => Ok(values.clone()),
        _ => Err(CompileError::malformed_field(
            path,
            format!("'{}' expects a list of values", op),
        )),
    }
}
