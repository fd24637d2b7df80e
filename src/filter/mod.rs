//! Filter schema deriver
//!
//! Derives, per content type, the filter shape describing which operators
//! are legal on which fields.
//!
//! # Derivation Rules
//!
//! 1. Scalar and enum fields map to their operator set
//! 2. List-of-scalar fields map to the element's operator set
//! 3. Object fields map to the nested type's shape
//! 4. List-of-object fields expose `elemMatch` plus the nested fields
//! 5. Fields without operators (JSON, empty nested shapes) are omitted
//!
//! Shapes are memoized per type for the lifetime of the deriver and never
//! touch the source type descriptors.

mod deriver;
mod operators;
mod shape;

pub use deriver::FilterShapeDeriver;
pub use operators::{operators_for, FilterOperator};
pub use shape::{FilterShape, ShapeField};
