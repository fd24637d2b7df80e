//! Query operators and per-kind operator sets

use std::fmt;

use crate::schema::{LeafType, ScalarType};

/// Filter operators accepted on leaf fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Regex,
    Glob,
}

impl FilterOperator {
    /// Returns the operator name as written in filters
    pub fn name(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::Nin => "nin",
            FilterOperator::Regex => "regex",
            FilterOperator::Glob => "glob",
        }
    }

    /// Parses an operator name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(FilterOperator::Eq),
            "ne" => Some(FilterOperator::Ne),
            "gt" => Some(FilterOperator::Gt),
            "gte" => Some(FilterOperator::Gte),
            "lt" => Some(FilterOperator::Lt),
            "lte" => Some(FilterOperator::Lte),
            "in" => Some(FilterOperator::In),
            "nin" => Some(FilterOperator::Nin),
            "regex" => Some(FilterOperator::Regex),
            "glob" => Some(FilterOperator::Glob),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const EQUALITY: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::In,
    FilterOperator::Nin,
];

const STRING: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::In,
    FilterOperator::Nin,
    FilterOperator::Regex,
    FilterOperator::Glob,
];

const ORDERED: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::Gt,
    FilterOperator::Gte,
    FilterOperator::Lt,
    FilterOperator::Lte,
    FilterOperator::In,
    FilterOperator::Nin,
];

/// Operator set for a leaf type. Empty for opaque JSON.
pub fn operators_for(leaf: &LeafType) -> &'static [FilterOperator] {
    match leaf {
        LeafType::Enum(_) => EQUALITY,
        LeafType::Scalar(scalar) => match scalar {
            ScalarType::Id | ScalarType::Boolean => EQUALITY,
            ScalarType::String => STRING,
            ScalarType::Int | ScalarType::Float | ScalarType::Date => ORDERED,
            ScalarType::Json => &[],
        },
    }
}
