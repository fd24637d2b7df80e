//! Filter expression, sort and argument structures
//!
//! Defines the parsed query representation consumed by the compiler.

use serde::Deserialize;
use serde_json::Value;

use super::errors::{CompileError, CompileResult};
use crate::filter::FilterOperator;

/// Key that wraps a nested predicate applied to each list element
pub const ELEM_MATCH: &str = "elemMatch";

/// Operator named in a filter leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Known(FilterOperator),
    /// Forwarded unchanged to the executor
    Other(String),
}

impl Operator {
    pub fn parse(name: &str) -> Self {
        FilterOperator::from_name(name)
            .map(Operator::Known)
            .unwrap_or_else(|| Operator::Other(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            Operator::Known(op) => op.name(),
            Operator::Other(name) => name,
        }
    }
}

/// One entry of a filter expression level
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    /// Nested filter on a named field
    Field { name: String, expr: FilterExpr },
    /// Existential filter over list elements
    ElemMatch(FilterExpr),
    /// Operator leaf
    Operator { op: Operator, value: Value },
}

/// Filter expression tree; entries keep request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpr {
    entries: Vec<FilterEntry>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON filter.
    ///
    /// Object values are nested fields (or `elemMatch`); any other value
    /// makes its key an operator.
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        let Value::Object(map) = value else {
            return Err(CompileError::malformed(format!(
                "filter must be an object, got {}",
                value
            )));
        };

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let entry = match value {
                Value::Object(_) if key == ELEM_MATCH => FilterEntry::ElemMatch(Self::from_json(value)?),
                Value::Object(_) => FilterEntry::Field {
                    name: key.clone(),
                    expr: Self::from_json(value)?,
                },
                _ => FilterEntry::Operator {
                    op: Operator::parse(key),
                    value: value.clone(),
                },
            };
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Adds a nested field filter
    pub fn field(mut self, name: impl Into<String>, expr: FilterExpr) -> Self {
        self.entries.push(FilterEntry::Field {
            name: name.into(),
            expr,
        });
        self
    }

    /// Adds an `elemMatch` wrapper
    pub fn elem_match(mut self, expr: FilterExpr) -> Self {
        self.entries.push(FilterEntry::ElemMatch(expr));
        self
    }

    /// Adds an operator leaf
    pub fn op(mut self, name: &str, value: Value) -> Self {
        self.entries.push(FilterEntry::Operator {
            op: Operator::parse(name),
            value,
        });
        self
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> CompileResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(CompileError::malformed(format!(
                "sort order must be ASC or DESC, got '{}'",
                value
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Dotted field path
    pub path: String,
    pub direction: SortDirection,
}

/// Ordered sort keys.
///
/// Orders align positionally with fields; a field without an order sorts
/// ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Deserialize)]
struct RawSort {
    fields: OneOrMany,
    #[serde(default)]
    order: Option<OneOrMany>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(self, path: impl Into<String>) -> Self {
        self.with(path, SortDirection::Asc)
    }

    pub fn desc(self, path: impl Into<String>) -> Self {
        self.with(path, SortDirection::Desc)
    }

    fn with(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self.fields.push(SortField {
            path: path.into(),
            direction,
        });
        self
    }

    /// Parses `{ fields: [..], order: [..] }`. A bare string is accepted
    /// for either member.
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        let raw: RawSort = serde_json::from_value(value.clone())
            .map_err(|e| CompileError::malformed(format!("invalid sort: {}", e)))?;

        let paths = raw.fields.into_vec();
        let orders = raw.order.map(OneOrMany::into_vec).unwrap_or_default();
        if orders.len() > paths.len() {
            return Err(CompileError::malformed(format!(
                "sort has {} orders for {} fields",
                orders.len(),
                paths.len()
            )));
        }

        let mut fields = Vec::with_capacity(paths.len());
        for (i, path) in paths.into_iter().enumerate() {
            if path.is_empty() {
                return Err(CompileError::malformed("sort field must not be empty"));
            }
            let direction = match orders.get(i) {
                Some(order) => SortDirection::parse(order)?,
                None => SortDirection::Asc,
            };
            fields.push(SortField { path, direction });
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.path.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Projection requested on top of a query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Unique values at a path
    Distinct(String),
    /// Nodes grouped by the value at a path
    Group(String),
}

impl Projection {
    pub fn path(&self) -> &str {
        match self {
            Projection::Distinct(path) | Projection::Group(path) => path,
        }
    }
}

/// Arguments of a collection query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    pub filter: Option<FilterExpr>,
    pub sort: Option<SortSpec>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
struct RawArgs {
    #[serde(default)]
    filter: Option<Value>,
    #[serde(default)]
    sort: Option<Value>,
    #[serde(default)]
    skip: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{ filter?, sort?, skip?, limit? }`; other members are ignored
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        let raw: RawArgs = serde_json::from_value(value.clone())
            .map_err(|e| CompileError::malformed(format!("invalid query arguments: {}", e)))?;

        Ok(Self {
            filter: raw.filter.as_ref().map(FilterExpr::from_json).transpose()?,
            sort: raw.sort.as_ref().map(SortSpec::from_json).transpose()?,
            skip: raw.skip,
            limit: raw.limit,
        })
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
