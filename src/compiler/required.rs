//! Required-field sets
//!
//! Describes which fields a query needs present on result nodes, merged from
//! the filter, the sort and any projections. Used as a cache key, so entries
//! keep a deterministic (request) order.

use std::fmt;

use super::ast::{FilterEntry, FilterExpr, Projection, SortSpec};

/// Requirement on one field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// Field value as a whole
    Leaf,
    /// Only the listed sub-fields
    Nested(RequiredFields),
}

/// Ordered set of required fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequiredFields {
    fields: Vec<(String, RequiredField)>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields named by a filter; `elemMatch` levels fold into the field
    /// bearing them.
    pub fn from_filter(filter: &FilterExpr) -> Self {
        let mut required = Self::new();
        required.collect_filter(filter);
        required
    }

    /// Merged requirements of a whole query
    pub fn for_query(filter: Option<&FilterExpr>, sort: Option<&SortSpec>, projections: &[Projection]) -> Self {
        let mut required = filter.map(Self::from_filter).unwrap_or_default();
        if let Some(sort) = sort {
            for path in sort.paths() {
                required.add_path(path);
            }
        }
        for projection in projections {
            required.add_path(projection.path());
        }
        required
    }

    fn collect_filter(&mut self, filter: &FilterExpr) {
        for entry in filter.entries() {
            match entry {
                FilterEntry::Field { name, expr } => {
                    let mut nested = Self::new();
                    nested.collect_filter(expr);
                    let field = if nested.is_empty() {
                        RequiredField::Leaf
                    } else {
                        RequiredField::Nested(nested)
                    };
                    self.insert(name, field);
                }
                FilterEntry::ElemMatch(inner) => self.collect_filter(inner),
                FilterEntry::Operator { .. } => {}
            }
        }
    }

    /// Adds a dotted path, creating nested levels as needed
    pub fn add_path(&mut self, path: &str) {
        match path.split_once('.') {
            None => self.insert(path, RequiredField::Leaf),
            Some((head, rest)) => {
                let mut nested = Self::new();
                nested.add_path(rest);
                self.insert(head, RequiredField::Nested(nested));
            }
        }
    }

    /// Merges another set into this one
    pub fn merge(&mut self, other: &RequiredFields) {
        for (name, field) in &other.fields {
            self.insert(name, field.clone());
        }
    }

    fn insert(&mut self, name: &str, field: RequiredField) {
        let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name).map(|(_, f)| f) else {
            self.fields.push((name.to_string(), field));
            return;
        };

        match field {
            RequiredField::Leaf => {}
            RequiredField::Nested(incoming) => match slot {
                RequiredField::Nested(existing) => existing.merge(&incoming),
                RequiredField::Leaf => *slot = RequiredField::Nested(incoming),
            },
        }
    }

    pub fn fields(&self) -> &[(String, RequiredField)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&RequiredField> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for RequiredFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, field)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", name)?;
            if let RequiredField::Nested(nested) = field {
                write!(f, "{}", nested)?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_drops_operators_and_elem_match() {
        let filter = FilterExpr::from_json(&json!({
            "hair": { "lt": 2 },
            "data": { "tags": { "elemMatch": { "tag": { "document": { "elemMatch": { "number": { "lt": 4 } } } } } } }
        }))
        .unwrap();

        let required = RequiredFields::from_filter(&filter);
        assert_eq!(required.to_string(), "{hair,data{tags{tag{document{number}}}}}");
    }

    #[test]
    fn test_query_merges_sort_and_projection() {
        let filter = FilterExpr::from_json(&json!({ "frontmatter": { "title": { "eq": "x" } } })).unwrap();
        let sort = SortSpec::new().desc("frontmatter.blue").asc("id");
        let required = RequiredFields::for_query(
            Some(&filter),
            Some(&sort),
            &[Projection::Distinct("frontmatter.tags".into())],
        );

        assert_eq!(required.to_string(), "{frontmatter{title,blue,tags},id}");
    }

    #[test]
    fn test_nested_wins_over_leaf() {
        let mut required = RequiredFields::new();
        required.add_path("author");
        required.add_path("author.name");
        required.add_path("author");
        assert_eq!(required.to_string(), "{author{name}}");
    }

    #[test]
    fn test_equal_sets_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |r: &RequiredFields| {
            let mut h = DefaultHasher::new();
            r.hash(&mut h);
            h.finish()
        };

        let mut a = RequiredFields::new();
        a.add_path("x.y");
        let mut b = RequiredFields::new();
        b.add_path("x.y");
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }
}
