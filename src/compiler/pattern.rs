//! Pattern operators: `/pattern/flags` regular expressions and globs

use std::fmt;

use glob::{MatchOptions, Pattern};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::errors::{CompileError, CompileResult};

/// Compiled `regex` operand
#[derive(Clone)]
pub struct RegexMatcher {
    source: String,
    regex: Regex,
}

impl RegexMatcher {
    /// Parses `/pattern/flags`. A value without enclosing slashes is taken
    /// as a bare pattern.
    pub fn parse(field: &str, value: &Value) -> CompileResult<Self> {
        let Value::String(source) = value else {
            return Err(CompileError::malformed_field(field, "regex operand must be a string"));
        };

        let (pattern, flags) = match source.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
            Some((pattern, flags)) => (pattern, flags),
            None => (source.as_str(), ""),
        };

        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'u' => builder.unicode(true),
                // global matching has no meaning for a boolean test
                'g' => continue,
                other => {
                    return Err(CompileError::malformed_field(
                        field,
                        format!("unsupported regex flag '{}'", other),
                    ))
                }
            };
        }

        let regex = builder
            .build()
            .map_err(|e| CompileError::malformed_field(field, format!("invalid regex: {}", e)))?;

        Ok(Self {
            source: source.clone(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tests the string form of a present value
    pub fn is_match(&self, value: &Value) -> bool {
        string_form(value).is_some_and(|s| self.regex.is_match(&s))
    }
}

impl fmt::Debug for RegexMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegexMatcher({})", self.source)
    }
}

impl PartialEq for RegexMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Compiled `glob` operand
#[derive(Clone)]
pub struct GlobMatcher {
    source: String,
    pattern: Pattern,
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

impl GlobMatcher {
    pub fn parse(field: &str, value: &Value) -> CompileResult<Self> {
        let Value::String(source) = value else {
            return Err(CompileError::malformed_field(field, "glob operand must be a string"));
        };

        let pattern = Pattern::new(source)
            .map_err(|e| CompileError::malformed_field(field, format!("invalid glob: {}", e)))?;

        Ok(Self {
            source: source.clone(),
            pattern,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &Value) -> bool {
        string_form(value).is_some_and(|s| self.pattern.matches_with(&s, GLOB_OPTIONS))
    }
}

impl fmt::Debug for GlobMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobMatcher({})", self.source)
    }
}

impl PartialEq for GlobMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// String a pattern is tested against. Objects have none.
fn string_form(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Option<Vec<String>> = items.iter().map(string_form).collect();
            parts.map(|p| p.join(","))
        }
        Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_regex_with_flags() {
        let re = RegexMatcher::parse("name", &json!("/^the.*wax/i")).unwrap();
        assert!(re.is_match(&json!("The Mad Wax")));
        assert!(!re.is_match(&json!("The Mad Max")));
    }

    #[test]
    fn test_regex_pattern_may_contain_slashes() {
        let re = RegexMatcher::parse("path", &json!("/^/blog/.+/")).unwrap();
        assert!(re.is_match(&json!("/blog/post")));
        assert!(!re.is_match(&json!("/docs/post")));
    }

    #[test]
    fn test_bare_regex() {
        let re = RegexMatcher::parse("name", &json!("Wax$")).unwrap();
        assert!(re.is_match(&json!("The Mad Wax")));
    }

    #[test]
    fn test_regex_on_non_strings() {
        let re = RegexMatcher::parse("n", &json!("/^1,2$/")).unwrap();
        assert!(re.is_match(&json!([1, 2])));
        assert!(!re.is_match(&json!({ "a": 1 })));
    }

    #[test]
    fn test_regex_rejects_bad_input() {
        assert!(RegexMatcher::parse("n", &json!(5)).is_err());
        assert!(RegexMatcher::parse("n", &json!("/a/q")).is_err());
        assert!(RegexMatcher::parse("n", &json!("/(/")).is_err());
    }

    #[test]
    fn test_glob() {
        let glob = GlobMatcher::parse("name", &json!("*Wax")).unwrap();
        assert!(glob.is_match(&json!("The Mad Wax")));
        assert!(!glob.is_match(&json!("The Mad Max")));

        let path = GlobMatcher::parse("path", &json!("blog/*.md")).unwrap();
        assert!(path.is_match(&json!("blog/a.md")));
        assert!(!path.is_match(&json!("blog/nested/a.md")));
    }
}
