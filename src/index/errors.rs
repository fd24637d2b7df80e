//! Index error types
//!
//! Error codes:
//! - NQ_INDEX_BUILD_FAILED (WARN)
//!
//! Index failures never fail a query; the query proceeds unindexed.

use std::fmt;

use thiserror::Error;

use crate::error::Severity;

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Index build abandoned
    NqIndexBuildFailed,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::NqIndexBuildFailed => "NQ_INDEX_BUILD_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Warn
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
    /// Dotted path of the index
    path: String,
}

impl IndexError {
    /// Create an index build failed error
    pub fn build_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            code: IndexErrorCode::NqIndexBuildFailed,
            message: format!("Index on '{}' not built: {}", path, reason.into()),
            path,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the indexed path
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_is_warning() {
        let err = IndexError::build_failed("frontmatter.blue", "too many entries");
        assert_eq!(err.code().code(), "NQ_INDEX_BUILD_FAILED");
        assert_eq!(err.severity(), Severity::Warn);
        assert_eq!(err.path(), "frontmatter.blue");

        let display = err.to_string();
        assert!(display.contains("WARN"));
        assert!(display.contains("too many entries"));
    }
}
