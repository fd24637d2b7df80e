//! Engine configuration errors
//!
//! Error codes:
//! - NQ_CONFIG_ERROR (REJECT)

use std::fmt;

use thiserror::Error;

use crate::error::Severity;

/// Configuration error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    NqConfigError,
}

impl ConfigErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigErrorCode::NqConfigError => "NQ_CONFIG_ERROR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Invalid or unreadable engine configuration
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::NqConfigError,
            message: message.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ConfigErrorCode {
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
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
