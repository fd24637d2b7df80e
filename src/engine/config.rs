//! Engine configuration
//!
//! Every field has a default, so `{}` is a valid configuration file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigResult};
use crate::index::DEFAULT_INDEX_THRESHOLD;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Uses of a path before it is indexed (default: 5)
    #[serde(default = "default_index_threshold")]
    pub index_threshold: u64,

    /// Entries an index may hold before its build fails (default: 1_000_000)
    #[serde(default = "default_max_index_entries")]
    pub max_index_entries: usize,

    /// Production deployments serve whole-query results from cache in
    /// every build phase (default: false)
    #[serde(default)]
    pub production: bool,

    /// Per-node resolution cache (default: true)
    #[serde(default = "default_enabled")]
    pub node_cache_enabled: bool,

    /// Whole-query resolution cache (default: true)
    #[serde(default = "default_enabled")]
    pub query_cache_enabled: bool,
}

fn default_index_threshold() -> u64 {
    DEFAULT_INDEX_THRESHOLD
}

fn default_max_index_entries() -> usize {
    1_000_000
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_threshold: default_index_threshold(),
            max_index_entries: default_max_index_entries(),
            production: false,
            node_cache_enabled: true,
            query_cache_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::invalid(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse_str(&content)
    }

    /// Parse configuration from JSON text
    pub fn parse_str(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)
            .map_err(|e| ConfigError::invalid(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.index_threshold == 0 {
            return Err(ConfigError::invalid("index_threshold must be > 0"));
        }
        if self.max_index_entries == 0 {
            return Err(ConfigError::invalid("max_index_entries must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.index_threshold, 5);
        assert_eq!(config.max_index_entries, 1_000_000);
        assert!(!config.production);
        assert!(config.node_cache_enabled && config.query_cache_enabled);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(EngineConfig::parse_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "index_threshold": 2, "production": true }}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.index_threshold, 2);
        assert!(config.production);
        assert_eq!(config.max_index_entries, 1_000_000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = EngineConfig::parse_str(r#"{ "index_threshold": 0 }"#).unwrap_err();
        assert_eq!(err.code().code(), "NQ_CONFIG_ERROR");
        assert!(EngineConfig::parse_str(r#"{ "threshold": 3 }"#).is_err());
        assert!(EngineConfig::from_file(Path::new("/nonexistent/engine.json")).is_err());
    }
}
