//! Compiler configuration
//!
//! Loaded from a JSON file; every key is optional:
//!
//! ```json
//! { "max_depth": 32, "default_trigger": "on_blur", "merge_policy": "separate" }
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::Trigger;

/// Upper limit accepted for `max_depth`
pub const MAX_DEPTH_LIMIT: usize = 256;

/// How rules targeting the same field are presented to the UI layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// One rule per constraint, in declaration order
    #[default]
    Separate,
    /// Fold bound rules sharing a trigger and measure into one rule
    CombineBounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Deepest schema nesting accepted before compilation gives up
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Trigger for rules whose constraint does not name one
    #[serde(default)]
    pub default_trigger: Trigger,

    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_max_depth() -> usize {
    32
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            default_trigger: Trigger::default(),
            merge_policy: MergePolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "FORM_CONFIG_ERROR"
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl CompilerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let config: CompilerConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: display.clone(),
                source,
            })?;

        config.validate()?;

        let depth = config.max_depth.to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", display.as_str()), ("max_depth", depth.as_str())],
        );

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be > 0".into()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_depth must be <= {}, got {}",
                MAX_DEPTH_LIMIT, self.max_depth
            )));
        }
        Ok(())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_default_trigger(mut self, trigger: Trigger) -> Self {
        self.default_trigger = trigger;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.default_trigger, Trigger::OnBlur);
        assert_eq!(config.merge_policy, MergePolicy::Separate);
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("formrules.json");
        fs::write(&path, r#"{ "merge_policy": "combine_bounds" }"#).unwrap();

        let config = CompilerConfig::load(&path).unwrap();
        assert_eq!(config.merge_policy, MergePolicy::CombineBounds);
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("formrules.json");
        fs::write(&path, r#"{ "max_depth": 0 }"#).unwrap();

        let err = CompilerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_excessive_depth_rejected() {
        let config = CompilerConfig::default().with_max_depth(MAX_DEPTH_LIMIT + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = CompilerConfig::load(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.code(), "FORM_CONFIG_ERROR");
    }

    #[test]
    fn test_unknown_trigger_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("formrules.json");
        fs::write(&path, r#"{ "default_trigger": "on_hover" }"#).unwrap();
        assert!(matches!(
            CompilerConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
