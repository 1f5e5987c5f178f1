//! Configuration types for the session mirror.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Error;

/// Mirror configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MirrorConfig {
    /// Session mirror settings
    pub mirror: MirrorSettings,
    /// Completion resolver settings
    pub completion: CompletionSettings,
}

impl MirrorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: MirrorConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.mirror.global_expression.trim().is_empty() {
            return Err(Error::Config(
                "mirror.global_expression cannot be empty".to_string(),
            ));
        }

        if self.completion.timeout_ms == 0 {
            return Err(Error::Config(
                "completion.timeout_ms must be > 0".to_string(),
            ));
        }

        if self.completion.result_ceiling == 0 {
            return Err(Error::Config(
                "completion.result_ceiling must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Session mirror settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    /// Expression evaluating to the session's global environment
    pub global_expression: String,
    /// Display name attached to the global environment descriptor
    pub global_display_name: String,
    /// Maximum length of the string representation requested per value
    pub representation_max_length: usize,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            global_expression: "base::environment()".to_string(),
            global_display_name: "Global Environment".to_string(),
            representation_max_length: 100,
        }
    }
}

/// Completion resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Hard wait bound on the nested "describe children" call, in milliseconds
    pub timeout_ms: u64,
    /// Maximum number of children requested from the remote side
    pub result_ceiling: usize,
    /// Member count reported for any non-empty path
    pub nested_member_count: usize,
}

impl CompletionSettings {
    /// Wait bound as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            result_ceiling: 100,
            nested_member_count: 100,
        }
    }
}
