//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Backing content file settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            content: ContentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ),
            });
        }
        Ok(())
    }
}

/// Locations of the backing content files.
///
/// Relative paths are resolved against the server's working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Path to the best-practices instructions markdown.
    #[serde(default = "default_instructions_path")]
    pub instructions_path: PathBuf,

    /// Path to the design-library documentation markdown.
    #[serde(default = "default_documentation_path")]
    pub documentation_path: PathBuf,

    /// Path to the design JSON snapshot.
    #[serde(default = "default_design_snapshot_path")]
    pub design_snapshot_path: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            instructions_path: default_instructions_path(),
            documentation_path: default_documentation_path(),
            design_snapshot_path: default_design_snapshot_path(),
        }
    }
}

fn default_instructions_path() -> PathBuf {
    PathBuf::from("./docs/instructions.md")
}

fn default_documentation_path() -> PathBuf {
    PathBuf::from("./docs/glide-documentation.md")
}

fn default_design_snapshot_path() -> PathBuf {
    PathBuf::from("./design.json")
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
