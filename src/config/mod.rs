//! Configuration module for cleanser.
//!
//! The tool is configured via a JSON file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```json
//! {
//!   "directories": [
//!     { "directory": "/var/log/app/", "period": 7 },
//!     { "directory": "${EXPORT_DIR}", "period": 1 }
//!   ],
//!   "dry_run": false,
//!   "logging": { "level": "info", "format": "compact" }
//! }
//! ```

mod observability;
mod retention;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub use observability::*;
use regex::Regex;
pub use retention::*;
use serde::{Deserialize, Serialize};

/// The only configuration document extension the loader accepts.
pub const CONFIG_EXTENSION: &str = "json";

static ENV_VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Root configuration for cleanser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanserConfig {
    /// Monitored directories and their retention periods.
    pub directories: Vec<RetentionRule>,

    /// If true, log what would be deleted without deleting anything.
    #[serde(default)]
    pub dry_run: bool,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CleanserConfig {
    /// Load configuration from a JSON file.
    ///
    /// The file must carry a `.json` extension. Environment variables in the
    /// format `${VAR_NAME}` are expanded before parsing.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if path.extension().and_then(|ext| ext.to_str()) != Some(CONFIG_EXTENSION) {
            return Err(ConfigError::UnsupportedFormat(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e, path.to_path_buf())
            }
        })?;

        let config = Self::from_str(&contents)?;

        tracing::debug!(
            config_file = %path.display(),
            rules = config.directories.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Parse configuration from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: CleanserConfig = serde_json::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every retention rule.
    fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.directories {
            rule.validate().map_err(ConfigError::Validation)?;
        }
        Ok(())
    }
}

/// Configuration errors.
///
/// Every variant is fatal: the run aborts before any scan or deletion.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported config file format {0}: expected a .json file")]
    UnsupportedFormat(PathBuf),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR_NAME}` references with values from the environment.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for cap in ENV_VAR_REGEX.captures_iter(input) {
        let Some(whole) = cap.get(0) else {
            continue;
        };

        result.push_str(&input[last_end..whole.start()]);

        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result.push_str(&value);

        last_end = whole.end();
    }

    result.push_str(&input[last_end..]);
    Ok(result)
}
