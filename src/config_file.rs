//! Configuration file handling for perfile

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::Rule;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    ConfigNotFound(PathBuf),
    #[error("unable to parse YAML config file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("unable to serialize config: {0}")]
    Serialize(serde_json::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Configuration for a single action rule, as written in the config file.
///
/// Fields outside the recognized set land in `extra`; they are reported at
/// load time and retained, but nothing ever consults them.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigRule {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_extension: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl From<ConfigRule> for Rule {
    fn from(config: ConfigRule) -> Self {
        Rule {
            command: config.command,
            input_extension: config.input_extension,
            output_extension: config.output_extension,
        }
    }
}

/// Loads and parses a configuration file: an ordered list of rule records,
/// YAML if the file extension says so, JSON otherwise.
///
/// # Errors
///
/// Returns `ConfigError::ConfigNotFound` if the file cannot be read, or
/// `ConfigError::Yaml`/`ConfigError::Json` if parsing fails.
pub fn from_file(file: &Path) -> Result<Vec<ConfigRule>, ConfigError> {
    let contents = std::fs::read_to_string(file)
        .map_err(|_| ConfigError::ConfigNotFound(file.to_path_buf()))?;
    let rules = if file
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
    {
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
            source: e,
            path: file.to_path_buf(),
        })?
    } else {
        serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
            source: e,
            path: file.to_path_buf(),
        })?
    };
    Ok(rules)
}

/// The configuration emitted by `--dump-default`: a single rule that echoes
/// each matched file, with an empty output extension annotation.
#[must_use]
pub fn default_rules() -> Vec<ConfigRule> {
    vec![ConfigRule {
        command: "echo".to_string(),
        input_extension: None,
        output_extension: Some(String::new()),
        extra: HashMap::new(),
    }]
}

/// Serialize the default configuration as pretty-printed JSON.
///
/// # Errors
///
/// Returns `ConfigError::Serialize` if serialization fails.
pub fn dump_default() -> Result<String, ConfigError> {
    serde_json::to_string_pretty(&default_rules()).map_err(ConfigError::Serialize)
}
