//! Core implementation of the perfile action runner
//!
//! Perfile applies a configured sequence of external-command actions to the
//! files of a directory. Each rule names a command template and an input
//! extension filter; for every matching file the template's placeholders
//! (`${filename}`, `${filepath}`) are expanded and the resulting command is
//! executed, with per-file outcomes collected into a final report.

use std::path::Path;

use log::{info, warn};

use crate::config_file::ConfigError;
use crate::rules::{Rule, RuleSet};

pub mod config_file;
pub mod dispatch;
pub mod matcher;
pub mod report;
pub mod rules;
pub mod substitute;

/// Load, sanitize, and validate the rule list from a config file.
///
/// Unknown fields are warned about and ignored; missing optional fields are
/// fine. The fully parsed configuration is logged before conversion so a
/// run's input is always auditable.
///
/// # Errors
///
/// Returns `ConfigError` if the config file cannot be read or parsed, or if
/// a rule has an empty command.
pub fn load_rules(path: &Path) -> Result<RuleSet, ConfigError> {
    let parsed = config_file::from_file(path)?;

    for (index, rule) in parsed.iter().enumerate() {
        for field in rule.extra.keys() {
            warn!("rule #{index}: unknown field `{field}` will not be applied");
        }
        if rule.command.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "rule #{index} has an empty command"
            )));
        }
    }

    info!("using config: {parsed:?}");
    Ok(RuleSet {
        rules: parsed.into_iter().map(Rule::from).collect(),
    })
}
