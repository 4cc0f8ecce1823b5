//! Configuration file parsing and validation

use crate::config::types::CliConfig;
use crate::error::{ConfigError, ConfigResult};
use std::fs;
use std::path::Path;

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> ConfigResult<CliConfig> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_config(&contents)
}

/// Parse and validate configuration from a string
pub fn parse_config(yaml: &str) -> ConfigResult<CliConfig> {
    let config: CliConfig = serde_yaml::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate a complete configuration
pub fn validate_config(config: &CliConfig) -> ConfigResult<()> {
    if config.prog.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(ConfigError::Invalid("prog must not be empty".to_string()));
    }

    for (group, modules) in config.entry_points.iter() {
        if group.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "entry point group names must not be empty".to_string(),
            ));
        }
        if let Some(bad) = modules.iter().find(|m| !is_module_path(m)) {
            return Err(ConfigError::Invalid(format!(
                "entry point group '{}' has invalid module path '{}'",
                group, bad
            )));
        }
    }

    Ok(())
}

/// Entry points must name modules absolutely: dotted, no empty components
fn is_module_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(|part| !part.trim().is_empty())
}
