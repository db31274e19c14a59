use std::path::{Path, PathBuf};

use log::debug;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub const CONFIG_FILE_NAME: &str = "config.json";

/// `<platform config dir>/chartkeeper/config.json`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chartkeeper").join(CONFIG_FILE_NAME))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Loading configuration from {}", path.display());
    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let conversion = &config.conversion;
    if conversion.temp_suffix.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "Conversion temp_suffix must not be blank".to_string(),
        });
    }

    let mut seen = std::collections::HashSet::new();
    for target in &conversion.targets {
        let extension = target.extension.trim();
        if extension.is_empty() || extension.starts_with('.') {
            return Err(ConfigError::InvalidTarget {
                path: target.directory.clone(),
                reason: format!(
                    "Extension '{}' must be non-empty and given without a leading dot",
                    target.extension
                ),
            });
        }

        if !seen.insert((target.directory.as_str(), extension.to_lowercase())) {
            return Err(ConfigError::InvalidTarget {
                path: target.directory.clone(),
                reason: format!("Duplicate target for extension '{}'", extension),
            });
        }
    }

    Ok(())
}
