use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::convert::utf16le::{DEFAULT_FLAG_FILE, DEFAULT_LOG_FILE, DEFAULT_TARGETS, DEFAULT_TEMP_SUFFIX};
use crate::convert::{ConversionPlan, ConversionTarget};
use crate::job::{JobLocation, DEFAULT_JOB_INFO_CONFIG};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub primary_data_path: String,
    pub backup_data_path: String,
    #[serde(default = "default_job_info_config")]
    pub default_job_info_config: String,
    #[serde(default)]
    pub conversion: ConversionConfig,
}

fn default_job_info_config() -> String {
    DEFAULT_JOB_INFO_CONFIG.to_string()
}

impl Config {
    pub fn job_location(&self, job_name: &str) -> JobLocation {
        JobLocation::new(&self.primary_data_path, &self.backup_data_path, job_name)
    }
}

/// Settings for the legacy settings-file migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default = "default_base_directory")]
    pub base_directory: String,
    #[serde(default = "default_temp_suffix")]
    pub temp_suffix: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// `null` disables the flag, so the migration runs on every start.
    #[serde(default = "default_flag_file")]
    pub flag_file: Option<String>,
    #[serde(default = "default_targets")]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub directory: String,
    pub extension: String,
}

fn default_base_directory() -> String {
    ".".to_string()
}

fn default_temp_suffix() -> String {
    DEFAULT_TEMP_SUFFIX.to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

fn default_flag_file() -> Option<String> {
    Some(DEFAULT_FLAG_FILE.to_string())
}

fn default_targets() -> Vec<TargetConfig> {
    DEFAULT_TARGETS
        .iter()
        .map(|(directory, extension)| TargetConfig {
            directory: directory.to_string(),
            extension: extension.to_string(),
        })
        .collect()
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            temp_suffix: default_temp_suffix(),
            log_file: default_log_file(),
            flag_file: default_flag_file(),
            targets: default_targets(),
        }
    }
}

impl ConversionConfig {
    pub fn to_plan(&self) -> ConversionPlan {
        ConversionPlan {
            base_dir: PathBuf::from(&self.base_directory),
            targets: self
                .targets
                .iter()
                .map(|t| ConversionTarget::new(&t.directory, t.extension.as_str()))
                .collect(),
            temp_suffix: self.temp_suffix.clone(),
            log_file: PathBuf::from(&self.log_file),
            flag_file: self.flag_file.as_ref().map(PathBuf::from),
        }
    }
}
