use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Ini file error: {0}")]
    Ini(#[from] IniError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid conversion target '{path}': {reason}")]
    InvalidTarget { path: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy file from '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file '{path}': {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete '{path}': {source}")]
    DeleteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename '{from}' to '{to}': {source}")]
    RenameFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single file's convert or compare step.
///
/// The display strings are what ends up in the conversion log.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Conversion fail - IO error for old or new file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Conversion fail - '{path}' is not valid text: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Compare fail - old file is not a normal file.")]
    OldNotRegularFile,

    #[error("Compare fail - temp file is not a normal file.")]
    TempNotRegularFile,

    #[error("Compare fail - old file is not in {format} format.")]
    NotLegacyFormat { format: &'static str },

    #[error("Compare fail - temp file is shorter.")]
    TempShorter,

    #[error("Compare fail - temp file is longer.")]
    TempLonger,

    #[error("Compare fail - lines don't match at line {line}.")]
    LineMismatch { line: usize },

    #[error("Compare fail - last lines don't match.")]
    LastLineMismatch,
}

impl ConvertError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Bytes that do not form valid text in the expected format.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid {format} data at byte {offset}")]
pub struct DecodeError {
    pub format: &'static str,
    pub offset: usize,
}

#[derive(Error, Debug)]
pub enum IniError {
    #[error("Failed to read ini file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save ini file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown text format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
