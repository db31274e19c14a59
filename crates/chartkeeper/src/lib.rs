//! File integrity and format migration for chart recorder installations.
//!
//! Two independent utilities:
//!
//! - [`JobValidator`] checks a job's primary and backup folders and restores
//!   missing job files from the backup copy, recording every action in the
//!   job's repair log.
//! - [`ConversionPlan`] migrates settings files between text formats in a
//!   verified, restartable batch, with [`Utf16LeToUtf8Converter`] handling the
//!   legacy UTF-16LE files.

pub mod config;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod ini;
pub mod job;
pub mod logfile;
pub mod notify;
pub mod storage;

pub use config::{load_config, Config};
pub use convert::{
    convert_job_files, ConversionPlan, ConversionReport, FileConverter, FormatConverter,
    Utf16LeToUtf8Converter,
};
pub use encoding::TextFormat;
pub use error::{ChartError, ConfigError, ConvertError, DecodeError, IniError, Result, StorageError};
pub use ini::IniFile;
pub use job::{JobLocation, JobValidator, ValidationReport, ValidationStatus};
pub use logfile::LogFile;
pub use notify::{ChannelNotifier, ConfigSelector, LogNotifier, NoopNotifier, Notifier};
