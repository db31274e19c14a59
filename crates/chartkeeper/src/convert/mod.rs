//! Batch conversion of settings files between text formats.
//!
//! A [`ConversionPlan`] drives the batch: it converts every matching file to a
//! temp file next to it, verifies each temp file against its original, then
//! swaps them. The per-file work is done by a [`FileConverter`].

pub mod format;
pub mod plan;
pub mod scan;
pub mod utf16le;

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use crate::encoding::{self, TextFormat, LINE_SEPARATOR};
use crate::error::ConvertError;

pub use format::{convert_job_files, FormatConverter};
pub use plan::{ConversionPlan, ConversionRecord, ConversionReport, ConversionTarget, Step, StepResult};
pub use utf16le::Utf16LeToUtf8Converter;

/// Folder holding the application's configuration files.
pub const CONFIGURATIONS_DIR: &str = "configurations";

/// Section after which converters record the new format of configuration files.
pub const MAIN_CONFIGURATION_TAG: &str = "[Main Configuration]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// A temp file was written.
    Converted,
    /// The file does not need converting; no temp file was written.
    Skipped,
}

/// Which half of an old/temp pair was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    OldFile,
    TempFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    Identical,
    /// Nothing to compare. The commit step still runs so that an orphaned temp
    /// file takes the place of its deleted original.
    Ignored(Missing),
}

/// Per-file hooks used by [`ConversionPlan::run`].
///
/// Neither method may touch `old`; replacing it is the plan's job.
pub trait FileConverter {
    /// Writes the converted form of `old` to `temp`.
    fn convert_file(&self, old: &Path, temp: &Path) -> Result<ConvertOutcome, ConvertError>;

    /// Checks that `temp` holds the same content as `old`.
    fn compare_file(&self, old: &Path, temp: &Path) -> Result<CompareOutcome, ConvertError>;
}

/// True for `*config` files inside a `configurations` folder. These get a
/// `Job File Format` entry when converted.
pub fn is_configuration_file(path: &Path) -> bool {
    let in_configurations = path
        .parent()
        .map(|dir| {
            dir.components()
                .any(|c| matches!(c, Component::Normal(name) if name == OsStr::new(CONFIGURATIONS_DIR)))
        })
        .unwrap_or(false);

    in_configurations
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with("config"))
            .unwrap_or(false)
}

/// The line recording a file's format in its `[Main Configuration]` section.
pub(crate) fn format_entry(format: TextFormat) -> String {
    format!("{}={}", crate::job::JOB_FILE_FORMAT_KEY, format.name())
}

/// Returns `<old><suffix>` in the same folder as `old`.
pub fn temp_path_for(old: &Path, suffix: &str) -> PathBuf {
    let mut name = old.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    old.with_file_name(name)
}

/// Existence and file-type checks shared by every converter's compare step.
///
/// Returns `Some` when there is nothing to compare.
pub(crate) fn check_pair(old: &Path, temp: &Path) -> Result<Option<CompareOutcome>, ConvertError> {
    if !old.exists() {
        return Ok(Some(CompareOutcome::Ignored(Missing::OldFile)));
    }
    if !temp.exists() {
        return Ok(Some(CompareOutcome::Ignored(Missing::TempFile)));
    }
    if !old.is_file() {
        return Err(ConvertError::OldNotRegularFile);
    }
    if !temp.is_file() {
        return Err(ConvertError::TempNotRegularFile);
    }
    Ok(None)
}

/// Reads `path` as `format`, rejecting content that does not decode cleanly.
pub(crate) fn read_strict(path: &Path, format: TextFormat) -> Result<String, ConvertError> {
    encoding::read_text_strict(path, format)
        .map_err(|e| ConvertError::io(path, e))?
        .map_err(|source| ConvertError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Line-oriented writer that encodes every line in a fixed format.
pub(crate) struct TextWriter {
    path: PathBuf,
    format: TextFormat,
    writer: BufWriter<File>,
}

impl TextWriter {
    pub(crate) fn create(path: &Path, format: TextFormat) -> Result<Self, ConvertError> {
        let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            writer: BufWriter::new(file),
        })
    }

    pub(crate) fn write_line(&mut self, line: &str) -> Result<(), ConvertError> {
        let mut bytes = self.format.encode(line);
        bytes.extend(self.format.encode(LINE_SEPARATOR));
        self.writer
            .write_all(&bytes)
            .map_err(|e| ConvertError::io(&self.path, e))
    }

    pub(crate) fn finish(mut self) -> Result<(), ConvertError> {
        self.writer
            .flush()
            .map_err(|e| ConvertError::io(&self.path, e))
    }
}
