//! Append-only plain-text log files.
//!
//! Used for the per-job repair log and the conversion log. History accumulates
//! across runs because the file is always opened in append mode. The handle is
//! released when the `LogFile` is dropped, on every exit path.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::warn;

use crate::error::StorageError;

const SEPARATOR: &str = "---------------------------------------------------------------------";

/// Format of the timestamp line written before dated messages.
const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

pub struct LogFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl LogFile {
    /// Creates or opens `path` for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::OpenLog {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Opens `path`, or falls back to a log that discards everything.
    ///
    /// A conversion run must not stop just because its log cannot be written.
    pub fn open_or_discard<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(log) => log,
            Err(e) => {
                warn!("{}", e);
                Self {
                    path: path.to_path_buf(),
                    writer: None,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `message` as one line.
    pub fn log(&mut self, message: &str) {
        self.write_line(message);
    }

    /// Writes the current date and time on its own line, then `message`.
    pub fn log_dated(&mut self, message: &str) {
        self.date();
        self.write_line(message);
    }

    pub fn blank(&mut self) {
        self.write_line("");
    }

    pub fn separate(&mut self) {
        self.write_line(SEPARATOR);
    }

    pub fn date(&mut self) {
        let stamp = Local::now().format(DATE_FORMAT).to_string();
        self.write_line(&stamp);
    }

    /// Blank line, separator, date, blank line.
    pub fn section(&mut self) {
        self.blank();
        self.separate();
        self.date();
        self.blank();
    }

    /// Flushes and releases the file, reporting any error the flush hits.
    pub fn close(mut self) -> Result<(), StorageError> {
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|e| StorageError::WriteFile {
                path: self.path.clone(),
                source: e,
            }),
            None => Ok(()),
        }
    }

    fn write_line(&mut self, line: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write to log file {}: {}", self.path.display(), e);
            // Stop writing after the first failure, a broken handle stays broken
            self.writer = None;
        }
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush log file {}: {}", self.path.display(), e);
            }
        }
    }
}
