//! Reader/writer for the application's Windows-style ini files.
//!
//! The whole file is held as a buffer of lines so that comments, ordering and
//! unknown entries survive a load/save cycle untouched. Section names are
//! matched case-sensitively at the start of a line; keys are matched
//! case-insensitively.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::encoding::{self, TextFormat, TextLines, LINE_SEPARATOR};
use crate::error::IniError;

/// Reading stops at this line so data files can carry an ini header.
const HEADER_END: &str = "[Header End]";

/// Header written into files created from scratch.
const NEW_FILE_HEADER: [&str; 4] = [
    "",
    ";Do not erase blank line above - has hidden code needed by UTF-16 files.",
    ";To make a new file, copy an existing ini file and change only data below this line.",
    "",
];

#[derive(Debug, Clone)]
pub struct IniFile {
    path: PathBuf,
    format: TextFormat,
    lines: Vec<String>,
    modified: bool,
}

/// Where a section/key lookup ended up.
struct Lookup {
    /// Line holding `key=value`.
    key_index: Option<usize>,
    /// Where a missing key would be inserted, `None` when the section is absent.
    insert_at: Option<usize>,
    /// Byte offset of the value within the key line.
    value_start: usize,
}

impl IniFile {
    /// Loads `path` decoded as `format`. A missing file yields a buffer holding
    /// only the standard header, which is written out on the first save.
    pub fn load<P: AsRef<Path>>(path: P, format: TextFormat) -> Result<Self, IniError> {
        let path = path.as_ref().to_path_buf();

        let lines = match encoding::read_text(&path, format) {
            Ok(text) => {
                let mut lines = Vec::new();
                for line in TextLines::new(&text) {
                    lines.push(line.to_string());
                    if line == HEADER_END {
                        break;
                    }
                }
                lines
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Ini file {} not found, starting empty", path.display());
                NEW_FILE_HEADER.iter().map(|s| s.to_string()).collect()
            }
            Err(e) => return Err(IniError::ReadFile { path, source: e }),
        };

        Ok(Self {
            path,
            format,
            lines,
            modified: false,
        })
    }

    /// Loads `path` using whatever format its leading bytes indicate.
    pub fn load_detected<P: AsRef<Path>>(path: P) -> Result<Self, IniError> {
        let path = path.as_ref();
        let format = match encoding::detect_file_format(path) {
            Ok(probe) => probe.format,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TextFormat::Utf8,
            Err(e) => {
                return Err(IniError::ReadFile {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Self::load(path, format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn lookup(&self, section: &str, key: &str) -> Lookup {
        let mut lookup = Lookup {
            key_index: None,
            insert_at: None,
            value_start: 0,
        };

        let section_tag = format!("[{}]", section);
        let Some(section_index) = self.lines.iter().position(|l| l.starts_with(&section_tag))
        else {
            return lookup;
        };

        let key_prefix = format!("{}=", key.to_lowercase());
        for (index, line) in self.lines.iter().enumerate().skip(section_index + 1) {
            if line.starts_with('[') {
                lookup.insert_at = Some(index);
                return lookup;
            }
            if line.to_lowercase().starts_with(&key_prefix) {
                lookup.key_index = Some(index);
                lookup.value_start = line.find('=').map(|i| i + 1).unwrap_or(line.len());
                return lookup;
            }
        }

        lookup.insert_at = Some(self.lines.len());
        lookup
    }

    /// Returns the raw value for `section`/`key`. Blank values count as absent.
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        let lookup = self.lookup(section, key);
        let line = &self.lines[lookup.key_index?];
        let value = &line[lookup.value_start..];
        (!value.is_empty()).then_some(value)
    }

    pub fn read_string(&self, section: &str, key: &str, default: &str) -> String {
        self.value(section, key).unwrap_or(default).to_string()
    }

    pub fn read_int(&self, section: &str, key: &str, default: i32) -> i32 {
        self.value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn read_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn read_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.value(section, key) {
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            _ => default,
        }
    }

    /// Sets `key=value` in `section`, creating the key or section as needed.
    pub fn write_string(&mut self, section: &str, key: &str, value: &str) {
        self.modified = true;
        let entry = format!("{}={}", key, value);
        let lookup = self.lookup(section, key);

        match (lookup.key_index, lookup.insert_at) {
            (Some(index), _) => self.lines[index] = entry,
            (None, Some(index)) => self.lines.insert(index, entry),
            (None, None) => {
                self.lines.push(format!("[{}]", section));
                self.lines.push(entry);
            }
        }
    }

    pub fn write_int(&mut self, section: &str, key: &str, value: i32) {
        self.write_string(section, key, &value.to_string());
    }

    pub fn write_double(&mut self, section: &str, key: &str, value: f64) {
        self.write_string(section, key, &value.to_string());
    }

    /// Writes `value` rounded to at most `precision` decimals, without
    /// trailing zeros. Precision outside 0..=10 falls back to 2.
    pub fn write_double_formatted(&mut self, section: &str, key: &str, value: f64, precision: usize) {
        let precision = if precision > 10 { 2 } else { precision };
        let mut text = format!("{:.*}", precision, value);
        if text.contains('.') {
            text = text.trim_end_matches('0').trim_end_matches('.').to_string();
        }
        if text == "-0" {
            text = "0".to_string();
        }
        self.write_string(section, key, &text);
    }

    pub fn write_bool(&mut self, section: &str, key: &str, value: bool) {
        self.write_string(section, key, if value { "true" } else { "false" });
    }

    /// Writes every buffered line to disk in the file's format.
    pub fn save(&mut self) -> Result<(), IniError> {
        let write_err = |e| IniError::WriteFile {
            path: self.path.clone(),
            source: e,
        };

        let file = File::create(&self.path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        for line in &self.lines {
            writer
                .write_all(&self.format.encode(line))
                .map_err(write_err)?;
            writer
                .write_all(&self.format.encode(LINE_SEPARATOR))
                .map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;

        self.modified = false;
        Ok(())
    }
}
