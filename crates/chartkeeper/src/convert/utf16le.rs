use std::path::{Path, PathBuf};

use crate::convert::plan::{ConversionPlan, ConversionTarget};
use crate::convert::{
    check_pair, format_entry, is_configuration_file, read_strict, CompareOutcome, ConvertOutcome,
    FileConverter, TextWriter, MAIN_CONFIGURATION_TAG,
};
use crate::encoding::{self, is_legacy_header_line, TextFormat, TextLines};
use crate::error::ConvertError;

pub const DEFAULT_TEMP_SUFFIX: &str = " UTF-8";
pub const DEFAULT_LOG_FILE: &str = "Config file UTF-16LE to UTF-8 Conversion Log.txt";
pub const DEFAULT_FLAG_FILE: &str = "Configs Have Been Converted To UTF-8";

/// Folder/extension pairs holding the application's own settings files.
pub const DEFAULT_TARGETS: [(&str, &str); 3] = [
    (".", "ini"),
    ("presets", "preset"),
    ("configurations", "config"),
];

/// Converts the application's legacy UTF-16LE settings files to UTF-8.
///
/// Only files carrying the legacy header are touched, so files converted by an
/// earlier run are skipped. The header itself is dropped from the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16LeToUtf8Converter;

impl Utf16LeToUtf8Converter {
    pub fn new() -> Self {
        Self
    }

    /// The settings-folder batch rooted at `base_dir`.
    pub fn default_plan<P: AsRef<Path>>(base_dir: P) -> ConversionPlan {
        ConversionPlan {
            base_dir: base_dir.as_ref().to_path_buf(),
            targets: DEFAULT_TARGETS
                .iter()
                .map(|(dir, ext)| ConversionTarget::new(dir, *ext))
                .collect(),
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            flag_file: Some(PathBuf::from(DEFAULT_FLAG_FILE)),
        }
    }
}

/// Lines of a legacy file with its header removed: everything before the first
/// line longer than one character (the line holding only the byte order mark)
/// and the explanatory comment lines.
fn body_lines(text: &str) -> impl Iterator<Item = &str> {
    TextLines::new(text)
        .skip_while(|line| line.chars().count() <= 1)
        .filter(|line| !is_legacy_header_line(line))
}

fn is_legacy(path: &Path) -> Result<bool, ConvertError> {
    encoding::is_legacy_utf16le(path).map_err(|e| ConvertError::io(path, e))
}

impl FileConverter for Utf16LeToUtf8Converter {
    fn convert_file(&self, old: &Path, temp: &Path) -> Result<ConvertOutcome, ConvertError> {
        if !is_legacy(old)? {
            return Ok(ConvertOutcome::Skipped);
        }

        let text = read_strict(old, TextFormat::Utf16Le)?;
        let add_format_entry = is_configuration_file(old);
        let entry = format_entry(TextFormat::Utf8);

        let mut out = TextWriter::create(temp, TextFormat::Utf8)?;
        for line in body_lines(&text) {
            out.write_line(line)?;
            if add_format_entry && line.starts_with(MAIN_CONFIGURATION_TAG) {
                out.write_line(&entry)?;
            }
        }
        out.finish()?;

        Ok(ConvertOutcome::Converted)
    }

    fn compare_file(&self, old: &Path, temp: &Path) -> Result<CompareOutcome, ConvertError> {
        if let Some(outcome) = check_pair(old, temp)? {
            return Ok(outcome);
        }

        if !is_legacy(old)? {
            return Err(ConvertError::NotLegacyFormat {
                format: TextFormat::Utf16Le.name(),
            });
        }

        let skip_format_entry = is_configuration_file(old);
        let entry = format_entry(TextFormat::Utf8);

        let old_text = read_strict(old, TextFormat::Utf16Le)?;
        let new_text = read_strict(temp, TextFormat::Utf8)?;
        let mut new_lines = TextLines::new(&new_text);

        for (index, old_line) in body_lines(&old_text).enumerate() {
            let mut new_line = new_lines.next();
            if skip_format_entry && new_line.is_some_and(|l| l.starts_with(&entry)) {
                new_line = new_lines.next();
            }

            match new_line {
                None => return Err(ConvertError::TempShorter),
                Some(new_line) if new_line != old_line => {
                    return Err(ConvertError::LineMismatch { line: index + 1 })
                }
                Some(_) => {}
            }
        }

        if new_lines.next().is_some() {
            return Err(ConvertError::TempLonger);
        }

        Ok(CompareOutcome::Identical)
    }
}
