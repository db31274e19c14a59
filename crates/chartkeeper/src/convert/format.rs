use std::path::{Path, PathBuf};

use log::debug;

use crate::convert::plan::{ConversionPlan, ConversionReport, ConversionTarget};
use crate::convert::{
    check_pair, format_entry, is_configuration_file, read_strict, CompareOutcome, ConvertOutcome,
    FileConverter, TextWriter, MAIN_CONFIGURATION_TAG,
};
use crate::encoding::{self, is_legacy_header_line, strip_bom, FormatProbe, TextFormat, TextLines};
use crate::error::ConvertError;
use crate::job::JobLocation;

/// Converts files from whatever format they are in to one target format.
///
/// Byte order marks are removed, since the application reads files without
/// them. A file already in the target format without a mark is left alone.
#[derive(Debug, Clone, Copy)]
pub struct FormatConverter {
    target: TextFormat,
}

impl FormatConverter {
    pub fn new(target: TextFormat) -> Self {
        Self { target }
    }

    pub fn target(&self) -> TextFormat {
        self.target
    }

    /// Probes `path`, treating a file that does not exist as already in the
    /// target format.
    pub fn probe(&self, path: &Path) -> Result<FormatProbe, ConvertError> {
        match encoding::detect_file_format(path) {
            Ok(probe) => Ok(probe),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FormatProbe {
                format: self.target,
                has_bom: false,
            }),
            Err(e) => Err(ConvertError::io(path, e)),
        }
    }
}

fn last_non_empty_line(text: &str) -> Option<&str> {
    TextLines::new(text)
        .map(strip_bom)
        .filter(|line| !line.is_empty())
        .last()
}

impl FileConverter for FormatConverter {
    fn convert_file(&self, old: &Path, temp: &Path) -> Result<ConvertOutcome, ConvertError> {
        let probe = self.probe(old)?;
        if probe.format == self.target && !probe.has_bom {
            return Ok(ConvertOutcome::Skipped);
        }
        debug!(
            "Converting {} from {} to {}",
            old.display(),
            probe.format,
            self.target
        );

        let text = read_strict(old, probe.format)?;
        let add_format_entry = is_configuration_file(old);
        let entry = format_entry(self.target);

        let mut out = TextWriter::create(temp, self.target)?;
        for (index, line) in TextLines::new(&text).enumerate() {
            let line = if index == 0 { strip_bom(line) } else { line };
            if is_legacy_header_line(line) {
                continue;
            }
            out.write_line(line)?;
            if add_format_entry && line.starts_with(MAIN_CONFIGURATION_TAG) {
                out.write_line(&entry)?;
            }
        }
        out.finish()?;

        Ok(ConvertOutcome::Converted)
    }

    /// Only the last non-empty lines are compared; the rest of the file may
    /// legitimately differ by the dropped header and added format entry.
    fn compare_file(&self, old: &Path, temp: &Path) -> Result<CompareOutcome, ConvertError> {
        if let Some(outcome) = check_pair(old, temp)? {
            return Ok(outcome);
        }

        let old_format = self
            .probe(old)
            .map(|probe| probe.format)
            .unwrap_or(self.target);
        let old_text = read_strict(old, old_format)?;
        let new_text = read_strict(temp, self.target)?;

        match (last_non_empty_line(&old_text), last_non_empty_line(&new_text)) {
            (Some(a), Some(b)) if a == b => Ok(CompareOutcome::Identical),
            _ => Err(ConvertError::LastLineMismatch),
        }
    }
}

/// Log of format conversions, kept in the primary job folder.
pub fn job_conversion_log_name(job_name: &str) -> String {
    format!("16 - {} Format Conversion Log.txt", job_name)
}

/// The batch converting the ini files of a job's primary folder to `format`.
///
/// Jobs have no completion flag; files already in `format` are skipped, so
/// repeated runs are cheap.
pub fn job_conversion_plan(location: &JobLocation, format: TextFormat) -> ConversionPlan {
    ConversionPlan {
        base_dir: location.primary_job_dir(),
        targets: vec![ConversionTarget::new(".", "ini")],
        temp_suffix: format!(" {}", format.name()),
        log_file: PathBuf::from(job_conversion_log_name(location.job_name())),
        flag_file: None,
    }
}

/// Converts every ini file of the job's primary folder to `format`.
pub fn convert_job_files(location: &JobLocation, format: TextFormat) -> ConversionReport {
    job_conversion_plan(location, format).run(&FormatConverter::new(format))
}
