use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::convert::scan::list_with_extension;
use crate::convert::{temp_path_for, CompareOutcome, ConvertOutcome, FileConverter, Missing};
use crate::error::StorageError;
use crate::logfile::LogFile;
use crate::storage::{delete_old_rename_new, CommitOutcome};

/// Files with `extension` directly inside `directory`.
///
/// The same folder may appear in several targets with different extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTarget {
    pub directory: PathBuf,
    pub extension: String,
}

impl ConversionTarget {
    pub fn new<P: AsRef<Path>>(directory: P, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Convert,
    Compare,
    Commit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Done,
    /// Nothing to do for this file.
    Skipped,
    Failed(String),
}

/// Result of one step for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRecord {
    pub step: Step,
    pub source: PathBuf,
    pub temp: PathBuf,
    pub result: StepResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// The completion flag was present, nothing was done.
    pub already_completed: bool,
    pub records: Vec<ConversionRecord>,
    pub flag_created: bool,
}

impl ConversionReport {
    pub fn failures(&self) -> impl Iterator<Item = &ConversionRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.result, StepResult::Failed(_)))
    }

    /// True when no step of any file failed.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Files whose converted form replaced the original during this run.
    pub fn committed(&self) -> impl Iterator<Item = &Path> {
        self.records
            .iter()
            .filter(|r| r.step == Step::Commit && r.result == StepResult::Done)
            .map(|r| r.source.as_path())
    }
}

/// A batch conversion: which files, how temp files are named, where the log
/// and the completion flag go.
///
/// Relative target folders, the log file and the flag file are resolved
/// against `base_dir`. Without a flag file the batch runs every time.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub base_dir: PathBuf,
    pub targets: Vec<ConversionTarget>,
    pub temp_suffix: String,
    pub log_file: PathBuf,
    pub flag_file: Option<PathBuf>,
}

impl ConversionPlan {
    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join(&self.log_file)
    }

    pub fn flag_path(&self) -> Option<PathBuf> {
        self.flag_file.as_ref().map(|f| self.base_dir.join(f))
    }

    /// Runs the batch with `converter` doing the per-file work.
    ///
    /// Files are converted to temp files first, then each temp file is
    /// verified and swapped in, then temp files left behind by an interrupted
    /// earlier run are picked up. A failure on one file never stops the others.
    /// The completion flag is only written when every step succeeded.
    pub fn run<C: FileConverter + ?Sized>(&self, converter: &C) -> ConversionReport {
        let mut report = ConversionReport::default();

        if let Some(flag) = self.flag_path() {
            if flag.exists() {
                debug!("{} exists, conversion already done", flag.display());
                report.already_completed = true;
                return report;
            }
        }

        info!("Converting files under {}", self.base_dir.display());
        let mut log = LogFile::open_or_discard(self.log_path());
        log.section();

        log.log("Converting files:");
        log.blank();
        for target in &self.targets {
            self.convert_target(converter, target, &mut log, &mut report);
            log.blank();
        }

        log.log("Validating conversions and cleaning up:");
        log.blank();
        for target in &self.targets {
            self.clean_up_target(converter, target, &target.extension, &mut log, &mut report);
            log.blank();
        }

        log.log("Validating conversions and cleaning up orphans:");
        log.blank();
        for target in &self.targets {
            let orphan_extension = format!("{}{}", target.extension, self.temp_suffix);
            self.clean_up_target(converter, target, &orphan_extension, &mut log, &mut report);
            log.blank();
        }

        if report.is_success() {
            report.flag_created = self.create_flag();
        }

        if report.is_success() && (report.flag_created || self.flag_file.is_none()) {
            info!("All files under {} converted", self.base_dir.display());
            log.log("All files converted successfully.");
        } else {
            warn!(
                "Conversion under {} incomplete, {} failure(s)",
                self.base_dir.display(),
                report.failures().count()
            );
            log.log("One or more errors occurred during the conversion.");
        }

        if let Err(e) = log.close() {
            warn!("{}", e);
        }
        report
    }

    fn target_dir(&self, target: &ConversionTarget) -> PathBuf {
        self.base_dir.join(&target.directory)
    }

    fn convert_target<C: FileConverter + ?Sized>(
        &self,
        converter: &C,
        target: &ConversionTarget,
        log: &mut LogFile,
        report: &mut ConversionReport,
    ) {
        let dir = self.target_dir(target);
        let Some(entries) = list_with_extension(&dir, &target.extension) else {
            log_nothing_found(log, &target.extension, &dir);
            return;
        };

        for old in entries.into_iter().filter(|p| p.is_file()) {
            let temp = temp_path_for(&old, &self.temp_suffix);
            let result = match converter.convert_file(&old, &temp) {
                Ok(ConvertOutcome::Converted) => {
                    log.log(&format!("File converted: {}", old.display()));
                    StepResult::Done
                }
                Ok(ConvertOutcome::Skipped) => {
                    debug!("{} needs no conversion", old.display());
                    StepResult::Skipped
                }
                Err(e) => {
                    warn!("{}", e);
                    log.log(&e.to_string());
                    log.log(&format!("Error during conversion: {}", old.display()));
                    StepResult::Failed(e.to_string())
                }
            };
            report.records.push(ConversionRecord {
                step: Step::Convert,
                source: old,
                temp,
                result,
            });
        }
    }

    /// Compares every `<name>.<extension>` entry with its temp file and swaps
    /// them when they match. Entry names carrying the temp suffix are mapped
    /// back to their original name first.
    fn clean_up_target<C: FileConverter + ?Sized>(
        &self,
        converter: &C,
        target: &ConversionTarget,
        extension: &str,
        log: &mut LogFile,
        report: &mut ConversionReport,
    ) {
        let dir = self.target_dir(target);
        let Some(entries) = list_with_extension(&dir, extension) else {
            log_nothing_found(log, extension, &dir);
            return;
        };

        for entry in entries {
            let old = self.strip_temp_suffix(&entry);
            let temp = temp_path_for(&old, &self.temp_suffix);

            let compared = converter.compare_file(&old, &temp);
            let passed = match &compared {
                Ok(CompareOutcome::Identical) => {
                    log.log(&format!("Files are identical: {}", old.display()));
                    true
                }
                Ok(CompareOutcome::Ignored(Missing::OldFile)) => {
                    log.log(&format!(
                        "Compare ignored -- there is no old file: {}",
                        old.display()
                    ));
                    true
                }
                Ok(CompareOutcome::Ignored(Missing::TempFile)) => {
                    log.log(&format!(
                        "Compare ignored -- there is no temp file: {}",
                        temp.display()
                    ));
                    true
                }
                Err(e) => {
                    warn!("{}", e);
                    log.log(&e.to_string());
                    log.log(&format!("Compare fail: {}", old.display()));
                    false
                }
            };

            report.records.push(ConversionRecord {
                step: Step::Compare,
                source: old.clone(),
                temp: temp.clone(),
                result: match compared {
                    Ok(CompareOutcome::Identical) => StepResult::Done,
                    Ok(CompareOutcome::Ignored(_)) => StepResult::Skipped,
                    Err(e) => StepResult::Failed(e.to_string()),
                },
            });

            if passed {
                let result = commit(&old, &temp, log);
                report.records.push(ConversionRecord {
                    step: Step::Commit,
                    source: old,
                    temp,
                    result,
                });
            }
        }
    }

    fn strip_temp_suffix(&self, entry: &Path) -> PathBuf {
        match entry
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(self.temp_suffix.as_str()))
        {
            Some(original) if !self.temp_suffix.is_empty() => entry.with_file_name(original),
            _ => entry.to_path_buf(),
        }
    }

    fn create_flag(&self) -> bool {
        let Some(flag) = self.flag_path() else {
            return false;
        };
        match File::create(&flag) {
            Ok(_) => {
                info!("Created completion flag {}", flag.display());
                true
            }
            Err(e) => {
                warn!("Failed to create completion flag {}: {}", flag.display(), e);
                false
            }
        }
    }
}

/// Replaces `old` with `temp`, logging what happened.
fn commit(old: &Path, temp: &Path, log: &mut LogFile) -> StepResult {
    match delete_old_rename_new(old, temp) {
        Ok(CommitOutcome::Renamed) => {
            log.log(&format!("Success -- temp file renamed: {}", old.display()));
            StepResult::Done
        }
        Ok(CommitOutcome::NoTempFile) => {
            log.log(&format!(
                "Delete and rename ignored -- there is no temp file: {}",
                temp.display()
            ));
            StepResult::Skipped
        }
        Err(e) => {
            warn!("{}", e);
            match &e {
                StorageError::DeleteFile { path, .. } => {
                    log.log(&format!("Error - could not delete: {}", path.display()))
                }
                _ => log.log(&format!("Error - could not rename: {}", temp.display())),
            }
            StepResult::Failed(e.to_string())
        }
    }
}

fn log_nothing_found(log: &mut LogFile, extension: &str, dir: &Path) {
    log.log(&format!(
        "No files found with extension '{}' in folder '{}'",
        extension,
        dir.display()
    ));
}
