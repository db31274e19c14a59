use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::job::layout::{FileType, JobLocation, RequiredFile, REQUIRED_FILES};
use crate::logfile::LogFile;
use crate::notify::{ConfigSelector, NoConfigSelection, Notifier};
use crate::storage::{copy_file, ensure_directory};

/// Template installed when a job's info window configuration is lost in both folders.
pub const DEFAULT_JOB_INFO_CONFIG: &str = "Configuration - Job Info Window.ini";

/// How a validation pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// All folders exist and every required file was checked.
    Complete,
    /// A data root is blank or missing and was not (or could not be) recreated.
    RootPathFailure,
    /// The job does not exist, or one of its folders could not be recreated.
    JobUnavailable,
    /// The repair log could not be opened; no files were checked.
    Aborted,
}

/// What was done about one missing primary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    RestoredFromBackup,
    /// The built-in template was copied into both job folders.
    RestoredDefault,
    DefaultRestoreFailed,
    /// The host was asked to let the user pick a configuration.
    ManualSelection { selected: bool },
    Failed,
}

impl RepairOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RepairOutcome::RestoredFromBackup
                | RepairOutcome::RestoredDefault
                | RepairOutcome::ManualSelection { selected: true }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRepair {
    pub file_type: FileType,
    pub destination: PathBuf,
    pub outcome: RepairOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    /// Folders that were missing and have been created during this pass.
    pub recreated: Vec<PathBuf>,
    pub repairs: Vec<FileRepair>,
}

impl ValidationReport {
    /// True when the pass completed and every repair it attempted worked.
    pub fn is_ok(&self) -> bool {
        self.status == ValidationStatus::Complete
            && self.repairs.iter().all(|r| r.outcome.is_success())
    }
}

/// Outcome of checking one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathCheck {
    Present,
    Recreated,
    Failed,
}

impl PathCheck {
    fn is_usable(self) -> bool {
        self != PathCheck::Failed
    }
}

/// Verifies a job's folders and required files, restoring missing primary
/// files from the backup folder.
///
/// In the default (non-robust) mode missing data roots are reported but never
/// recreated, since a missing root is often a network problem rather than
/// lost data. Robust mode is for an explicit repair run by a technician and
/// recreates the roots too. Job folders are recreated in both modes.
///
/// Every repair action is appended to the job's repair log. Problems are
/// reported through the [`Notifier`] and the returned [`ValidationReport`];
/// `validate` itself never fails.
pub struct JobValidator {
    location: JobLocation,
    robust: bool,
    notifier: Arc<dyn Notifier>,
    config_selector: Arc<dyn ConfigSelector>,
    default_job_info_config: PathBuf,
}

impl JobValidator {
    pub fn new(location: JobLocation, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            location,
            robust: false,
            notifier,
            config_selector: Arc::new(NoConfigSelection),
            default_job_info_config: PathBuf::from(DEFAULT_JOB_INFO_CONFIG),
        }
    }

    pub fn robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    pub fn with_config_selector(mut self, selector: Arc<dyn ConfigSelector>) -> Self {
        self.config_selector = selector;
        self
    }

    pub fn with_default_job_info_config<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.default_job_info_config = path.as_ref().to_path_buf();
        self
    }

    pub fn location(&self) -> &JobLocation {
        &self.location
    }

    /// Runs one validation pass.
    pub fn validate(&self) -> ValidationReport {
        info!(
            "Validating job '{}' (robust: {})",
            self.location.job_name(),
            self.robust
        );

        let mut report = ValidationReport {
            status: ValidationStatus::Complete,
            recreated: Vec::new(),
            repairs: Vec::new(),
        };
        report.status = self.run(&mut report);

        info!(
            "Validation of job '{}' finished: {:?}, {} repair(s)",
            self.location.job_name(),
            report.status,
            report.repairs.len()
        );
        report
    }

    fn run(&self, report: &mut ValidationReport) -> ValidationStatus {
        let location = &self.location;
        let mut pending_log: Vec<(&'static str, PathBuf)> = Vec::new();

        for (root, label) in [
            (location.primary_root(), "root primary"),
            (location.backup_root(), "root backup"),
        ] {
            match self.validate_path(root, label, self.robust) {
                PathCheck::Present => {}
                PathCheck::Recreated => {
                    report.recreated.push(root.to_path_buf());
                    pending_log.push((label, root.to_path_buf()));
                }
                PathCheck::Failed => return ValidationStatus::RootPathFailure,
            }
        }

        if location.job_name().is_empty() {
            debug!("No job name given, nothing to validate");
            return ValidationStatus::JobUnavailable;
        }

        // Without repair permission, a job missing from both roots is assumed
        // to have been removed on purpose
        if !self.robust && !location.primary_job_dir().exists() && !location.backup_job_dir().exists() {
            debug!("Job folder '{}' missing in both roots", location.job_name());
            return ValidationStatus::JobUnavailable;
        }

        let primary_dir = location.primary_job_dir();
        match self.validate_path(&primary_dir, "primary job", true) {
            PathCheck::Present => {}
            PathCheck::Recreated => {
                report.recreated.push(primary_dir.clone());
                pending_log.push(("primary job", primary_dir.clone()));
            }
            PathCheck::Failed => return ValidationStatus::JobUnavailable,
        }

        // The log lives in the primary job folder, so it can only be opened now
        let mut log = match LogFile::open(location.repair_log_path()) {
            Ok(log) => log,
            Err(e) => {
                error!("{}", e);
                return ValidationStatus::Aborted;
            }
        };

        for (label, path) in pending_log {
            log_recreated(&mut log, label, &path);
        }

        let backup_dir = location.backup_job_dir();
        let backup_check = self.validate_path(&backup_dir, "backup job", true);
        if !backup_check.is_usable() {
            return ValidationStatus::JobUnavailable;
        }
        if backup_check == PathCheck::Recreated {
            report.recreated.push(backup_dir.clone());
            log_recreated(&mut log, "backup job", &backup_dir);
        }

        for file in &REQUIRED_FILES {
            if let Some(repair) = self.validate_file(file, &mut log) {
                report.repairs.push(repair);
            }
        }

        if let Err(e) = log.close() {
            warn!("{}", e);
        }
        ValidationStatus::Complete
    }

    /// Checks that `path` exists, creating it when `repair` is set.
    fn validate_path(&self, path: &Path, label: &str, repair: bool) -> PathCheck {
        if path.as_os_str().is_empty() {
            self.notify(&format!(
                "The {} folder specified is blank - cannot be repaired.",
                label
            ));
            return PathCheck::Failed;
        }

        if path.exists() {
            return PathCheck::Present;
        }

        if !repair {
            self.notify(&format!(
                "The {} folder was missing and was not repaired.",
                label
            ));
            return PathCheck::Failed;
        }

        match ensure_directory(path) {
            Ok(_) => {
                self.notify(&format!("The {} folder was missing and was repaired.", label));
                PathCheck::Recreated
            }
            Err(e) => {
                error!("{}", e);
                self.notify(&format!(
                    "The {} folder was missing and could not be repaired.",
                    label
                ));
                PathCheck::Failed
            }
        }
    }

    /// Repairs the primary copy of `file` from the backup folder when it is missing.
    fn validate_file(&self, file: &RequiredFile, log: &mut LogFile) -> Option<FileRepair> {
        let destination = self.location.primary_file(file);
        if destination.exists() {
            return None;
        }

        let source = self.location.backup_file(file);
        let outcome = self.handle_missing_file(&source, &destination, file.file_type, log);
        Some(FileRepair {
            file_type: file.file_type,
            destination,
            outcome,
        })
    }

    /// Restores `destination` from `source` and tells the user how it went.
    ///
    /// When the copy fails, the job info window configuration falls back to
    /// the built-in template and the job configuration is handed to the
    /// [`ConfigSelector`].
    pub fn handle_missing_file(
        &self,
        source: &Path,
        destination: &Path,
        file_type: FileType,
        log: &mut LogFile,
    ) -> RepairOutcome {
        log.log_dated(&format!(
            "Error - file does not exist: {}",
            destination.display()
        ));

        if self.copy_file_from_backup(source, destination, log) {
            self.notify(file_type.success_message());
            return RepairOutcome::RestoredFromBackup;
        }

        if let Some(message) = file_type.failure_message() {
            self.notify(message);
        }

        match file_type {
            FileType::JobInfoConfig => self.restore_default_job_info_config(destination, source, log),
            FileType::Configuration => {
                log.log("Action - requesting manual selection of the configuration file.");
                let selected = self.config_selector.select_configuration(&self.location);
                RepairOutcome::ManualSelection { selected }
            }
            _ => RepairOutcome::Failed,
        }
    }

    /// Copies `source` over `destination`, logging the action and any failure.
    pub fn copy_file_from_backup(&self, source: &Path, destination: &Path, log: &mut LogFile) -> bool {
        log.log(&format!(
            "Action - copying from backup folder: {}",
            source.display()
        ));

        match copy_file(source, destination) {
            Ok(bytes) => {
                debug!("Restored {} ({} bytes)", destination.display(), bytes);
                true
            }
            Err(e) => {
                warn!("{}", e);
                log.log(&format!(
                    "Error - cannot copy from backup folder: {}",
                    source.display()
                ));
                log.log(&e.to_string());
                false
            }
        }
    }

    /// Installs the default job info window configuration in both job folders.
    fn restore_default_job_info_config(
        &self,
        primary: &Path,
        backup: &Path,
        log: &mut LogFile,
    ) -> RepairOutcome {
        let template = &self.default_job_info_config;
        log.log(&format!(
            "Action - copying default file: {}",
            template.display()
        ));

        let restored = [primary, backup].iter().all(|target| match copy_file(template, target) {
            Ok(_) => true,
            Err(e) => {
                warn!("{}", e);
                log.log(&format!("Error - cannot copy default file: {}", e));
                false
            }
        });

        if restored {
            self.notify(
                "The job information configuration file was damaged or missing \
                 and replaced with the default version.",
            );
            RepairOutcome::RestoredDefault
        } else {
            self.notify(
                "The job information configuration file was damaged or missing \
                 and could not be repaired. Please contact technical support.",
            );
            RepairOutcome::DefaultRestoreFailed
        }
    }

    fn notify(&self, message: &str) {
        self.notifier.notify(message);
    }
}

fn log_recreated(log: &mut LogFile, label: &str, path: &Path) {
    log.log_dated(&format!(
        "Error - {} path does not exist: {}",
        label,
        path.display()
    ));
    log.log(&format!("Action - creating {} path.", label));
}
