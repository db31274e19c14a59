use std::path::{Path, PathBuf};

use log::debug;

use crate::encoding::TextFormat;
use crate::ini::IniFile;

/// Section of the job configuration file that carries the job's file format.
pub const MAIN_CONFIGURATION_SECTION: &str = "Main Configuration";

pub const JOB_FILE_FORMAT_KEY: &str = "Job File Format";

/// Format assumed for jobs created before the format entry existed.
pub const LEGACY_JOB_FORMAT: TextFormat = TextFormat::Utf16Le;

/// The five job files that must be present in every job folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Calibration,
    Configuration,
    PieceNumber,
    JobInfo,
    JobInfoConfig,
}

impl FileType {
    /// Shown when the primary copy was restored from the backup folder.
    pub fn success_message(&self) -> &'static str {
        match self {
            FileType::Calibration => {
                "The calibration file was restored from the backup version. \
                 Please check all calibration settings."
            }
            FileType::Configuration => {
                "The configuration file was restored from the backup version. \
                 Please check all calibration settings."
            }
            FileType::PieceNumber => {
                "The file containing the number of the next piece to be inspected \
                 was restored from the backup version. \
                 Please check that the number is correct."
            }
            FileType::JobInfo => {
                "The job information file was restored from the backup version. \
                 Please check that the job information is correct."
            }
            FileType::JobInfoConfig => {
                "The job information configuration file was restored from the backup version. \
                 Please check that the job information is correct."
            }
        }
    }

    /// Shown when the backup copy could not be used either.
    ///
    /// The job info window configuration has none; a default copy is
    /// installed instead.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            FileType::Calibration => Some(
                "The calibration file was damaged or missing and could not be restored. \
                 Please reset all calibration settings.",
            ),
            FileType::Configuration => Some(
                "The configuration file was damaged or missing and could not be restored. \
                 Please select the proper configuration file.",
            ),
            FileType::PieceNumber => Some(
                "The file containing the number of the next piece to be inspected \
                 was damaged or missing and could not be restored. \
                 Please enter the correct number.",
            ),
            FileType::JobInfo => Some(
                "The job information file was damaged or missing and could not be restored. \
                 Please re-enter the job information.",
            ),
            FileType::JobInfoConfig => None,
        }
    }
}

/// One required job file. The on-disk name is `<prefix><job name><suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFile {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub file_type: FileType,
}

impl RequiredFile {
    pub fn file_name(&self, job_name: &str) -> String {
        format!("{}{}{}", self.prefix, job_name, self.suffix)
    }
}

/// Checked in this order on every validation pass.
pub const REQUIRED_FILES: [RequiredFile; 5] = [
    RequiredFile {
        prefix: "00 - ",
        suffix: " Calibration File.ini",
        file_type: FileType::Calibration,
    },
    RequiredFile {
        prefix: "01 - ",
        suffix: " Configuration.ini",
        file_type: FileType::Configuration,
    },
    RequiredFile {
        prefix: "02 - ",
        suffix: " Piece Number File.ini",
        file_type: FileType::PieceNumber,
    },
    RequiredFile {
        prefix: "03 - ",
        suffix: " Job Info.ini",
        file_type: FileType::JobInfo,
    },
    RequiredFile {
        prefix: "04 - ",
        suffix: " Configuration - Job Info Window.ini",
        file_type: FileType::JobInfoConfig,
    },
];

pub fn required_file(file_type: FileType) -> &'static RequiredFile {
    // Every FileType has exactly one entry
    REQUIRED_FILES
        .iter()
        .find(|f| f.file_type == file_type)
        .unwrap_or(&REQUIRED_FILES[0])
}

/// A job mirrored across a primary and a backup data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLocation {
    primary_root: PathBuf,
    backup_root: PathBuf,
    job_name: String,
}

impl JobLocation {
    pub fn new<P: AsRef<Path>, B: AsRef<Path>>(
        primary_root: P,
        backup_root: B,
        job_name: impl Into<String>,
    ) -> Self {
        Self {
            primary_root: primary_root.as_ref().to_path_buf(),
            backup_root: backup_root.as_ref().to_path_buf(),
            job_name: job_name.into(),
        }
    }

    pub fn primary_root(&self) -> &Path {
        &self.primary_root
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn primary_job_dir(&self) -> PathBuf {
        self.primary_root.join(&self.job_name)
    }

    pub fn backup_job_dir(&self) -> PathBuf {
        self.backup_root.join(&self.job_name)
    }

    pub fn primary_file(&self, file: &RequiredFile) -> PathBuf {
        self.primary_job_dir().join(file.file_name(&self.job_name))
    }

    pub fn backup_file(&self, file: &RequiredFile) -> PathBuf {
        self.backup_job_dir().join(file.file_name(&self.job_name))
    }

    /// `<primary job folder>/15 - <job name> Repair Log.txt`
    pub fn repair_log_path(&self) -> PathBuf {
        self.primary_job_dir()
            .join(format!("15 - {} Repair Log.txt", self.job_name))
    }

    /// Format of the job's files as declared in its configuration file.
    ///
    /// Jobs without the entry, or whose configuration cannot be read, predate
    /// the UTF-8 migration and are UTF-16LE.
    pub fn file_format(&self) -> TextFormat {
        let config = self.primary_file(required_file(FileType::Configuration));
        let declared = IniFile::load_detected(&config)
            .ok()
            .and_then(|ini| {
                ini.value(MAIN_CONFIGURATION_SECTION, JOB_FILE_FORMAT_KEY)
                    .map(str::to_string)
            });

        match declared.as_deref().map(str::parse::<TextFormat>) {
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                debug!("{} in {}, assuming legacy format", e, config.display());
                LEGACY_JOB_FORMAT
            }
            None => LEGACY_JOB_FORMAT,
        }
    }
}
