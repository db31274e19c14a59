//! Job folder layout and the startup validation/repair pass.

pub mod layout;
pub mod validator;

pub use layout::{
    required_file, FileType, JobLocation, RequiredFile, JOB_FILE_FORMAT_KEY, LEGACY_JOB_FORMAT,
    MAIN_CONFIGURATION_SECTION, REQUIRED_FILES,
};
pub use validator::{
    FileRepair, JobValidator, RepairOutcome, ValidationReport, ValidationStatus,
    DEFAULT_JOB_INFO_CONFIG,
};
