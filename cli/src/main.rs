mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use chartkeeper::config::{default_config_path, load_config, Config};
use chartkeeper::convert::{convert_job_files, ConversionReport, Utf16LeToUtf8Converter};
use chartkeeper::encoding::TextFormat;
use chartkeeper::error::ConfigError;
use chartkeeper::job::{JobLocation, JobValidator, ValidationStatus};
use chartkeeper::notify::LogNotifier;

#[derive(Parser, Debug)]
#[command(name = "chartkeeper", version, about = "Job file repair and settings file migration")]
struct Cli {
    /// Settings file; defaults to the platform config folder
    #[arg(long, global = true, env = "CHARTKEEPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a job's folders and files, restoring missing files from the backup
    Validate {
        job: String,

        /// Also recreate missing data roots
        #[arg(long)]
        robust: bool,

        #[arg(long)]
        primary: Option<PathBuf>,

        #[arg(long)]
        backup: Option<PathBuf>,
    },

    /// Convert legacy UTF-16LE settings files to UTF-8
    ConvertLegacy {
        /// Folder holding the settings files
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Convert a job's ini files to one text format
    ConvertJob {
        job: String,

        /// UTF-8, UTF-16LE or UTF-16BE; defaults to the job's declared format
        #[arg(long)]
        format: Option<String>,

        #[arg(long)]
        primary: Option<PathBuf>,

        #[arg(long)]
        backup: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> chartkeeper::Result<bool> {
    let config = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Validate {
            job,
            robust,
            primary,
            backup,
        } => {
            let location = job_location(config.as_ref(), &job, primary, backup)?;
            let mut validator = JobValidator::new(location, Arc::new(LogNotifier)).robust(robust);
            if let Some(config) = &config {
                validator = validator.with_default_job_info_config(&config.default_job_info_config);
            }

            let report = validator.validate();
            for repair in &report.repairs {
                info!(
                    "{:?}: {} ({:?})",
                    repair.file_type,
                    repair.destination.display(),
                    repair.outcome
                );
            }
            if report.status != ValidationStatus::Complete {
                warn!("Job '{}' could not be validated: {:?}", job, report.status);
            }
            Ok(report.is_ok())
        }

        Command::ConvertLegacy { base_dir } => {
            let mut plan = config
                .map(|c| c.conversion.to_plan())
                .unwrap_or_else(|| Utf16LeToUtf8Converter::default_plan("."));
            if let Some(base_dir) = base_dir {
                plan.base_dir = base_dir;
            }

            let report = plan.run(&Utf16LeToUtf8Converter::new());
            Ok(summarize(&report))
        }

        Command::ConvertJob {
            job,
            format,
            primary,
            backup,
        } => {
            let location = job_location(config.as_ref(), &job, primary, backup)?;
            let format = match format {
                Some(name) => name.parse::<TextFormat>()?,
                None => location.file_format(),
            };

            info!("Converting job '{}' to {}", job, format);
            let report = convert_job_files(&location, format);
            Ok(summarize(&report))
        }
    }
}

/// Loads the settings file named on the command line, or the default one when
/// it exists.
fn load_settings(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    if let Some(path) = path {
        return load_config(path).map(Some);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn job_location(
    config: Option<&Config>,
    job: &str,
    primary: Option<PathBuf>,
    backup: Option<PathBuf>,
) -> Result<JobLocation, ConfigError> {
    let primary = primary
        .or_else(|| config.map(|c| PathBuf::from(&c.primary_data_path)))
        .ok_or_else(|| ConfigError::Validation {
            message: "No primary data path; pass --primary or set primary_data_path".to_string(),
        })?;
    let backup = backup
        .or_else(|| config.map(|c| PathBuf::from(&c.backup_data_path)))
        .ok_or_else(|| ConfigError::Validation {
            message: "No backup data path; pass --backup or set backup_data_path".to_string(),
        })?;

    Ok(JobLocation::new(primary, backup, job))
}

fn summarize(report: &ConversionReport) -> bool {
    if report.already_completed {
        info!("Conversion already completed, nothing to do");
        return true;
    }

    info!("{} file(s) converted", report.committed().count());
    for failure in report.failures() {
        warn!("{:?} failed for {}", failure.step, failure.source.display());
    }
    report.is_success()
}
