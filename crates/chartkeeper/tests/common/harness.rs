//! Test harness for isolated test execution.
//!
//! Every harness owns a temp tree with a primary data root, a backup data
//! root and an application folder holding settings files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;

use chartkeeper::encoding::{TextFormat, TextLines};
use chartkeeper::job::{JobLocation, DEFAULT_JOB_INFO_CONFIG, REQUIRED_FILES};

pub const DEFAULT_TEMPLATE_CONTENT: &str = "[Job Info Window]\nFields=6\n";

/// Encodes `body` the way the application wrote settings files before the
/// UTF-8 migration: UTF-16LE, a line holding only the byte order mark, two
/// explanatory comment lines and a blank line.
pub fn legacy_bytes(body: &[&str]) -> Vec<u8> {
    let mut text = String::from("\u{FEFF}\r\n");
    text.push_str(";Do not erase blank line above - has hidden code needed by UTF-16 files.\r\n");
    text.push_str(";To make a new file, copy an existing ini file and change only data below this line.\r\n");
    text.push_str("\r\n");
    for line in body {
        text.push_str(line);
        text.push_str("\r\n");
    }
    TextFormat::Utf16Le.encode(&text)
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub primary_root: PathBuf,
    pub backup_root: PathBuf,
    pub app_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let primary = temp_dir.child("primary");
        let backup = temp_dir.child("backup");
        let app = temp_dir.child("app");
        primary.create_dir_all().expect("Failed to create primary root");
        backup.create_dir_all().expect("Failed to create backup root");
        app.create_dir_all().expect("Failed to create app dir");

        Self {
            primary_root: primary.path().to_path_buf(),
            backup_root: backup.path().to_path_buf(),
            app_dir: app.path().to_path_buf(),
            temp_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn location(&self, job: &str) -> JobLocation {
        JobLocation::new(&self.primary_root, &self.backup_root, job)
    }

    /// Creates `job` in both roots with all required files. Primary and backup
    /// copies get different content so tests can tell which one survived.
    pub fn create_job(&self, job: &str) -> JobLocation {
        let location = self.location(job);
        std::fs::create_dir_all(location.primary_job_dir()).expect("Failed to create primary job");
        std::fs::create_dir_all(location.backup_job_dir()).expect("Failed to create backup job");

        for file in &REQUIRED_FILES {
            std::fs::write(location.primary_file(file), format!("primary {}", file.suffix))
                .expect("Failed to write primary file");
            std::fs::write(location.backup_file(file), format!("backup {}", file.suffix))
                .expect("Failed to write backup file");
        }
        location
    }

    /// Writes the default job info window template into the app folder.
    pub fn write_default_template(&self) -> PathBuf {
        let child = self.temp_dir.child("app").child(DEFAULT_JOB_INFO_CONFIG);
        child
            .write_str(DEFAULT_TEMPLATE_CONTENT)
            .expect("Failed to write template");
        child.path().to_path_buf()
    }

    /// Writes a legacy UTF-16LE settings file at `relative` under the app folder.
    pub fn write_legacy(&self, relative: &str, body: &[&str]) -> PathBuf {
        let child = self.temp_dir.child("app").child(relative);
        child
            .write_binary(&legacy_bytes(body))
            .expect("Failed to write legacy file");
        child.path().to_path_buf()
    }

    pub fn write_app_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let child = self.temp_dir.child("app").child(relative);
        child.write_binary(content).expect("Failed to write app file");
        child.path().to_path_buf()
    }

    pub fn read_utf8_lines(&self, path: &Path) -> Vec<String> {
        let text = std::fs::read_to_string(path).expect("Failed to read file");
        TextLines::new(&text).map(str::to_string).collect()
    }

    pub fn read_repair_log(&self, location: &JobLocation) -> String {
        std::fs::read_to_string(location.repair_log_path()).unwrap_or_default()
    }
}
