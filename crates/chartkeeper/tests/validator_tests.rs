//! End-to-end tests for job validation and repair.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chartkeeper::job::{
    required_file, FileType, JobLocation, JobValidator, RepairOutcome, ValidationStatus,
    REQUIRED_FILES,
};
use chartkeeper::notify::{ChannelNotifier, ConfigSelector, NoopNotifier, Notifier};

use common::harness::DEFAULT_TEMPLATE_CONTENT;
use common::TestHarness;

/// Counts selection requests and answers with a fixed result.
struct RecordingSelector {
    calls: AtomicUsize,
    answer: bool,
}

impl ConfigSelector for RecordingSelector {
    fn select_configuration(&self, _location: &JobLocation) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Marks a configuration selection request among the recorded notices.
const SELECTION_REQUESTED: &str = "<configuration selection requested>";

/// Records notices and selection requests in the order they happen.
/// Selection is always declined.
#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl Notifier for EventLog {
    fn notify(&self, message: &str) {
        self.events.lock().unwrap().push(message.to_string());
    }
}

impl ConfigSelector for EventLog {
    fn select_configuration(&self, _location: &JobLocation) -> bool {
        self.events.lock().unwrap().push(SELECTION_REQUESTED.to_string());
        false
    }
}

#[test]
fn test_every_file_type_is_restored_from_backup() {
    for file in &REQUIRED_FILES {
        let harness = TestHarness::new();
        let location = harness.create_job("Pipe 12");
        let primary = location.primary_file(file);
        std::fs::remove_file(&primary).unwrap();
        let (notifier, messages) = ChannelNotifier::new();

        let report = JobValidator::new(location.clone(), Arc::new(notifier)).validate();

        assert_eq!(report.status, ValidationStatus::Complete, "{:?}", file.file_type);
        assert_eq!(report.repairs.len(), 1, "{:?}", file.file_type);
        assert_eq!(report.repairs[0].outcome, RepairOutcome::RestoredFromBackup);
        assert_eq!(
            std::fs::read(&primary).unwrap(),
            std::fs::read(location.backup_file(file)).unwrap(),
            "{:?}",
            file.file_type
        );
        assert_eq!(
            messages.try_iter().collect::<Vec<_>>(),
            vec![file.file_type.success_message()]
        );

        let log = harness.read_repair_log(&location);
        assert_eq!(log.matches("Error - file does not exist: ").count(), 1);
        assert_eq!(log.matches("Action - copying from backup folder: ").count(), 1);
        assert!(log.contains(&location.backup_file(file).display().to_string()));
    }
}

#[test]
fn test_every_file_type_lost_in_both_folders() {
    for file in &REQUIRED_FILES {
        let harness = TestHarness::new();
        let template = harness.write_default_template();
        let location = harness.create_job("Pipe 12");
        let primary = location.primary_file(file);
        std::fs::remove_file(&primary).unwrap();
        std::fs::remove_file(location.backup_file(file)).unwrap();
        let events = Arc::new(EventLog::default());

        let report = JobValidator::new(location.clone(), events.clone())
            .with_config_selector(events.clone())
            .with_default_job_info_config(&template)
            .validate();

        let (expected_outcome, expected_events) = match file.file_type {
            FileType::Configuration => (
                RepairOutcome::ManualSelection { selected: false },
                vec![
                    FileType::Configuration.failure_message().unwrap(),
                    SELECTION_REQUESTED,
                ],
            ),
            FileType::JobInfoConfig => (
                RepairOutcome::RestoredDefault,
                vec![
                    "The job information configuration file was damaged or missing \
                     and replaced with the default version.",
                ],
            ),
            other => (RepairOutcome::Failed, vec![other.failure_message().unwrap()]),
        };

        assert_eq!(report.status, ValidationStatus::Complete, "{:?}", file.file_type);
        assert_eq!(report.repairs.len(), 1, "{:?}", file.file_type);
        assert_eq!(report.repairs[0].file_type, file.file_type);
        assert_eq!(report.repairs[0].outcome, expected_outcome, "{:?}", file.file_type);
        assert_eq!(events.take(), expected_events, "{:?}", file.file_type);
        assert_eq!(
            primary.exists(),
            file.file_type == FileType::JobInfoConfig,
            "{:?}",
            file.file_type
        );
        if file.file_type != FileType::JobInfoConfig {
            assert!(!report.is_ok(), "{:?}", file.file_type);
        }
        assert!(harness
            .read_repair_log(&location)
            .contains("Error - cannot copy from backup folder: "));
    }
}

#[test]
fn test_lost_job_info_config_falls_back_to_template() {
    let harness = TestHarness::new();
    let template = harness.write_default_template();
    let location = harness.create_job("Pipe 12");
    let file = required_file(FileType::JobInfoConfig);
    std::fs::remove_file(location.primary_file(file)).unwrap();
    std::fs::remove_file(location.backup_file(file)).unwrap();
    let (notifier, messages) = ChannelNotifier::new();

    let report = JobValidator::new(location.clone(), Arc::new(notifier))
        .with_default_job_info_config(&template)
        .validate();

    assert_eq!(report.repairs[0].outcome, RepairOutcome::RestoredDefault);
    assert_eq!(
        std::fs::read_to_string(location.primary_file(file)).unwrap(),
        DEFAULT_TEMPLATE_CONTENT
    );
    assert_eq!(
        std::fs::read_to_string(location.backup_file(file)).unwrap(),
        DEFAULT_TEMPLATE_CONTENT
    );
    let messages: Vec<String> = messages.try_iter().collect();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("replaced with the default version"));
}

#[test]
fn test_lost_job_info_config_without_template() {
    let harness = TestHarness::new();
    let location = harness.create_job("Pipe 12");
    let file = required_file(FileType::JobInfoConfig);
    std::fs::remove_file(location.primary_file(file)).unwrap();
    std::fs::remove_file(location.backup_file(file)).unwrap();
    let (notifier, messages) = ChannelNotifier::new();

    let report = JobValidator::new(location.clone(), Arc::new(notifier))
        .with_default_job_info_config(harness.app_dir.join("missing template.ini"))
        .validate();

    assert_eq!(report.repairs[0].outcome, RepairOutcome::DefaultRestoreFailed);
    assert!(!location.primary_file(file).exists());
    let messages: Vec<String> = messages.try_iter().collect();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Please contact technical support."));
}

#[test]
fn test_lost_configuration_asks_for_selection() {
    let harness = TestHarness::new();
    let location = harness.create_job("Pipe 12");
    let file = required_file(FileType::Configuration);
    std::fs::remove_file(location.primary_file(file)).unwrap();
    std::fs::remove_file(location.backup_file(file)).unwrap();
    let selector = Arc::new(RecordingSelector {
        calls: AtomicUsize::new(0),
        answer: true,
    });

    let report = JobValidator::new(location, Arc::new(NoopNotifier))
        .with_config_selector(selector.clone())
        .validate();

    assert_eq!(selector.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        report.repairs[0].outcome,
        RepairOutcome::ManualSelection { selected: true }
    );
    assert!(report.is_ok());
}

#[test]
fn test_backup_is_never_repaired_from_primary() {
    let harness = TestHarness::new();
    let location = harness.create_job("Pipe 12");
    let file = required_file(FileType::PieceNumber);
    std::fs::remove_file(location.backup_file(file)).unwrap();

    let report = JobValidator::new(location.clone(), Arc::new(NoopNotifier)).validate();

    assert!(report.repairs.is_empty());
    assert!(!location.backup_file(file).exists());
}

#[test]
fn test_missing_root_not_repaired_without_robust() {
    let harness = TestHarness::new();
    let location = JobLocation::new(
        harness.temp_path().join("unmounted"),
        &harness.backup_root,
        "Pipe 12",
    );
    let (notifier, messages) = ChannelNotifier::new();

    let report = JobValidator::new(location, Arc::new(notifier)).validate();

    assert_eq!(report.status, ValidationStatus::RootPathFailure);
    assert!(!harness.temp_path().join("unmounted").exists());
    assert_eq!(
        messages.try_iter().collect::<Vec<_>>(),
        vec!["The root primary folder was missing and was not repaired."]
    );
}

#[test]
fn test_missing_root_recreated_in_robust_mode() {
    let harness = TestHarness::new();
    let location = harness.create_job("Pipe 12");
    std::fs::remove_dir_all(&harness.primary_root).unwrap();
    let (notifier, messages) = ChannelNotifier::new();

    let report = JobValidator::new(location.clone(), Arc::new(notifier))
        .robust(true)
        .validate();

    assert_eq!(report.status, ValidationStatus::Complete);
    assert!(report.is_ok());
    assert_eq!(report.recreated.len(), 2);
    for file in &REQUIRED_FILES {
        assert!(location.primary_file(file).exists());
    }

    let messages: Vec<String> = messages.try_iter().collect();
    assert_eq!(messages[0], "The root primary folder was missing and was repaired.");
    assert_eq!(messages[1], "The primary job folder was missing and was repaired.");

    let log = harness.read_repair_log(&location);
    assert!(log.contains("Error - root primary path does not exist: "));
    assert!(log.contains("Action - creating root primary path."));
    assert!(log.contains("Action - creating primary job path."));
}

#[test]
fn test_unknown_job_is_unavailable() {
    let harness = TestHarness::new();
    let location = harness.location("Deleted Job");
    let (notifier, messages) = ChannelNotifier::new();

    let report = JobValidator::new(location.clone(), Arc::new(notifier)).validate();

    assert_eq!(report.status, ValidationStatus::JobUnavailable);
    assert_eq!(messages.try_iter().count(), 0);
    assert!(!location.primary_job_dir().exists());
    assert!(!location.backup_job_dir().exists());
}

#[test]
fn test_unopenable_repair_log_aborts() {
    let harness = TestHarness::new();
    let location = harness.create_job("Pipe 12");
    let file = required_file(FileType::JobInfo);
    std::fs::remove_file(location.primary_file(file)).unwrap();
    // A folder where the log file should be
    std::fs::create_dir(location.repair_log_path()).unwrap();

    let report = JobValidator::new(location.clone(), Arc::new(NoopNotifier)).validate();

    assert_eq!(report.status, ValidationStatus::Aborted);
    assert!(report.repairs.is_empty());
    assert!(!location.primary_file(file).exists());
}
