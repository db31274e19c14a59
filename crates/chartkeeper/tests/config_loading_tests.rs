//! Table-driven tests for configuration loading and validation.

mod common;

use chartkeeper::config::{load_config, load_config_from_str};
use chartkeeper::Utf16LeToUtf8Converter;

use common::TestHarness;

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/data/primary",
            "backup_data_path": "/data/backup"
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "D:\\Chart Data",
            "backup_data_path": "E:\\Chart Data Backup",
            "default_job_info_config": "templates/Job Info Window.ini",
            "conversion": {
                "base_directory": "/opt/chart",
                "temp_suffix": " NEW",
                "log_file": "conversion.log",
                "flag_file": "converted.flag",
                "targets": [
                    { "directory": ".", "extension": "ini" },
                    { "directory": "languages", "extension": "language" }
                ]
            }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_empty_targets",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b",
            "conversion": { "targets": [] }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: r#"{ "version": "1.0", "#,
        should_succeed: false,
        expected_error: Some("Failed to parse config JSON"),
    },
    ConfigTestCase {
        name: "missing_backup_path",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/p"
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "wrong_type",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": 12,
            "backup_data_path": "/b"
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_version",
        config_json: r#"{
            "version": "2.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b"
        }"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version: 2.0"),
    },
    ConfigTestCase {
        name: "blank_temp_suffix",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b",
            "conversion": { "temp_suffix": "   " }
        }"#,
        should_succeed: false,
        expected_error: Some("temp_suffix must not be blank"),
    },
    ConfigTestCase {
        name: "empty_temp_suffix",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b",
            "conversion": { "temp_suffix": "" }
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "duplicate_target",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b",
            "conversion": {
                "targets": [
                    { "directory": "presets", "extension": "preset" },
                    { "directory": "presets", "extension": "PRESET" }
                ]
            }
        }"#,
        should_succeed: false,
        expected_error: Some("Duplicate target"),
    },
    ConfigTestCase {
        name: "target_missing_extension",
        config_json: r#"{
            "version": "1.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b",
            "conversion": { "targets": [{ "directory": "presets" }] }
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
];

#[test]
fn test_json_config_loading() {
    for test_case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(test_case.config_json);

        if test_case.should_succeed {
            assert!(
                result.is_ok(),
                "Test '{}': Expected success but got error: {:?}",
                test_case.name,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Test '{}': Expected error but got success",
                test_case.name
            );

            if let Some(expected_error) = test_case.expected_error {
                let error_msg = result.err().unwrap().to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}': Expected error containing '{}', got '{}'",
                    test_case.name,
                    expected_error,
                    error_msg
                );
            }
        }
    }
}

#[test]
fn test_config_file_drives_conversion() {
    let harness = TestHarness::new();
    let main = harness.write_legacy("Main.ini", &["[Main]", "A=1"]);
    let language = harness.write_legacy("languages/English.language", &["[Labels]", "Start=Start"]);
    let config_path = harness.write_app_file(
        "settings.json",
        br#"{
            "version": "1.0",
            "primary_data_path": "/p",
            "backup_data_path": "/b",
            "conversion": {
                "temp_suffix": " NEW",
                "log_file": "conversion.log",
                "flag_file": null,
                "targets": [
                    { "directory": ".", "extension": "ini" },
                    { "directory": "languages", "extension": "language" }
                ]
            }
        }"#,
    );

    let config = load_config(&config_path).unwrap();
    let mut plan = config.conversion.to_plan();
    plan.base_dir = harness.app_dir.clone();
    let report = plan.run(&Utf16LeToUtf8Converter::new());

    assert!(report.is_success());
    assert!(!report.flag_created);
    assert_eq!(harness.read_utf8_lines(&main), vec!["", "[Main]", "A=1"]);
    assert_eq!(
        harness.read_utf8_lines(&language),
        vec!["", "[Labels]", "Start=Start"]
    );
    assert!(harness.app_dir.join("conversion.log").exists());
}

#[test]
fn test_missing_config_file() {
    let harness = TestHarness::new();

    let result = load_config(harness.temp_path().join("nope.json"));

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Failed to read config file"));
}
