//! Tests for the config subcommands

use crate::support::harness::{stderr, stdout, TestHarness};

#[test]
fn test_config_init_refuses_overwrite() {
    let harness = TestHarness::new();

    let output = harness.run(&["config", "init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(harness.read("topotest.json").contains("\"global_settings\""));

    let output = harness.run(&["config", "init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = harness.run(&["config", "init", "--force"]);
    assert!(output.status.success());
}

#[test]
fn test_config_init_custom_path() {
    let harness = TestHarness::new();
    let output = harness.run(&["config", "init", "configs/project.json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(harness.path().join("configs").join("project.json").exists());
}

#[test]
fn test_config_validate_fixture() {
    let harness = TestHarness::with_fixtures(&[]);
    let output = harness.run(&["config", "validate"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Configuration is valid"));
}

#[test]
fn test_config_validate_reports_errors() {
    let harness = TestHarness::new();
    harness.write(
        "bad.json",
        r#"{
            "global_settings": {
                "enabled_checks": { "gaps": true, "slivers": true },
                "tolerances": { "gap": -1 }
            },
            "dataset_rules": { "roads": {} }
        }"#,
    );

    let output = harness.run(&["config", "validate", "--config", "bad.json"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("unknown check 'slivers'"));
    assert!(out.contains("error(s)"));
}

#[test]
fn test_config_validate_without_file() {
    let harness = TestHarness::new();
    let output = harness.run(&["config", "validate"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("built-in defaults"));
}

#[test]
fn test_config_show_dataset_type() {
    let harness = TestHarness::with_fixtures(&[]);
    let output = harness.run(&["config", "show", "-t", "roads"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Dataset types: buildings, parcels, roads"));
    assert!(out.contains("\"allow_intersection_if\""));
    assert!(out.contains("\"bridge\""));
}

#[test]
fn test_config_from_env_var() {
    let harness = TestHarness::new();
    harness.write("elsewhere/rules.json", &crate::support::fixtures::load_fixture("topotest.json"));

    let output = std::process::Command::new(&harness.topotest_binary)
        .args(["config", "show"])
        .current_dir(harness.path())
        .env("TOPOTEST_CONFIG", harness.path().join("elsewhere").join("rules.json"))
        .env("NO_COLOR", "1")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("rules.json"));
}
