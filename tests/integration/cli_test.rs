//! End-to-end tests driving the topotest binary

use serde_json::Value;

use crate::support::harness::{stderr, stdout, TestHarness};

#[test]
fn test_check_writes_issue_files() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);
    let output = harness.run(&["check", "roads.geojson", "-t", "roads"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Topology Summary for dataset: roads"));
    assert!(out.contains("Intersections: 2 issues found"));
    assert!(out.contains("Self Intersections: 1 issues found"));
    assert!(out.contains("Percentage intersected: 60.00%"));

    let dir = harness.path().join("TopologyTest_Output");
    assert!(dir.join("roads_intersections.geojson").exists());
    assert!(dir.join("roads_self_intersections.geojson").exists());
    assert!(dir.join("roads_dangles.geojson").exists());
    assert!(!dir.join("roads_overlaps.geojson").exists());
}

#[test]
fn test_fail_on_issues_sets_exit_code() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);
    let output = harness.run(&["check", "roads.geojson", "-t", "roads", "--no-save", "--fail-on-issues"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!harness.path().join("TopologyTest_Output").exists());
}

#[test]
fn test_multiple_inputs_as_json() {
    let harness = TestHarness::with_fixtures(&["roads.geojson", "buildings.geojson"]);
    let output = harness.run(&[
        "check",
        "--input",
        "roads=roads.geojson",
        "--input",
        "buildings=buildings.geojson",
        "--format",
        "json",
        "--no-save",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let reports: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let reports = reports.as_array().unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["type"], "roads");
    assert_eq!(reports[1]["type"], "buildings");
    assert_eq!(reports[1]["checks"]["containment"], 1);
    assert_eq!(reports[1]["checks"]["overlaps"], 1);
    assert!(reports[1]["output_files"].as_object().unwrap().is_empty());
}

#[test]
fn test_glob_input_and_output_dir() {
    let harness = TestHarness::with_fixtures(&["parcels.geojson"]);
    let output = harness.run(&["check", "parc*.geojson", "-t", "parcels", "--output-dir", "out"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Gaps: 1 issues found"));
    assert!(harness.path().join("out").join("parcels_gaps.geojson").exists());
}

#[test]
fn test_skip_and_only() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);

    let output = harness.run(&["check", "roads.geojson", "-t", "roads", "--no-save", "--skip", "intersections,dangles"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(!out.lines().any(|line| line.starts_with("Intersections:")));
    assert!(!out.contains("Dangles:"));
    assert!(!out.contains("Geometries intersected"));
    assert!(out.contains("Self Intersections: 1 issues found"));

    let output = harness.run(&["check", "roads.geojson", "-t", "roads", "--no-save", "--only", "dangles"]);
    let out = stdout(&output);
    assert!(out.contains("Dangles: 5 issues found"));
    assert!(!out.contains("Overlaps:"));
}

#[test]
fn test_unknown_check_name_fails() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);
    let output = harness.run(&["check", "roads.geojson", "-t", "roads", "--only", "holes"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown check 'holes'"));
}

#[test]
fn test_unknown_dataset_type_fails() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);
    let output = harness.run(&["check", "roads.geojson", "-t", "rivers"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Dataset type 'rivers' not found in config"));
}

#[test]
fn test_malformed_input_flag_fails() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);
    let output = harness.run(&["check", "--input", "roads.geojson"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("expected TYPE=PATH"));
}

#[test]
fn test_defaults_without_config_file() {
    let harness = TestHarness::new();
    harness.write("roads.geojson", &crate::support::fixtures::load_fixture("roads.geojson"));

    let output = harness.run(&["check", "roads.geojson", "-t", "anything", "--no-save", "--only", "intersections"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Intersections: 4 issues found"));
}

#[test]
fn test_save_config_persists_overrides() {
    let harness = TestHarness::with_fixtures(&["parcels.geojson"]);
    let output = harness.run(&[
        "check",
        "parcels.geojson",
        "-t",
        "parcels",
        "--gap-tolerance",
        "0.5",
        "--skip",
        "containment",
        "--save-config",
        "--no-save",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let config: Value = serde_json::from_str(&harness.read("topotest.json")).unwrap();
    assert_eq!(config["global_settings"]["tolerances"]["gap"], 0.5);
    assert_eq!(config["global_settings"]["enabled_checks"]["containment"], false);
    assert_eq!(config["global_settings"]["enabled_checks"]["gaps"], true);
    assert!(config["dataset_rules"]["roads"].is_object());
}

#[test]
fn test_summary_writes_nothing() {
    let harness = TestHarness::with_fixtures(&["buildings.geojson"]);
    let output = harness.run(&["summary", "buildings.geojson", "-t", "buildings"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("Topology Summary for dataset: buildings"));
    assert!(out.contains("Containment: 1 issues found"));
    assert!(!harness.path().join("TopologyTest_Output").exists());
}

#[test]
fn test_intersections_legacy_report() {
    let harness = TestHarness::with_fixtures(&["roads.geojson"]);
    let output = harness.run(&["intersections", "roads.geojson", "-t", "roads"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Invalid intersections found in dataset: roads"));
    assert!(out.contains("Number of invalid intersections: 2"));

    let saved: Value = serde_json::from_str(
        &harness.read("TopologyTest_Output/invalid_intersections_roads.geojson"),
    )
    .unwrap();
    assert_eq!(saved["features"][0]["geometry"]["type"], "MultiLineString");
    assert_eq!(saved["features"][0]["properties"]["feature1_id"], "r1");
}

#[test]
fn test_missing_input_file_fails() {
    let harness = TestHarness::with_fixtures(&[]);
    let output = harness.run(&["check", "nope.geojson", "-t", "roads"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read GeoJSON file"));
}

#[test]
fn test_version_and_completion() {
    let harness = TestHarness::new();

    let output = harness.run(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("topotest {}", env!("CARGO_PKG_VERSION"))
    );

    let output = harness.run(&["version", "-v"]);
    assert!(stdout(&output).contains("commit:"));

    let output = harness.run(&["completion", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("topotest"));
}
