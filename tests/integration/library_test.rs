//! Library-level tests over the fixture datasets

use serde_json::Value;
use std::fs;
use tempfile::TempDir;

use topotest::config::Config;
use topotest::topology::{CheckKind, TopologyTest};

use crate::common::{copy_fixture, fixture_config, fixture_path};

fn open(name: &str, dataset_type: &str) -> TopologyTest {
    TopologyTest::open(&fixture_path(name), dataset_type, &fixture_config())
        .expect("Failed to open fixture")
}

#[test]
fn test_roads_with_bridge_rule() {
    let test = open("roads.geojson", "roads");
    let results = test.validate_topology();

    assert_eq!(
        results.kinds(),
        vec![
            CheckKind::Intersections,
            CheckKind::SelfIntersections,
            CheckKind::Dangles,
            CheckKind::Overlaps,
        ]
    );

    let intersections = results.intersections.as_ref().unwrap();
    let pairs: Vec<(Value, Value)> = intersections
        .iter()
        .map(|issue| (test.feature_id(issue.a), test.feature_id(issue.b)))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Value::from("r1"), Value::from("r4")),
            (Value::from("r3"), Value::from("r4")),
        ]
    );

    assert_eq!(results.count(CheckKind::SelfIntersections), Some(1));
    assert_eq!(results.count(CheckKind::Dangles), Some(5));
    assert_eq!(results.count(CheckKind::Overlaps), Some(0));
}

#[test]
fn test_roads_without_config_flags_every_crossing() {
    let test = TopologyTest::open(&fixture_path("roads.geojson"), "roads", &Config::defaults()).unwrap();
    assert_eq!(test.check_intersections().len(), 4);
}

#[test]
fn test_buildings() {
    let test = open("buildings.geojson", "buildings");
    let results = test.validate_topology();

    assert_eq!(results.count(CheckKind::Intersections), Some(2));
    assert_eq!(results.count(CheckKind::Gaps), Some(0));
    assert_eq!(results.count(CheckKind::Dangles), None);

    let overlaps = results.overlaps.as_ref().unwrap();
    assert_eq!(overlaps.len(), 1);
    assert!((overlaps[0].measure - 2.0).abs() < 1e-9);

    let containment = results.containment.as_ref().unwrap();
    assert_eq!(containment.len(), 1);
    assert_eq!(test.feature_id(containment[0].container), Value::from("b3"));
    assert_eq!(test.feature_id(containment[0].contained), Value::from("b4"));
}

#[test]
fn test_parcels_gap() {
    let test = open("parcels.geojson", "parcels");
    let results = test.validate_topology();

    assert_eq!(results.kinds(), vec![CheckKind::Gaps]);
    let gaps = results.gaps.as_ref().unwrap();
    assert_eq!(gaps.len(), 1);
    assert!((gaps[0].area - 1.0).abs() < 1e-9);
}

#[test]
fn test_buildings_summary() {
    let test = open("buildings.geojson", "buildings");
    assert_eq!(
        test.report_summary(),
        "Topology Summary for dataset: buildings\n\
         Total geometries: 4\n\
         \n\
         Intersections: 2 issues found\n\
         Self Intersections: 0 issues found\n\
         Gaps: 0 issues found\n\
         Overlaps: 1 issues found\n\
         Containment: 1 issues found\n\
         \n\
         Geometries intersected: 4\n\
         Average intersections per geometry: 0.50\n\
         Percentage intersected: 100.00%"
    );
}

#[test]
fn test_save_results_next_to_input() {
    let tmp = TempDir::new().unwrap();
    let path = copy_fixture("buildings.geojson", tmp.path());
    let test = TopologyTest::open(&path, "buildings", &fixture_config()).unwrap();

    let results = test.validate_topology();
    let written = test.save_topology_results(&results, None).unwrap();
    let out = tmp.path().join("TopologyTest_Output");

    assert_eq!(written.len(), 3);
    assert!(out.join("buildings_intersections.geojson").exists());
    assert!(out.join("buildings_overlaps.geojson").exists());

    let containment: Value =
        serde_json::from_str(&fs::read_to_string(&written[&CheckKind::Containment]).unwrap()).unwrap();
    let props = &containment["features"][0]["properties"];
    assert_eq!(props["container_id"], "b3");
    assert_eq!(props["contained_id"], "b4");
    assert_eq!(props["contained_attributes"]["use"], "shed");
    assert_eq!(containment["features"][0]["geometry"]["type"], "Polygon");
}

#[test]
fn test_unknown_dataset_type() {
    let err = TopologyTest::open(&fixture_path("roads.geojson"), "rivers", &fixture_config())
        .err()
        .unwrap();
    assert!(err.to_string().contains("Dataset type 'rivers' not found in config"));
}
