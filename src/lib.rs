//! # Topotest - Attribute-aware topology testing
//!
//! Topotest checks GeoJSON datasets for topology errors. Each dataset is tested
//! as a *dataset type* (`roads`, `buildings`, ...) whose rules live in a JSON
//! config file. Rules are attribute-aware: a road crossing another road may be
//! legal when one of them is a bridge.
//!
//! ## Checks
//!
//! - **Intersections**: pairs of features that intersect and are not allowed to
//! - **Self intersections**: features whose geometry is not simple
//! - **Gaps**: unfilled areas enclosed by the polygons of a dataset
//! - **Dangles**: linestring endpoints that connect to nothing
//! - **Overlaps**: same-dimension features sharing interior
//! - **Containment**: features completely inside another feature
//!
//! ## Modules
//!
//! - [`config`] - Config loading, per-dataset merging and validation
//! - [`dataset`] - GeoJSON loading into features
//! - [`rules`] - Attribute conditions that legalize intersections and overlaps
//! - [`geometry`] - Spatial index, intersection construction, simplicity, measures
//! - [`topology`] - The topology checks and their orchestration
//! - [`output`] - GeoJSON files for topology issues
//! - [`report`] - Text and JSON reports
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use topotest::config::Config;
//! use topotest::topology::TopologyTest;
//!
//! let config = Config::load_from(Path::new("topotest.json")).expect("Failed to load config");
//! let test = TopologyTest::open(Path::new("roads.geojson"), "roads", &config)
//!     .expect("Failed to open dataset");
//!
//! println!("{}", test.report_summary());
//! ```

pub mod config;
pub mod dataset;
pub mod geometry;
pub mod output;
pub mod report;
pub mod rules;
pub mod topology;
pub mod ui;
pub mod validation;

/// Default path constants.
pub mod paths {
    /// Project config file looked up in the current directory: `topotest.json`
    pub const CONFIG_FILE: &str = "topotest.json";
    /// Environment variable naming an explicit config file
    pub const CONFIG_ENV: &str = "TOPOTEST_CONFIG";
    /// Default folder (next to the input file) receiving issue files
    pub const OUTPUT_FOLDER: &str = "TopologyTest_Output";
}

/// Generate a UTC timestamp in ISO 8601 format: `YYYY-MM-DDTHH:MM:SSZ`
pub fn utc_now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
