//! GeoJSON output of topology issues.
//!
//! Each non-empty check is written to `<output dir>/<input stem>_<check>.geojson`.
//! The output directory defaults to `<output_folder_name>` next to the input
//! file.

use anyhow::{Context, Result};
use geo::{Coord, Geometry, GeometryCollection, MultiLineString, MultiPolygon};
use geojson::{Feature as GeoJsonFeature, FeatureCollection};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::Attributes;
use crate::topology::{CheckKind, TopologyResults, TopologyTest};

impl TopologyTest {
    /// `<input dir>/<output_folder_name>`
    pub fn default_output_dir(&self) -> PathBuf {
        let parent = self
            .dataset
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        parent.join(&self.settings.output_folder_name)
    }

    /// Write one file per check that found issues.
    ///
    /// A failure writing one check is logged and the remaining checks are
    /// still written; only failing to create the output directory is an error.
    pub fn save_topology_results(
        &self,
        results: &TopologyResults,
        output_dir: Option<&Path>,
    ) -> Result<BTreeMap<CheckKind, PathBuf>> {
        let dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output_dir());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let stem = self.dataset.file_stem();
        let mut written = BTreeMap::new();

        for kind in results.kinds() {
            let features = self.issue_features(results, kind);
            if features.is_empty() {
                continue;
            }

            let path = dir.join(format!("{}_{}.geojson", stem, kind.name()));
            match write_collection(&path, features) {
                Ok(()) => {
                    tracing::info!(check = %kind, path = %path.display(), "Saved issues");
                    written.insert(kind, path);
                }
                Err(e) => {
                    tracing::error!(check = %kind, path = %path.display(), error = %format!("{:#}", e), "Failed to save issues");
                }
            }
        }

        Ok(written)
    }

    /// Legacy single-file output of the intersection check:
    /// `invalid_intersections_<dataset_type>.geojson` holding the two
    /// intersecting geometries of each issue.
    pub fn save_invalid_intersections(&self, output_dir: Option<&Path>) -> Result<PathBuf> {
        let dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output_dir());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let features = self
            .check_intersections()
            .iter()
            .map(|issue| {
                let a = &self.features()[issue.a];
                let b = &self.features()[issue.b];

                let mut properties = Map::new();
                properties.insert("status".into(), json!("invalid_intersection"));
                properties.insert("feature1_id".into(), self.feature_id(issue.a));
                properties.insert("feature2_id".into(), self.feature_id(issue.b));
                feature(&combine(&a.geometry, &b.geometry), properties)
            })
            .collect();

        let path = dir.join(format!("invalid_intersections_{}.geojson", self.dataset_type));
        write_collection(&path, features)?;
        Ok(path)
    }

    fn issue_features(&self, results: &TopologyResults, kind: CheckKind) -> Vec<GeoJsonFeature> {
        let features = self.features();

        match kind {
            CheckKind::Intersections => results
                .intersections
                .iter()
                .flatten()
                .map(|issue| {
                    let mut properties = Map::new();
                    properties.insert("status".into(), json!("invalid_intersection"));
                    properties.insert("feature1_id".into(), self.feature_id(issue.a));
                    properties.insert("feature2_id".into(), self.feature_id(issue.b));
                    properties.insert("measure".into(), json!(issue.measure));
                    properties.insert("feature1_attributes".into(), attributes(&features[issue.a].attributes));
                    properties.insert("feature2_attributes".into(), attributes(&features[issue.b].attributes));
                    feature(&issue.geometry, properties)
                })
                .collect(),
            CheckKind::SelfIntersections => results
                .self_intersections
                .iter()
                .flatten()
                .map(|issue| {
                    let source = &features[issue.feature];
                    let mut properties = source.attributes.clone();
                    properties.insert("self_intersection_count".into(), json!(issue.locations.len()));
                    feature(&source.geometry, properties)
                })
                .collect(),
            CheckKind::Gaps => results
                .gaps
                .iter()
                .flatten()
                .map(|issue| {
                    let mut properties = Map::new();
                    properties.insert("type".into(), json!("gap"));
                    properties.insert("area".into(), json!(issue.area));
                    feature(&Geometry::Polygon(issue.polygon.clone()), properties)
                })
                .collect(),
            CheckKind::Dangles => results
                .dangles
                .iter()
                .flatten()
                .map(|issue| {
                    let source = &features[issue.feature];
                    let mut properties = source.attributes.clone();
                    properties.insert("dangling_endpoints".into(), coords(&issue.endpoints));
                    feature(&source.geometry, properties)
                })
                .collect(),
            CheckKind::Overlaps => results
                .overlaps
                .iter()
                .flatten()
                .map(|issue| {
                    let mut properties = Map::new();
                    properties.insert("feature1_id".into(), self.feature_id(issue.a));
                    properties.insert("feature2_id".into(), self.feature_id(issue.b));
                    properties.insert("measure".into(), json!(issue.measure));
                    properties.insert("feature1_attributes".into(), attributes(&features[issue.a].attributes));
                    properties.insert("feature2_attributes".into(), attributes(&features[issue.b].attributes));
                    feature(&issue.geometry, properties)
                })
                .collect(),
            CheckKind::Containment => results
                .containment
                .iter()
                .flatten()
                .map(|issue| {
                    let mut properties = Map::new();
                    properties.insert("container_id".into(), self.feature_id(issue.container));
                    properties.insert("contained_id".into(), self.feature_id(issue.contained));
                    properties.insert(
                        "container_attributes".into(),
                        attributes(&features[issue.container].attributes),
                    );
                    properties.insert(
                        "contained_attributes".into(),
                        attributes(&features[issue.contained].attributes),
                    );
                    feature(&features[issue.contained].geometry, properties)
                })
                .collect(),
        }
    }
}

/// Both geometries of a pair as one: MultiLineString for two linestrings,
/// MultiPolygon for two polygons, GeometryCollection otherwise
fn combine(a: &Geometry<f64>, b: &Geometry<f64>) -> Geometry<f64> {
    match (a, b) {
        (Geometry::LineString(a), Geometry::LineString(b)) => {
            Geometry::MultiLineString(MultiLineString::new(vec![a.clone(), b.clone()]))
        }
        (Geometry::Polygon(a), Geometry::Polygon(b)) => {
            Geometry::MultiPolygon(MultiPolygon::new(vec![a.clone(), b.clone()]))
        }
        _ => Geometry::GeometryCollection(GeometryCollection::new_from(vec![a.clone(), b.clone()])),
    }
}

fn feature(geometry: &Geometry<f64>, properties: Map<String, Value>) -> GeoJsonFeature {
    GeoJsonFeature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn attributes(attributes: &Attributes) -> Value {
    Value::Object(attributes.clone())
}

fn coords(coords: &[Coord<f64>]) -> Value {
    Value::Array(coords.iter().map(|c| json!([c.x, c.y])).collect())
}

fn write_collection(path: &Path, features: Vec<GeoJsonFeature>) -> Result<()> {
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let mut content = serde_json::to_string_pretty(&collection)?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
