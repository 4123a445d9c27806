//! GeoJSON dataset loading.
//!
//! Coordinates are taken as WGS84 (EPSG:4326) per RFC 7946. A legacy `crs`
//! member is recorded and logged but never applied.

use anyhow::{Context, Result};
use geo::Geometry;
use geojson::GeoJson;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::Attributes;

/// A feature with its geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Position of the feature in the source file
    pub index: usize,
    pub geometry: Geometry<f64>,
    pub attributes: Attributes,
    /// Top-level GeoJSON `id` member
    pub feature_id: Option<Value>,
}

impl Feature {
    pub fn new(index: usize, geometry: Geometry<f64>, attributes: Attributes) -> Self {
        Self {
            index,
            geometry,
            attributes,
            feature_id: None,
        }
    }

    /// Identifier of this feature: the `id_attribute` attribute, else the
    /// GeoJSON feature id, else `"N/A"`.
    pub fn id_value(&self, id_attribute: &str) -> Value {
        if let Some(value) = self.attributes.get(id_attribute).filter(|v| !v.is_null()) {
            return value.clone();
        }
        self.feature_id
            .clone()
            .unwrap_or_else(|| Value::String("N/A".to_string()))
    }
}

/// A loaded GeoJSON file
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub features: Vec<Feature>,
    /// Legacy `crs` member, if the file declared one
    pub crs: Option<Value>,
    /// Features dropped because they had no geometry
    pub skipped: usize,
}

impl Dataset {
    pub fn new(path: impl Into<PathBuf>, features: Vec<Feature>) -> Self {
        Self {
            path: path.into(),
            features,
            crs: None,
            skipped: 0,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read GeoJSON file {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse GeoJSON text. Accepts a FeatureCollection, a single Feature or a
    /// bare Geometry.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let geojson: GeoJson = content
            .parse()
            .with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))?;

        let (raw_features, foreign_members) = match geojson {
            GeoJson::FeatureCollection(collection) => {
                (collection.features, collection.foreign_members)
            }
            GeoJson::Feature(feature) => {
                let foreign = feature.foreign_members.clone();
                (vec![feature], foreign)
            }
            GeoJson::Geometry(geometry) => (
                vec![geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: None,
                    foreign_members: None,
                }],
                None,
            ),
        };

        let crs = foreign_members.and_then(|members| members.get("crs").cloned());
        match &crs {
            Some(crs) => tracing::info!(
                path = %path.display(),
                crs = %crs,
                "Dataset declares a legacy crs member; coordinates are used as-is"
            ),
            None => tracing::debug!(
                path = %path.display(),
                "No crs declared, assuming EPSG:4326"
            ),
        }

        let mut features = Vec::with_capacity(raw_features.len());
        let mut skipped = 0;

        for (index, raw) in raw_features.into_iter().enumerate() {
            let Some(geometry) = raw.geometry else {
                tracing::warn!(path = %path.display(), index, "Skipping feature without geometry");
                skipped += 1;
                continue;
            };

            let geometry = Geometry::<f64>::try_from(geometry).with_context(|| {
                format!(
                    "Feature {} in {} has an unsupported geometry",
                    index,
                    path.display()
                )
            })?;

            let feature_id = raw.id.map(|id| match id {
                geojson::feature::Id::String(s) => Value::String(s),
                geojson::feature::Id::Number(n) => Value::Number(n),
            });

            features.push(Feature {
                index,
                geometry,
                attributes: raw.properties.unwrap_or_default(),
                feature_id,
            });
        }

        tracing::debug!(
            path = %path.display(),
            features = features.len(),
            skipped,
            "Loaded dataset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            features,
            crs,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// File name without extension, used to name output files
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string())
    }
}
