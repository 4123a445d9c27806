//! Topology checks over a loaded dataset.
//!
//! [`TopologyTest`] pairs a dataset with the effective settings of its dataset
//! type and runs the six checks. Candidate pairs for the pairwise checks come
//! from an R-tree built once over the feature envelopes.

use anyhow::Result;
use std::cell::OnceCell;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::{Config, DatasetSettings};
use crate::dataset::{Dataset, Feature};
use crate::geometry::SpatialIndex;

mod dangles;
mod gaps;
pub mod issues;
mod pairs;

pub use issues::*;

// ============================================================================
// CHECK KINDS
// ============================================================================

/// A topology check. Declaration order is run and report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckKind {
    Intersections,
    SelfIntersections,
    Gaps,
    Dangles,
    Overlaps,
    Containment,
}

impl CheckKind {
    pub const ALL: [CheckKind; 6] = [
        CheckKind::Intersections,
        CheckKind::SelfIntersections,
        CheckKind::Gaps,
        CheckKind::Dangles,
        CheckKind::Overlaps,
        CheckKind::Containment,
    ];

    /// Config and file-name form, e.g. `self_intersections`
    pub fn name(self) -> &'static str {
        match self {
            CheckKind::Intersections => "intersections",
            CheckKind::SelfIntersections => "self_intersections",
            CheckKind::Gaps => "gaps",
            CheckKind::Dangles => "dangles",
            CheckKind::Overlaps => "overlaps",
            CheckKind::Containment => "containment",
        }
    }

    /// Report form, e.g. `Self Intersections`
    pub fn title(self) -> &'static str {
        match self {
            CheckKind::Intersections => "Intersections",
            CheckKind::SelfIntersections => "Self Intersections",
            CheckKind::Gaps => "Gaps",
            CheckKind::Dangles => "Dangles",
            CheckKind::Overlaps => "Overlaps",
            CheckKind::Containment => "Containment",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CheckKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        CheckKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown check '{}'. Valid checks: {}",
                    s,
                    CheckKind::names().join(", ")
                )
            })
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Issues per check. A check that did not run is `None`.
#[derive(Debug, Clone, Default)]
pub struct TopologyResults {
    pub intersections: Option<Vec<IntersectionIssue>>,
    pub self_intersections: Option<Vec<SelfIntersectionIssue>>,
    pub gaps: Option<Vec<GapIssue>>,
    pub dangles: Option<Vec<DangleIssue>>,
    pub overlaps: Option<Vec<OverlapIssue>>,
    pub containment: Option<Vec<ContainmentIssue>>,
}

impl TopologyResults {
    /// Number of issues found by a check, `None` if it did not run
    pub fn count(&self, kind: CheckKind) -> Option<usize> {
        match kind {
            CheckKind::Intersections => self.intersections.as_ref().map(Vec::len),
            CheckKind::SelfIntersections => self.self_intersections.as_ref().map(Vec::len),
            CheckKind::Gaps => self.gaps.as_ref().map(Vec::len),
            CheckKind::Dangles => self.dangles.as_ref().map(Vec::len),
            CheckKind::Overlaps => self.overlaps.as_ref().map(Vec::len),
            CheckKind::Containment => self.containment.as_ref().map(Vec::len),
        }
    }

    /// Checks that ran, in run order
    pub fn kinds(&self) -> Vec<CheckKind> {
        CheckKind::ALL
            .into_iter()
            .filter(|kind| self.count(*kind).is_some())
            .collect()
    }

    pub fn total_issues(&self) -> usize {
        CheckKind::ALL
            .into_iter()
            .filter_map(|kind| self.count(kind))
            .sum()
    }

    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }
}

// ============================================================================
// TOPOLOGY TEST
// ============================================================================

/// A dataset under test with the settings of its dataset type
pub struct TopologyTest {
    pub dataset: Dataset,
    pub dataset_type: String,
    pub settings: DatasetSettings,
    index: SpatialIndex,
    intersections: OnceCell<Vec<IntersectionIssue>>,
}

impl TopologyTest {
    pub fn new(dataset: Dataset, dataset_type: impl Into<String>, settings: DatasetSettings) -> Self {
        let index = SpatialIndex::build(dataset.features.iter().map(|f| &f.geometry));
        Self {
            dataset,
            dataset_type: dataset_type.into(),
            settings,
            index,
            intersections: OnceCell::new(),
        }
    }

    /// Load a GeoJSON file and resolve the settings for `dataset_type`
    pub fn open(path: &Path, dataset_type: &str, config: &Config) -> Result<Self> {
        let settings = config.settings_for(dataset_type)?;
        let dataset = Dataset::load(path)?;
        tracing::info!(
            path = %path.display(),
            dataset_type,
            features = dataset.len(),
            "Opened dataset"
        );
        Ok(Self::new(dataset, dataset_type, settings))
    }

    pub fn features(&self) -> &[Feature] {
        &self.dataset.features
    }

    /// Identifier of the feature at `index` per the configured id attribute
    pub fn feature_id(&self, index: usize) -> serde_json::Value {
        self.dataset.features[index].id_value(&self.settings.id_attribute)
    }

    /// Intersections not legalized by `allow_intersection_if`. Computed once.
    pub fn check_intersections(&self) -> &[IntersectionIssue] {
        self.intersections.get_or_init(|| {
            let found = pairs::intersections(self.features(), &self.index, &self.settings);
            tracing::debug!(count = found.len(), "Checked intersections");
            found
        })
    }

    /// Whether the intersection pass has run
    pub fn intersections_checked(&self) -> bool {
        self.intersections.get().is_some()
    }

    /// Features whose geometry is not simple
    pub fn check_self_intersections(&self) -> Vec<SelfIntersectionIssue> {
        let found: Vec<SelfIntersectionIssue> = self
            .features()
            .iter()
            .enumerate()
            .filter_map(|(position, feature)| {
                let locations = crate::geometry::self_intersections(&feature.geometry);
                (!locations.is_empty()).then_some(SelfIntersectionIssue {
                    feature: position,
                    locations,
                })
            })
            .collect();
        tracing::debug!(count = found.len(), "Checked self intersections");
        found
    }

    /// Holes in the union of all polygons that are not holes of an input polygon
    pub fn check_gaps(&self) -> Vec<GapIssue> {
        let found = gaps::gaps(self.features(), &self.settings);
        tracing::debug!(count = found.len(), "Checked gaps");
        found
    }

    /// Open linestring endpoints connected to nothing
    pub fn check_dangles(&self) -> Vec<DangleIssue> {
        let found = dangles::dangles(self.features(), &self.index);
        tracing::debug!(count = found.len(), "Checked dangles");
        found
    }

    /// Same-dimension features sharing interior beyond the overlap tolerance
    pub fn check_overlaps(&self) -> Vec<OverlapIssue> {
        let found = pairs::overlaps(self.features(), &self.index, &self.settings);
        tracing::debug!(count = found.len(), "Checked overlaps");
        found
    }

    /// Features completely inside another feature, as `(container, contained)`.
    /// Both directions are checked. Two equal geometries are reported once,
    /// with the earlier feature as the container.
    pub fn check_containment(&self) -> Vec<ContainmentIssue> {
        let found = pairs::containment(self.features(), &self.index);
        tracing::debug!(count = found.len(), "Checked containment");
        found
    }

    /// Run every enabled check
    pub fn validate_topology(&self) -> TopologyResults {
        self.validate_topology_with(|_| {})
    }

    /// Run every enabled check in order, calling `before_check` ahead of each
    pub fn validate_topology_with(&self, mut before_check: impl FnMut(CheckKind)) -> TopologyResults {
        let mut results = TopologyResults::default();

        for kind in self.settings.enabled_checks.enabled() {
            before_check(kind);
            match kind {
                CheckKind::Intersections => {
                    results.intersections = Some(self.check_intersections().to_vec())
                }
                CheckKind::SelfIntersections => {
                    results.self_intersections = Some(self.check_self_intersections())
                }
                CheckKind::Gaps => results.gaps = Some(self.check_gaps()),
                CheckKind::Dangles => results.dangles = Some(self.check_dangles()),
                CheckKind::Overlaps => results.overlaps = Some(self.check_overlaps()),
                CheckKind::Containment => results.containment = Some(self.check_containment()),
            }
        }

        tracing::info!(
            dataset_type = %self.dataset_type,
            issues = results.total_issues(),
            "Topology validation finished"
        );
        results
    }
}
