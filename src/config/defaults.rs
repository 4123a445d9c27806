//! Default values and settings structs with default implementations.

use serde::{Deserialize, Serialize};

use crate::geometry::Measure;
use crate::paths::OUTPUT_FOLDER;
use crate::rules::RuleSet;
use crate::topology::CheckKind;

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// DEFAULT VALUE FUNCTIONS
// =========================================================================

default_fn!(default_id_attribute, String, "id".to_string());
default_fn!(default_output_folder_name, String, OUTPUT_FOLDER.to_string());
default_fn!(default_true, bool, true);

// =========================================================================
// SETTINGS STRUCTS WITH DEFAULTS
// =========================================================================

/// Effective settings for one dataset type: `global_settings` overlaid with
/// the keys of `dataset_rules.<type>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetSettings {
    /// Attribute holding the feature identifier (default: `id`)
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    /// Folder created next to the input file for issue files
    #[serde(default = "default_output_folder_name")]
    pub output_folder_name: String,
    /// Intersections measuring less than this are ignored
    #[serde(default)]
    pub min_intersection_area: f64,
    /// Planar (coordinate units) or geodesic (meters) measures
    #[serde(default)]
    pub measure: Measure,
    #[serde(default)]
    pub enabled_checks: EnabledChecks,
    #[serde(default)]
    pub tolerances: Tolerances,
    /// Attribute conditions legalizing intersections and overlaps
    #[serde(flatten)]
    pub rules: RuleSet,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            id_attribute: default_id_attribute(),
            output_folder_name: default_output_folder_name(),
            min_intersection_area: 0.0,
            measure: Measure::default(),
            enabled_checks: EnabledChecks::default(),
            tolerances: Tolerances::default(),
            rules: RuleSet::default(),
        }
    }
}

/// Which topology checks run. Missing entries default to enabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnabledChecks {
    #[serde(default = "default_true")]
    pub intersections: bool,
    #[serde(default = "default_true")]
    pub self_intersections: bool,
    #[serde(default = "default_true")]
    pub gaps: bool,
    #[serde(default = "default_true")]
    pub dangles: bool,
    #[serde(default = "default_true")]
    pub overlaps: bool,
    #[serde(default = "default_true")]
    pub containment: bool,
}

impl Default for EnabledChecks {
    fn default() -> Self {
        Self {
            intersections: true,
            self_intersections: true,
            gaps: true,
            dangles: true,
            overlaps: true,
            containment: true,
        }
    }
}

impl EnabledChecks {
    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::Intersections => self.intersections,
            CheckKind::SelfIntersections => self.self_intersections,
            CheckKind::Gaps => self.gaps,
            CheckKind::Dangles => self.dangles,
            CheckKind::Overlaps => self.overlaps,
            CheckKind::Containment => self.containment,
        }
    }

    pub fn set(&mut self, kind: CheckKind, enabled: bool) {
        let slot = match kind {
            CheckKind::Intersections => &mut self.intersections,
            CheckKind::SelfIntersections => &mut self.self_intersections,
            CheckKind::Gaps => &mut self.gaps,
            CheckKind::Dangles => &mut self.dangles,
            CheckKind::Overlaps => &mut self.overlaps,
            CheckKind::Containment => &mut self.containment,
        };
        *slot = enabled;
    }

    /// Enabled checks in run order
    pub fn enabled(&self) -> Vec<CheckKind> {
        CheckKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

/// Tolerances for gap and overlap detection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Tolerances {
    /// Gaps with an area at or below this are ignored
    #[serde(default)]
    pub gap: f64,
    /// Overlaps must measure more than this to be reported
    #[serde(default)]
    pub overlap: f64,
}

/// Command-line overrides applied on top of the configured settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Run only these checks
    pub only: Option<Vec<CheckKind>>,
    /// Never run these checks
    pub skip: Vec<CheckKind>,
    pub gap_tolerance: Option<f64>,
    pub overlap_tolerance: Option<f64>,
    pub min_intersection_area: Option<f64>,
    pub measure: Option<Measure>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.only.is_none()
            && self.skip.is_empty()
            && self.gap_tolerance.is_none()
            && self.overlap_tolerance.is_none()
            && self.min_intersection_area.is_none()
            && self.measure.is_none()
    }

    pub fn apply(&self, settings: &mut DatasetSettings) {
        if let Some(only) = &self.only {
            for kind in CheckKind::ALL {
                settings.enabled_checks.set(kind, only.contains(&kind));
            }
        }
        for kind in &self.skip {
            settings.enabled_checks.set(*kind, false);
        }
        if let Some(gap) = self.gap_tolerance {
            settings.tolerances.gap = gap;
        }
        if let Some(overlap) = self.overlap_tolerance {
            settings.tolerances.overlap = overlap;
        }
        if let Some(area) = self.min_intersection_area {
            settings.min_intersection_area = area;
        }
        if let Some(measure) = self.measure {
            settings.measure = measure;
        }
    }
}
