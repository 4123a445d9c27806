//! Text and JSON reports.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::topology::issues::IntersectionIssue;
use crate::topology::{CheckKind, TopologyResults, TopologyTest};

/// Intersection statistics over distinct feature ids
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntersectionStats {
    pub total_geometries: usize,
    pub geometries_intersected: usize,
    /// Intersection issues per intersected geometry
    pub average_intersections: f64,
    pub percentage_intersected: f64,
}

impl TopologyTest {
    /// Run every enabled check and summarize
    pub fn report_summary(&self) -> String {
        summary(self, &self.validate_topology())
    }

    /// Report on the intersection check, writing the legacy intersections file
    /// when there is anything to report
    pub fn report_invalid_intersections(&self, output_dir: Option<&Path>) -> Result<String> {
        let count = self.check_intersections().len();
        if count == 0 {
            return Ok(format!(
                "No invalid intersections found in dataset: {}.",
                self.dataset_type
            ));
        }

        let path = self.save_invalid_intersections(output_dir)?;
        Ok(format!(
            "Invalid intersections found in dataset: {}\n\
             Number of invalid intersections: {}\n\
             Invalid intersections have been saved to: {}\n",
            self.dataset_type,
            count,
            path.display()
        ))
    }

    /// Statistics over the intersection check, running it if needed
    pub fn intersection_stats(&self) -> IntersectionStats {
        self.stats_for(self.check_intersections())
    }

    fn stats_for(&self, issues: &[IntersectionIssue]) -> IntersectionStats {
        let total = self.dataset.len();

        let ids: BTreeSet<String> = issues
            .iter()
            .flat_map(|issue| [self.feature_id(issue.a), self.feature_id(issue.b)])
            .map(|id| id.to_string())
            .collect();
        let intersected = ids.len();

        IntersectionStats {
            total_geometries: total,
            geometries_intersected: intersected,
            average_intersections: ratio(issues.len(), intersected),
            percentage_intersected: ratio(intersected, total) * 100.0,
        }
    }
}

/// Statistics from results, `None` when the intersection check did not run
fn results_stats(test: &TopologyTest, results: &TopologyResults) -> Option<IntersectionStats> {
    results
        .intersections
        .as_deref()
        .map(|issues| test.stats_for(issues))
}

/// Summary text for already computed results. The intersection statistics
/// are left out when the intersection check is disabled.
pub fn summary(test: &TopologyTest, results: &TopologyResults) -> String {
    let mut report = format!(
        "Topology Summary for dataset: {}\nTotal geometries: {}\n\n",
        test.dataset_type,
        test.dataset.len()
    );
    let lines: Vec<String> = results
        .kinds()
        .into_iter()
        .map(|kind| format!("{}: {} issues found", kind.title(), results.count(kind).unwrap_or(0)))
        .collect();
    report.push_str(&lines.join("\n"));

    if let Some(stats) = results_stats(test, results) {
        report.push_str(&format!(
            "\n\nGeometries intersected: {}\n\
             Average intersections per geometry: {:.2}\n\
             Percentage intersected: {:.2}%",
            stats.geometries_intersected, stats.average_intersections, stats.percentage_intersected
        ));
    }
    report.truncate(report.trim_end().len());
    report
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Machine-readable report for one tested file
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub dataset: PathBuf,
    #[serde(rename = "type")]
    pub dataset_type: String,
    pub file: String,
    pub total_features: usize,
    pub checks: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersection_stats: Option<IntersectionStats>,
    pub output_files: BTreeMap<String, PathBuf>,
    pub generated_at: String,
}

impl JsonReport {
    pub fn new(
        test: &TopologyTest,
        results: &TopologyResults,
        written: &BTreeMap<CheckKind, PathBuf>,
    ) -> Self {
        Self {
            dataset: test.dataset.path.clone(),
            dataset_type: test.dataset_type.clone(),
            file: test
                .dataset
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            total_features: test.dataset.len(),
            checks: results
                .kinds()
                .into_iter()
                .map(|kind| (kind.name().to_string(), results.count(kind).unwrap_or(0)))
                .collect(),
            intersection_stats: results_stats(test, results),
            output_files: written
                .iter()
                .map(|(kind, path)| (kind.name().to_string(), path.clone()))
                .collect(),
            generated_at: crate::utc_now_iso(),
        }
    }
}
