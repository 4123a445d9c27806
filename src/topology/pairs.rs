//! Pairwise checks: intersections, overlaps and containment.

use geo::{Geometry, Intersects, Relate};

use super::{ContainmentIssue, IntersectionIssue, OverlapIssue};
use crate::config::DatasetSettings;
use crate::dataset::Feature;
use crate::geometry::{dimension, guarded, intersection, Dimension, IntersectionGeometry, SpatialIndex};

pub(super) fn intersections(
    features: &[Feature],
    index: &SpatialIndex,
    settings: &DatasetSettings,
) -> Vec<IntersectionIssue> {
    let mut found = Vec::new();

    for (i, j) in index.candidate_pairs() {
        let (a, b) = (&features[i], &features[j]);
        if !a.geometry.intersects(&b.geometry) {
            continue;
        }
        if settings.rules.allows_intersection(&a.attributes, &b.attributes) {
            tracing::trace!(a = i, b = j, "Intersection allowed by rule");
            continue;
        }
        let Some(shared) = intersect_pair(i, j, &a.geometry, &b.geometry) else {
            continue;
        };
        if shared.is_empty() {
            continue;
        }

        let geometry = shared.to_geometry();
        let area = settings.measure.area(&geometry);
        if area >= settings.min_intersection_area {
            found.push(IntersectionIssue {
                a: i,
                b: j,
                measure: settings.measure.size(&geometry),
                geometry,
            });
        }
    }

    found
}

pub(super) fn overlaps(
    features: &[Feature],
    index: &SpatialIndex,
    settings: &DatasetSettings,
) -> Vec<OverlapIssue> {
    let mut found = Vec::new();

    for (i, j) in index.candidate_pairs() {
        let (a, b) = (&features[i], &features[j]);
        let dim = match (dimension(&a.geometry), dimension(&b.geometry)) {
            (Some(da), Some(db)) if da == db && da != Dimension::Point => da,
            _ => continue,
        };
        if !a.geometry.intersects(&b.geometry) {
            continue;
        }

        let Some((a_contains_b, b_contains_a)) = containment_pair(i, j, &a.geometry, &b.geometry) else {
            continue;
        };
        if a_contains_b || b_contains_a {
            continue;
        }

        let Some(shared) = intersect_pair(i, j, &a.geometry, &b.geometry) else {
            continue;
        };
        if shared.dimension() != Some(dim) {
            continue;
        }

        let geometry = shared.to_geometry();
        let measure = settings.measure.size(&geometry);
        if measure <= settings.tolerances.overlap {
            continue;
        }
        if settings.rules.allows_overlap(&a.attributes, &b.attributes) {
            tracing::trace!(a = i, b = j, "Overlap allowed by rule");
            continue;
        }

        found.push(OverlapIssue {
            a: i,
            b: j,
            geometry: overlap_only(&shared, dim),
            measure,
        });
    }

    found
}

pub(super) fn containment(features: &[Feature], index: &SpatialIndex) -> Vec<ContainmentIssue> {
    let mut found = Vec::new();

    for (i, j) in index.candidate_pairs() {
        let Some((i_contains_j, j_contains_i)) =
            containment_pair(i, j, &features[i].geometry, &features[j].geometry)
        else {
            continue;
        };
        if i_contains_j {
            found.push(ContainmentIssue {
                container: i,
                contained: j,
            });
        }
        // Equal geometries contain each other; report the pair once
        if j_contains_i && !i_contains_j {
            found.push(ContainmentIssue {
                container: j,
                contained: i,
            });
        }
    }

    found
}

fn intersect_pair(i: usize, j: usize, a: &Geometry<f64>, b: &Geometry<f64>) -> Option<IntersectionGeometry> {
    match intersection(a, b) {
        Ok(shared) => Some(shared),
        Err(e) => {
            tracing::warn!(a = i, b = j, error = %e, "Skipping pair");
            None
        }
    }
}

/// `(a contains b, b contains a)`, `None` when the relate computation fails
fn containment_pair(i: usize, j: usize, a: &Geometry<f64>, b: &Geometry<f64>) -> Option<(bool, bool)> {
    match guarded("relate", || a.relate(b)) {
        Ok(matrix) => Some((matrix.is_contains(), matrix.is_within())),
        Err(e) => {
            tracing::warn!(a = i, b = j, error = %e, "Skipping pair");
            None
        }
    }
}

/// Drop the lower-dimensional pieces of an intersection
fn overlap_only(shared: &IntersectionGeometry, dim: Dimension) -> Geometry<f64> {
    let pieces = match dim {
        Dimension::Area => IntersectionGeometry {
            polygons: shared.polygons.clone(),
            ..Default::default()
        },
        _ => IntersectionGeometry {
            lines: shared.lines.clone(),
            ..Default::default()
        },
    };
    pieces.to_geometry()
}
