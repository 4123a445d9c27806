//! Gap detection.
//!
//! A gap is the unfilled part of an interior ring of the union of every
//! polygon in the dataset, unless the ring lies inside a hole of one of the
//! input polygons. Polygons sitting inside the ring (islands) are subtracted.

use geo::{BooleanOps, MultiPolygon, Polygon, Relate};

use super::GapIssue;
use crate::config::DatasetSettings;
use crate::dataset::Feature;
use crate::geometry::{guarded, parts};

pub(super) fn gaps(features: &[Feature], settings: &DatasetSettings) -> Vec<GapIssue> {
    let polygons: Vec<Polygon<f64>> = features
        .iter()
        .flat_map(|feature| parts(&feature.geometry).polygons)
        .collect();
    if polygons.is_empty() {
        return Vec::new();
    }

    let designed_holes: Vec<Polygon<f64>> = polygons
        .iter()
        .flat_map(|polygon| polygon.interiors().iter())
        .map(|ring| Polygon::new(ring.clone(), vec![]))
        .collect();

    let Some(union) = union_all(&polygons) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for polygon in union.iter() {
        for ring in polygon.interiors() {
            let enclosed = Polygon::new(ring.clone(), vec![]);
            if designed_holes.iter().any(|hole| covers(hole, &enclosed)) {
                continue;
            }
            for gap in unfilled(&enclosed, &union) {
                let area = settings.measure.polygon_area(&gap);
                if area <= settings.tolerances.gap {
                    tracing::trace!(area, "Gap within tolerance");
                    continue;
                }
                found.push(GapIssue { polygon: gap, area });
            }
        }
    }

    found
}

fn union_all(polygons: &[Polygon<f64>]) -> Option<MultiPolygon<f64>> {
    let mut union = MultiPolygon::new(vec![]);
    for polygon in polygons {
        let next = MultiPolygon::new(vec![polygon.clone()]);
        match guarded("polygon union", || union.union(&next)) {
            Ok(merged) => union = merged,
            Err(e) => {
                tracing::warn!(error = %e, "Polygon union failed, skipping gap check");
                return None;
            }
        }
    }
    Some(union)
}

/// The part of `enclosed` not covered by any polygon
fn unfilled(enclosed: &Polygon<f64>, union: &MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    match guarded("polygon difference", || MultiPolygon::new(vec![enclosed.clone()]).difference(union)) {
        Ok(rest) => rest.0,
        Err(e) => {
            tracing::warn!(error = %e, "Polygon difference failed, keeping the whole ring");
            vec![enclosed.clone()]
        }
    }
}

fn covers(hole: &Polygon<f64>, gap: &Polygon<f64>) -> bool {
    guarded("relate", || hole.relate(gap).is_contains()).unwrap_or(false)
}
