//! Dangle detection.

use geo::{Coord, Intersects, LineString, Point};

use super::DangleIssue;
use crate::dataset::Feature;
use crate::geometry::{coords_close, parts, SpatialIndex};

/// Endpoints of open linestrings that touch neither another feature nor
/// another component of their own feature
pub(super) fn dangles(features: &[Feature], index: &SpatialIndex) -> Vec<DangleIssue> {
    let mut found = Vec::new();

    for (position, feature) in features.iter().enumerate() {
        let lines = parts(&feature.geometry).lines;
        let mut endpoints = Vec::new();

        for (component, line) in lines.iter().enumerate() {
            let Some((start, end)) = open_endpoints(line) else {
                continue;
            };
            for endpoint in [start, end] {
                let connected = touches_component(&lines, component, endpoint)
                    || touches_feature(features, index, position, endpoint);
                if !connected && !endpoints.iter().any(|c| coords_close(*c, endpoint)) {
                    endpoints.push(endpoint);
                }
            }
        }

        if !endpoints.is_empty() {
            found.push(DangleIssue {
                feature: position,
                endpoints,
            });
        }
    }

    found
}

fn open_endpoints(line: &LineString<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    if line.is_closed() {
        return None;
    }
    Some((*line.0.first()?, *line.0.last()?))
}

fn touches_component(lines: &[LineString<f64>], component: usize, endpoint: Coord<f64>) -> bool {
    let point = Point::from(endpoint);
    lines
        .iter()
        .enumerate()
        .any(|(other, line)| other != component && line.intersects(&point))
}

fn touches_feature(features: &[Feature], index: &SpatialIndex, position: usize, endpoint: Coord<f64>) -> bool {
    let point = Point::from(endpoint);
    index
        .at_point(endpoint)
        .into_iter()
        .filter(|&other| other != position)
        .any(|other| features[other].geometry.intersects(&point))
}
