//! Geometry helpers shared by the topology checks.
//!
//! - [`index`] - R-tree over feature bounding boxes
//! - [`intersection`] - set intersection of two arbitrary geometries
//! - [`simple`] - self-intersection detection

use anyhow::Result;
use geo::{Area, Coord, GeodesicArea, GeodesicLength, Geometry, Line, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

pub mod index;
pub mod intersection;
pub mod simple;

pub use index::SpatialIndex;
pub use intersection::{intersection, IntersectionGeometry};
pub use simple::self_intersections;

/// How areas and lengths are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Coordinate units (square degrees for WGS84 data)
    #[default]
    Planar,
    /// Meters and square meters on the WGS84 ellipsoid
    Geodesic,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Planar => write!(f, "planar"),
            Measure::Geodesic => write!(f, "geodesic"),
        }
    }
}

impl Measure {
    /// Total area of the polygonal parts of a geometry
    pub fn area(self, geometry: &Geometry<f64>) -> f64 {
        parts(geometry)
            .polygons
            .iter()
            .map(|polygon| self.polygon_area(polygon))
            .sum()
    }

    pub fn polygon_area(self, polygon: &Polygon<f64>) -> f64 {
        match self {
            Measure::Planar => polygon.unsigned_area(),
            Measure::Geodesic => polygon.geodesic_area_unsigned(),
        }
    }

    /// Total length of the lineal parts of a geometry
    pub fn length(self, geometry: &Geometry<f64>) -> f64 {
        parts(geometry)
            .lines
            .iter()
            .map(|line| self.linestring_length(line))
            .sum()
    }

    pub fn linestring_length(self, line: &LineString<f64>) -> f64 {
        match self {
            Measure::Planar => line.lines().map(segment_length).sum(),
            Measure::Geodesic => line.geodesic_length(),
        }
    }

    /// Area for polygonal geometries, length for lineal ones, zero for points
    pub fn size(self, geometry: &Geometry<f64>) -> f64 {
        match dimension(geometry) {
            Some(Dimension::Area) => self.area(geometry),
            Some(Dimension::Line) => self.length(geometry),
            _ => 0.0,
        }
    }
}

fn segment_length(line: Line<f64>) -> f64 {
    line.dx().hypot(line.dy())
}

/// Topological dimension of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dimension {
    Point,
    Line,
    Area,
}

/// Highest dimension among the non-empty parts, `None` for empty geometries
pub fn dimension(geometry: &Geometry<f64>) -> Option<Dimension> {
    let parts = parts(geometry);
    if !parts.polygons.is_empty() {
        Some(Dimension::Area)
    } else if !parts.lines.is_empty() {
        Some(Dimension::Line)
    } else if !parts.points.is_empty() {
        Some(Dimension::Point)
    } else {
        None
    }
}

/// A geometry split into its primitive components
#[derive(Debug, Clone, Default)]
pub(crate) struct Parts {
    pub points: Vec<Coord<f64>>,
    pub lines: Vec<LineString<f64>>,
    pub polygons: Vec<Polygon<f64>>,
}

pub(crate) fn parts(geometry: &Geometry<f64>) -> Parts {
    let mut parts = Parts::default();
    collect_parts(geometry, &mut parts);
    parts
}

fn collect_parts(geometry: &Geometry<f64>, parts: &mut Parts) {
    match geometry {
        Geometry::Point(p) => parts.points.push(p.0),
        Geometry::MultiPoint(mp) => parts.points.extend(mp.iter().map(|p| p.0)),
        Geometry::Line(line) => parts.lines.push(LineString::from(vec![line.start, line.end])),
        Geometry::LineString(ls) => {
            if ls.0.len() > 1 {
                parts.lines.push(ls.clone());
            }
        }
        Geometry::MultiLineString(mls) => {
            parts
                .lines
                .extend(mls.iter().filter(|ls| ls.0.len() > 1).cloned());
        }
        Geometry::Polygon(polygon) => {
            if !polygon.exterior().0.is_empty() {
                parts.polygons.push(polygon.clone());
            }
        }
        Geometry::MultiPolygon(mp) => {
            parts
                .polygons
                .extend(mp.iter().filter(|p| !p.exterior().0.is_empty()).cloned());
        }
        Geometry::Rect(rect) => parts.polygons.push(rect.to_polygon()),
        Geometry::Triangle(triangle) => parts.polygons.push(triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for member in collection.iter() {
                collect_parts(member, parts);
            }
        }
    }
}

/// All segments of a polygon's rings
pub(crate) fn polygon_segments(polygon: &Polygon<f64>) -> impl Iterator<Item = Line<f64>> + '_ {
    polygon
        .exterior()
        .lines()
        .chain(polygon.interiors().iter().flat_map(|ring| ring.lines()))
}

/// Run a geometry operation that may panic on malformed input.
pub(crate) fn guarded<T>(operation: &str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|_| anyhow::anyhow!("{} failed on malformed geometry", operation))
}

/// Coordinates equal within a small absolute tolerance
pub(crate) fn coords_close(a: Coord<f64>, b: Coord<f64>) -> bool {
    const EPSILON: f64 = 1e-12;
    (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
}
