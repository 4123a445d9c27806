//! Issue types produced by the topology checks.
//!
//! Feature references are positions in [`Dataset::features`](crate::dataset::Dataset).

use geo::{Coord, Geometry, Polygon};

/// Two features intersecting without a rule allowing it
#[derive(Debug, Clone)]
pub struct IntersectionIssue {
    pub a: usize,
    pub b: usize,
    /// Where the two features meet
    pub geometry: Geometry<f64>,
    /// Area or length of `geometry`, zero for point intersections
    pub measure: f64,
}

#[derive(Debug, Clone)]
pub struct SelfIntersectionIssue {
    pub feature: usize,
    pub locations: Vec<Coord<f64>>,
}

/// An unfilled area enclosed by the dataset's polygons
#[derive(Debug, Clone)]
pub struct GapIssue {
    pub polygon: Polygon<f64>,
    pub area: f64,
}

#[derive(Debug, Clone)]
pub struct DangleIssue {
    pub feature: usize,
    pub endpoints: Vec<Coord<f64>>,
}

#[derive(Debug, Clone)]
pub struct OverlapIssue {
    pub a: usize,
    pub b: usize,
    /// The shared interior
    pub geometry: Geometry<f64>,
    pub measure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainmentIssue {
    pub container: usize,
    pub contained: usize,
}
