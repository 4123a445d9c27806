//! Set intersection of two arbitrary geometries.
//!
//! Polygonal overlap comes from boolean ops, linework inside polygons from
//! clipping, and crossings, touches and shared edges from segment-segment
//! intersection. Lower-dimensional pieces covered by a higher-dimensional
//! piece are dropped so every location is counted once.

use anyhow::Result;
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BooleanOps, BoundingRect, Coord, Geometry, GeometryCollection, Intersects, Line, LineString,
    MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};

use super::{coords_close, guarded, parts, polygon_segments, Dimension, Parts};

/// Result of intersecting two geometries
#[derive(Debug, Clone, Default)]
pub struct IntersectionGeometry {
    pub polygons: Vec<Polygon<f64>>,
    pub lines: Vec<Line<f64>>,
    pub points: Vec<Coord<f64>>,
}

impl IntersectionGeometry {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }

    pub fn dimension(&self) -> Option<Dimension> {
        if !self.polygons.is_empty() {
            Some(Dimension::Area)
        } else if !self.lines.is_empty() {
            Some(Dimension::Line)
        } else if !self.points.is_empty() {
            Some(Dimension::Point)
        } else {
            None
        }
    }

    /// The simplest geometry holding every piece: a single kind collapses to
    /// (Multi)Polygon, (Multi)LineString or (Multi)Point, mixed kinds become a
    /// GeometryCollection.
    pub fn to_geometry(&self) -> Geometry<f64> {
        let mut members = Vec::new();

        match self.polygons.len() {
            0 => {}
            1 => members.push(Geometry::Polygon(self.polygons[0].clone())),
            _ => members.push(Geometry::MultiPolygon(MultiPolygon::new(self.polygons.clone()))),
        }

        let mut chains = merge_segments(&self.lines);
        match chains.len() {
            0 => {}
            1 => members.push(Geometry::LineString(chains.remove(0))),
            _ => members.push(Geometry::MultiLineString(MultiLineString::new(chains))),
        }

        match self.points.len() {
            0 => {}
            1 => members.push(Geometry::Point(Point::from(self.points[0]))),
            _ => members.push(Geometry::MultiPoint(MultiPoint::new(
                self.points.iter().map(|c| Point::from(*c)).collect(),
            ))),
        }

        if members.len() == 1 {
            members.remove(0)
        } else {
            Geometry::GeometryCollection(GeometryCollection::new_from(members))
        }
    }

    fn add_point(&mut self, coord: Coord<f64>) {
        if !self.points.iter().any(|p| coords_close(*p, coord)) {
            self.points.push(coord);
        }
    }

    fn add_line(&mut self, line: Line<f64>) {
        if coords_close(line.start, line.end) {
            self.add_point(line.start);
            return;
        }
        let duplicate = self.lines.iter().any(|l| {
            (coords_close(l.start, line.start) && coords_close(l.end, line.end))
                || (coords_close(l.start, line.end) && coords_close(l.end, line.start))
        });
        if !duplicate {
            self.lines.push(line);
        }
    }

    fn covers_on_lines(&self, coord: Coord<f64>) -> bool {
        self.lines.iter().any(|line| line.intersects(&coord))
    }

    fn covers_on_polygons(&self, coord: Coord<f64>) -> bool {
        self.polygons.iter().any(|polygon| polygon.intersects(&coord))
    }

    /// Drop points lying on lines or polygons and lines lying in polygons
    fn prune_covered(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        self.lines = lines
            .into_iter()
            .filter(|line| !self.covers_on_polygons(midpoint(line)))
            .collect();

        let points = std::mem::take(&mut self.points);
        self.points = points
            .into_iter()
            .filter(|p| !self.covers_on_lines(*p) && !self.covers_on_polygons(*p))
            .collect();
    }
}

/// Intersect two geometries.
///
/// Errors only when a boolean operation fails on malformed input; callers
/// skip such pairs.
pub fn intersection(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<IntersectionGeometry> {
    let pa = parts(a);
    let pb = parts(b);
    let mut result = IntersectionGeometry::default();

    // Areas shared by both
    if !pa.polygons.is_empty() && !pb.polygons.is_empty() {
        let ma = MultiPolygon::new(pa.polygons.clone());
        let mb = MultiPolygon::new(pb.polygons.clone());
        let shared = guarded("polygon intersection", || ma.intersection(&mb))?;
        result
            .polygons
            .extend(shared.0.into_iter().filter(|p| p.unsigned_area() > 0.0));
    }

    // Linework inside the other side's polygons
    clip_lines(&pa, &pb, &mut result)?;
    clip_lines(&pb, &pa, &mut result)?;

    // Crossings, touches and shared edges between all linework
    let segments_a = segments(&pa);
    let segments_b = segments(&pb);
    let mut boundary = IntersectionGeometry::default();
    for sa in &segments_a {
        let rect_a = sa.bounding_rect();
        for sb in &segments_b {
            if !rect_a.intersects(&sb.bounding_rect()) {
                continue;
            }
            match line_intersection(*sa, *sb) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    boundary.add_point(intersection)
                }
                Some(LineIntersection::Collinear { intersection }) => boundary.add_line(intersection),
                None => {}
            }
        }
    }
    for line in boundary.lines {
        if !result.covers_on_lines(midpoint(&line)) {
            result.add_line(line);
        }
    }
    for point in boundary.points {
        result.add_point(point);
    }

    // Points of either side touching the other
    for point in &pa.points {
        if b.intersects(&Point::from(*point)) {
            result.add_point(*point);
        }
    }
    for point in &pb.points {
        if a.intersects(&Point::from(*point)) {
            result.add_point(*point);
        }
    }

    result.prune_covered();
    Ok(result)
}

fn clip_lines(lines_from: &Parts, polygons_from: &Parts, result: &mut IntersectionGeometry) -> Result<()> {
    if lines_from.lines.is_empty() || polygons_from.polygons.is_empty() {
        return Ok(());
    }
    let polygons = MultiPolygon::new(polygons_from.polygons.clone());
    let lines = MultiLineString::new(lines_from.lines.clone());
    let clipped = guarded("line clipping", || polygons.clip(&lines, false))?;
    for line in clipped.iter().flat_map(|ls| ls.lines()) {
        result.add_line(line);
    }
    Ok(())
}

/// Every segment of the linework and polygon rings of `parts`
fn segments(parts: &Parts) -> Vec<Line<f64>> {
    parts
        .lines
        .iter()
        .flat_map(|ls| ls.lines())
        .chain(parts.polygons.iter().flat_map(polygon_segments))
        .filter(|line| !coords_close(line.start, line.end))
        .collect()
}

fn midpoint(line: &Line<f64>) -> Coord<f64> {
    Coord {
        x: (line.start.x + line.end.x) / 2.0,
        y: (line.start.y + line.end.y) / 2.0,
    }
}

/// Chain segments sharing endpoints into linestrings
fn merge_segments(segments: &[Line<f64>]) -> Vec<LineString<f64>> {
    let mut remaining: Vec<Line<f64>> = segments.to_vec();
    let mut chains = Vec::new();

    while let Some(first) = remaining.pop() {
        let mut coords = vec![first.start, first.end];
        loop {
            let tail = coords[coords.len() - 1];
            let head = coords[0];
            if let Some(pos) = remaining
                .iter()
                .position(|l| coords_close(l.start, tail) || coords_close(l.end, tail))
            {
                let next = remaining.swap_remove(pos);
                let far = if coords_close(next.start, tail) { next.end } else { next.start };
                coords.push(far);
            } else if let Some(pos) = remaining
                .iter()
                .position(|l| coords_close(l.start, head) || coords_close(l.end, head))
            {
                let next = remaining.swap_remove(pos);
                let far = if coords_close(next.end, head) { next.start } else { next.end };
                coords.insert(0, far);
            } else {
                break;
            }
        }
        chains.push(LineString::from(coords));
    }

    chains
}
