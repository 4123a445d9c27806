//! Self-intersection detection.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Coord, Geometry, Intersects, Line, LineString};

use super::coords_close;

/// Locations where a geometry is not simple. Empty when the geometry is simple.
///
/// Each linestring and polygon ring is checked on its own: non-adjacent
/// segments may not meet and adjacent segments may only share their common
/// vertex. The closing segment of a ring is adjacent to its first segment.
/// A multipoint is not simple when a point repeats.
pub fn self_intersections(geometry: &Geometry<f64>) -> Vec<Coord<f64>> {
    let mut found = Vec::new();
    collect(geometry, &mut found);
    found
}

fn collect(geometry: &Geometry<f64>, found: &mut Vec<Coord<f64>>) {
    match geometry {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {}
        Geometry::MultiPoint(mp) => {
            let coords: Vec<Coord<f64>> = mp.iter().map(|p| p.0).collect();
            for (i, a) in coords.iter().enumerate() {
                if coords[..i].iter().any(|b| coords_close(*a, *b)) {
                    push_unique(found, *a);
                }
            }
        }
        Geometry::LineString(ls) => linestring(ls, found),
        Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| linestring(ls, found)),
        Geometry::Polygon(polygon) => {
            linestring(polygon.exterior(), found);
            polygon.interiors().iter().for_each(|ring| linestring(ring, found));
        }
        Geometry::MultiPolygon(mp) => {
            for polygon in mp.iter() {
                linestring(polygon.exterior(), found);
                polygon.interiors().iter().for_each(|ring| linestring(ring, found));
            }
        }
        Geometry::GeometryCollection(collection) => {
            collection.iter().for_each(|member| collect(member, found))
        }
    }
}

fn linestring(ls: &LineString<f64>, found: &mut Vec<Coord<f64>>) {
    let segments: Vec<Line<f64>> = ls
        .lines()
        .filter(|line| !coords_close(line.start, line.end))
        .collect();
    let n = segments.len();
    if n < 2 {
        return;
    }
    let closed = ls.is_closed();

    for i in 0..n {
        let rect_i = segments[i].bounding_rect();
        for j in (i + 1)..n {
            if !rect_i.intersects(&segments[j].bounding_rect()) {
                continue;
            }
            let adjacent = j == i + 1 || (closed && i == 0 && j == n - 1);

            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    if adjacent && is_shared_vertex(segments[i], segments[j], intersection) {
                        continue;
                    }
                    push_unique(found, intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    push_unique(found, intersection.start);
                    push_unique(found, intersection.end);
                }
            }
        }
    }
}

fn is_shared_vertex(a: Line<f64>, b: Line<f64>, at: Coord<f64>) -> bool {
    let a_end = coords_close(at, a.start) || coords_close(at, a.end);
    let b_end = coords_close(at, b.start) || coords_close(at, b.end);
    a_end && b_end
}

fn push_unique(found: &mut Vec<Coord<f64>>, coord: Coord<f64>) {
    if !found.iter().any(|c| coords_close(*c, coord)) {
        found.push(coord);
    }
}
