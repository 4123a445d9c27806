//! R-tree over feature bounding boxes.

use geo::{BoundingRect, Coord, Geometry, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

type Entry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Bounding-box index over a slice of geometries. Entries carry the position
/// of their geometry; empty geometries are not indexed.
pub struct SpatialIndex {
    tree: RTree<Entry>,
    envelopes: Vec<Option<Rect<f64>>>,
}

impl SpatialIndex {
    pub fn build<'a>(geometries: impl IntoIterator<Item = &'a Geometry<f64>>) -> Self {
        let envelopes: Vec<Option<Rect<f64>>> = geometries
            .into_iter()
            .map(|geometry| geometry.bounding_rect())
            .collect();

        let entries = envelopes
            .iter()
            .enumerate()
            .filter_map(|(i, rect)| {
                rect.map(|rect| {
                    let min = rect.min();
                    let max = rect.max();
                    GeomWithData::new(Rectangle::from_corners([min.x, min.y], [max.x, max.y]), i)
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            envelopes,
        }
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Positions whose envelope intersects the envelope of `index`, excluding
    /// `index` itself, in ascending order
    pub fn candidates(&self, index: usize) -> Vec<usize> {
        let Some(Some(rect)) = self.envelopes.get(index) else {
            return Vec::new();
        };
        let mut found: Vec<usize> = self
            .query(rect.min(), rect.max())
            .into_iter()
            .filter(|&other| other != index)
            .collect();
        found.sort_unstable();
        found
    }

    /// Every pair `(i, j)` with `i < j` whose envelopes intersect, sorted
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.len())
            .flat_map(|i| {
                self.candidates(i)
                    .into_iter()
                    .filter(move |&j| j > i)
                    .map(move |j| (i, j))
            })
            .collect()
    }

    /// Positions whose envelope contains the coordinate, in ascending order
    pub fn at_point(&self, coord: Coord<f64>) -> Vec<usize> {
        let mut found = self.query(coord, coord);
        found.sort_unstable();
        found
    }

    fn query(&self, min: Coord<f64>, max: Coord<f64>) -> Vec<usize> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect()
    }
}
