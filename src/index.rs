//! R*-tree indexes over table geometries.
//!
//! [`SpatialIndex`] answers nearest-neighbour and radius queries over a frozen
//! coordinate matrix. Distances here are planar, in coordinate units
//! (degrees for lon/lat data); callers convert meters to degrees before
//! querying and measure geodesic meters afterwards.
//!
//! [`RegionIndex`] prunes polygon candidates by envelope before the exact
//! containment test used by subdivision joins.

use crate::table::GeoTable;
use geo::Point;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree, RTreeObject};
use sociome_types::Geometry;

type IndexedCoord = GeomWithData<[f64; 2], usize>;

/// A neighbour returned by [`SpatialIndex::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row of the neighbour in the indexed coordinate matrix
    pub index: usize,
    /// Planar distance in coordinate units
    pub distance: f64,
}

/// Nearest-neighbour and radius queries over an N×2 coordinate matrix.
///
/// # Examples
///
/// ```
/// use sociome::SpatialIndex;
///
/// let index = SpatialIndex::new(vec![[0.0, 0.0], [0.0, 1.0], [3.0, 0.0]]);
/// assert_eq!(index.nearest([0.1, 0.9], 1)[0].index, 1);
/// assert_eq!(index.within_radius([0.0, 0.0], 1.0), vec![0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedCoord>,
    coords: Vec<[f64; 2]>,
}

impl SpatialIndex {
    /// Bulk-loads the index. Non-finite coordinates are kept in the matrix
    /// but never returned by a query.
    pub fn new(coords: Vec<[f64; 2]>) -> Self {
        let entries: Vec<IndexedCoord> = coords
            .iter()
            .enumerate()
            .filter(|(_, c)| c[0].is_finite() && c[1].is_finite())
            .map(|(i, c)| GeomWithData::new(*c, i))
            .collect();
        let skipped = coords.len() - entries.len();
        if skipped > 0 {
            log::warn!("Skipped {} non-finite coordinates while indexing", skipped);
        }
        Self {
            tree: RTree::bulk_load(entries),
            coords,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    pub fn coord(&self, index: usize) -> [f64; 2] {
        self.coords[index]
    }

    #[inline]
    pub fn coords(&self) -> &[[f64; 2]] {
        &self.coords
    }

    /// The `k` nearest indexed coordinates, closest first.
    pub fn nearest(&self, point: [f64; 2], k: usize) -> Vec<Neighbor> {
        if k == 0 || !(point[0].is_finite() && point[1].is_finite()) {
            return Vec::new();
        }
        self.tree
            .nearest_neighbor_iter_with_distance_2(&point)
            .take(k)
            .map(|(entry, d2)| Neighbor {
                index: entry.data,
                distance: d2.sqrt(),
            })
            .collect()
    }

    /// The single closest coordinate. Equidistant candidates resolve to the
    /// lowest row.
    pub fn closest(&self, point: [f64; 2]) -> Option<Neighbor> {
        if !(point[0].is_finite() && point[1].is_finite()) {
            return None;
        }
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&point);
        let (first, best_d2) = candidates.next()?;
        let index = candidates
            .take_while(|(_, d2)| *d2 == best_d2)
            .map(|(entry, _)| entry.data)
            .fold(first.data, usize::min);
        Some(Neighbor {
            index,
            distance: best_d2.sqrt(),
        })
    }

    /// Rows whose coordinate lies within `radius` of `point` (inclusive),
    /// in ascending row order.
    pub fn within_radius(&self, point: [f64; 2], radius: f64) -> Vec<usize> {
        if !(radius >= 0.0 && point[0].is_finite() && point[1].is_finite()) {
            return Vec::new();
        }
        let mut rows: Vec<usize> = self
            .tree
            .locate_within_distance(point, radius * radius)
            .map(|entry| entry.data)
            .collect();
        rows.sort_unstable();
        rows
    }

    pub fn count_within_radius(&self, point: [f64; 2], radius: f64) -> usize {
        if !(radius >= 0.0 && point[0].is_finite() && point[1].is_finite()) {
            return 0;
        }
        self.tree
            .locate_within_distance(point, radius * radius)
            .count()
    }
}

/// Envelope of one source geometry, tagged with its row.
#[derive(Debug, Clone)]
struct IndexedRegion {
    row: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Containment lookups against the polygons of a table.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    tree: RTree<IndexedRegion>,
    geometries: Vec<Geometry>,
}

impl RegionIndex {
    pub fn new(source: &GeoTable) -> Self {
        let geometries: Vec<Geometry> = source.geometries().cloned().collect();
        let regions: Vec<IndexedRegion> = geometries
            .iter()
            .enumerate()
            .filter_map(|(row, g)| {
                let rect = g.bounding_rect()?;
                Some(IndexedRegion {
                    row,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(regions),
            geometries,
        }
    }

    /// Source rows whose geometry contains `point`, ascending.
    pub fn containing(&self, point: &Point<f64>) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x(), point.y()]))
            .filter(|region| self.geometries[region.row].contains_point(point))
            .map(|region| region.row)
            .collect();
        rows.sort_unstable();
        rows
    }
}
